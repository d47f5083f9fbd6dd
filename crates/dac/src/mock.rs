//! Simulated DAC bank for host-side testing
//!
//! Implements [`SpiMaster`] as eight AD9117 register files behind the
//! chip-select decoder. Frames are decoded the way the chips see them, the
//! two-phase read protocol is enforced, and every completed register access
//! is recorded for assertion in tests.

use platform::{DacIndex, SpiConfig, SpiFlags, SpiMaster, DAC_COUNT};

use crate::chip_select::decode_chip_select;
use crate::driver::BASE_FLAGS;
use crate::registers::{
    frame_data, frame_instruction, EXPECTED_VERSION, OPCODE_READ, READ_COMMAND_BITS,
    READ_FRAME_BITS, REGISTER_MASK, REG_VERSION, WRITE_FRAME_BITS,
};

const REGISTER_COUNT: usize = 32;

/// A completed register access, in bus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Register write
    Write {
        /// Chip written
        dac: DacIndex,
        /// Register address
        register: u8,
        /// 16-bit value
        data: u16,
    },
    /// Register read (recorded when phase 2 completes)
    Read {
        /// Chip read
        dac: DacIndex,
        /// Register address
        register: u8,
    },
}

/// Bus misuse detected by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
pub enum SimError {
    /// A transfer broke the AD9117 framing rules.
    #[error("SPI protocol violation: {0}")]
    ProtocolViolation(&'static str),
    /// The chip-select mask does not address any chip.
    #[error("chip-select mask {0:#06b} selects no DAC")]
    NoChipSelected(u8),
}

/// Eight simulated AD9117 chips on one SPI bus.
#[derive(Debug, Clone)]
pub struct SimulatedDacBank {
    registers: [[u16; REGISTER_COUNT]; DAC_COUNT],
    config: Option<SpiConfig>,
    /// Chip and instruction of a read whose phase 1 has completed.
    pending_read: Option<(DacIndex, u8)>,
    captured: u32,
    events: Vec<BusEvent>,
}

impl SimulatedDacBank {
    /// A bank of healthy chips: every version register reads
    /// [`EXPECTED_VERSION`], everything else reads 0.
    pub fn new() -> Self {
        let mut registers = [[0u16; REGISTER_COUNT]; DAC_COUNT];
        for file in &mut registers {
            if let Some(version) = file.get_mut(usize::from(REG_VERSION)) {
                *version = EXPECTED_VERSION;
            }
        }
        Self {
            registers,
            config: None,
            pending_read: None,
            captured: 0,
            events: Vec::new(),
        }
    }

    /// Make `dac` report `version` from its identity register.
    #[must_use]
    pub fn with_identity(mut self, dac: DacIndex, version: u16) -> Self {
        self.set_register(dac, REG_VERSION, version);
        self
    }

    /// Current value of `register` on `dac` (0 for addresses outside the map).
    pub fn register(&self, dac: DacIndex, register: u8) -> u16 {
        self.registers
            .get(dac.as_usize())
            .and_then(|file| file.get(usize::from(register)))
            .copied()
            .unwrap_or(0)
    }

    /// Preload `register` on `dac`. Addresses outside the map are ignored.
    pub fn set_register(&mut self, dac: DacIndex, register: u8, value: u16) {
        if let Some(slot) = self
            .registers
            .get_mut(dac.as_usize())
            .and_then(|file| file.get_mut(usize::from(register)))
        {
            *slot = value;
        }
    }

    /// Every completed access so far.
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Completed writes only.
    pub fn writes(&self) -> impl Iterator<Item = &BusEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::Write { .. }))
    }

    /// Completed reads only.
    pub fn reads(&self) -> impl Iterator<Item = &BusEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::Read { .. }))
    }

    /// Forget the event log.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn check(condition: bool, violation: &'static str) -> Result<(), SimError> {
        if condition {
            Ok(())
        } else {
            Err(SimError::ProtocolViolation(violation))
        }
    }

    fn shift_out(&mut self, config: SpiConfig, frame: u32) -> Result<(), SimError> {
        let dac = decode_chip_select(config.chip_select)
            .ok_or(SimError::NoChipSelected(config.chip_select))?;
        let instruction = frame_instruction(frame);
        let register = instruction & REGISTER_MASK;
        let flags = config.flags;

        if flags.contains(SpiFlags::INPUT) {
            // Read phase 2
            let Some((pending_dac, pending_instruction)) = self.pending_read.take() else {
                return Err(SimError::ProtocolViolation("read phase 2 without phase 1"));
            };
            Self::check(
                pending_dac == dac,
                "chip select changed between read phases",
            )?;
            Self::check(
                pending_instruction == instruction,
                "read instruction changed between phases",
            )?;
            Self::check(
                flags.contains(SpiFlags::HALF_DUPLEX),
                "read phase 2 must be half duplex",
            )?;
            Self::check(
                flags.contains(SpiFlags::END),
                "read phase 2 must release chip select",
            )?;
            Self::check(
                config.length == READ_FRAME_BITS,
                "read phase 2 has wrong length",
            )?;
            self.captured = u32::from(self.register(dac, register));
            self.events.push(BusEvent::Read { dac, register });
            return Ok(());
        }

        Self::check(
            self.pending_read.is_none(),
            "transfer interleaved with a pending read",
        )?;

        if instruction & OPCODE_READ != 0 {
            // Read phase 1
            Self::check(
                !flags.contains(SpiFlags::END),
                "read phase 1 must hold chip select",
            )?;
            Self::check(
                config.length == READ_COMMAND_BITS,
                "read phase 1 has wrong length",
            )?;
            self.pending_read = Some((dac, instruction));
        } else {
            Self::check(
                flags.contains(SpiFlags::END),
                "register write must release chip select",
            )?;
            Self::check(
                config.length == WRITE_FRAME_BITS,
                "register write has wrong length",
            )?;
            let data = frame_data(frame);
            self.set_register(dac, register, data);
            self.events.push(BusEvent::Write {
                dac,
                register,
                data,
            });
        }
        Ok(())
    }
}

impl Default for SimulatedDacBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SpiMaster for SimulatedDacBank {
    type Error = SimError;

    fn set_config(&mut self, config: SpiConfig) -> Result<(), Self::Error> {
        Self::check(
            config.flags.contains(BASE_FLAGS),
            "AD9117 needs clock polarity 1, phase 1",
        )?;
        Self::check(!config.flags.contains(SpiFlags::OFFLINE), "bus is offline")?;
        self.config = Some(config);
        Ok(())
    }

    fn write(&mut self, data: u32) -> Result<(), Self::Error> {
        let config = self
            .config
            .ok_or(SimError::ProtocolViolation("transfer before set_config"))?;
        self.shift_out(config, data)
    }

    fn read(&mut self) -> Result<u32, Self::Error> {
        Ok(self.captured)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chip_select::chip_select;
    use crate::registers::{instruction_frame, read_instruction, write_frame, REG_CLKMODE};

    fn dac(i: u8) -> DacIndex {
        DacIndex::new(i).unwrap()
    }

    fn config(flags: SpiFlags, length: u8, target: DacIndex) -> SpiConfig {
        SpiConfig {
            flags: BASE_FLAGS | flags,
            length,
            divider: 16,
            chip_select: chip_select(target),
        }
    }

    #[test]
    fn healthy_bank_reports_expected_version() {
        let sim = SimulatedDacBank::new();
        for d in DacIndex::all() {
            assert_eq!(sim.register(d, REG_VERSION), EXPECTED_VERSION);
        }
    }

    #[test]
    fn transfer_without_config_is_rejected() {
        let mut sim = SimulatedDacBank::new();
        assert_eq!(
            sim.write(0),
            Err(SimError::ProtocolViolation("transfer before set_config"))
        );
    }

    #[test]
    fn phase_2_without_phase_1_is_rejected() {
        let mut sim = SimulatedDacBank::new();
        let cfg = config(
            SpiFlags::INPUT | SpiFlags::HALF_DUPLEX | SpiFlags::END,
            24,
            dac(0),
        );
        sim.set_config(cfg).unwrap();
        assert!(matches!(
            sim.write(instruction_frame(read_instruction(REG_VERSION))),
            Err(SimError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn chip_select_change_between_phases_is_rejected() {
        let mut sim = SimulatedDacBank::new();
        let frame = instruction_frame(read_instruction(REG_CLKMODE));
        sim.set_config(config(SpiFlags::NONE, 8, dac(1))).unwrap();
        sim.write(frame).unwrap();
        sim.set_config(config(
            SpiFlags::INPUT | SpiFlags::HALF_DUPLEX | SpiFlags::END,
            24,
            dac(2),
        ))
        .unwrap();
        assert_eq!(
            sim.write(frame),
            Err(SimError::ProtocolViolation(
                "chip select changed between read phases"
            ))
        );
    }

    #[test]
    fn write_that_holds_chip_select_is_rejected() {
        let mut sim = SimulatedDacBank::new();
        sim.set_config(config(SpiFlags::NONE, 24, dac(0))).unwrap();
        assert!(sim.write(write_frame(0x05, 0x80)).is_err());
        assert!(sim.events().is_empty());
    }

    #[test]
    fn clock_mode_is_checked() {
        let mut sim = SimulatedDacBank::new();
        let cfg = SpiConfig {
            flags: SpiFlags::END,
            length: 24,
            divider: 16,
            chip_select: 0b1111,
        };
        assert!(sim.set_config(cfg).is_err());
    }

    #[test]
    fn decoder_disabled_selects_nothing() {
        let mut sim = SimulatedDacBank::new();
        let cfg = SpiConfig {
            chip_select: 0b0111,
            ..config(SpiFlags::END, 24, dac(0))
        };
        sim.set_config(cfg).unwrap();
        assert_eq!(
            sim.write(write_frame(0x05, 1)),
            Err(SimError::NoChipSelected(0b0111))
        );
    }
}
