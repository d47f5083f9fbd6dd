//! Control facade
//!
//! [`Shuttler`] is the single entry point an experiment uses: it turns sample
//! writes into command words on the real-time link, and forwards bring-up and
//! status requests to the DAC bank.
//!
//! Every command word carries the channel's enable bit, so the facade keeps a
//! small shadow per channel (enable level and last written sample). Writing a
//! sample re-sends the current enable level; changing the enable level
//! re-sends the last sample with the new bit, so playback can be toggled
//! without touching the buffer.

use dac::DacBank;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use platform::{DacIndex, RtioLink, TimingConfig};
use playback::{decode, encode, SampleCommand, N_SAMPLES};

use crate::error::ShuttlerError;

/// Channels whose enable shadow a [`Shuttler`] can track.
pub const MAX_CHANNELS: usize = 16;

/// Outcome of the last DAC bank bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankState {
    /// No successful bring-up yet.
    Uninitialized,
    /// Every chip passed its identity check and is calibrated.
    Ready,
    /// Bring-up stopped at `dac`.
    Faulted {
        /// Chip that failed its identity check.
        dac: DacIndex,
    },
}

/// Per-channel mirror of what was last sent on the link.
#[derive(Debug, Clone, Copy)]
struct ChannelShadow {
    enabled: bool,
    last: SampleCommand,
}

impl Default for ChannelShadow {
    fn default() -> Self {
        Self {
            enabled: false,
            last: decode(encode(0, 0, false)),
        }
    }
}

/// Error type of a facade over link `L` and bank `B`.
pub type Error<L, B> = ShuttlerError<<L as RtioLink>::Error, <B as DacBank>::BusError>;

/// Control facade over one link, one DAC bank and the AWG reset line.
pub struct Shuttler<L, B, D, P> {
    link: L,
    bank: B,
    delay: D,
    awg_reset: P,
    timing: TimingConfig,
    channels: heapless::LinearMap<u32, ChannelShadow, MAX_CHANNELS>,
    bank_state: BankState,
}

impl<L, B, D, P> Shuttler<L, B, D, P>
where
    L: RtioLink,
    B: DacBank,
    D: DelayNs,
    P: OutputPin,
{
    /// Create a facade with the default [`TimingConfig`].
    pub fn new(link: L, bank: B, delay: D, awg_reset: P) -> Self {
        Self::with_timing(link, bank, delay, awg_reset, TimingConfig::default())
    }

    /// Create a facade with explicit timing.
    pub fn with_timing(link: L, bank: B, delay: D, awg_reset: P, timing: TimingConfig) -> Self {
        Self {
            link,
            bank,
            delay,
            awg_reset,
            timing,
            channels: heapless::LinearMap::new(),
            bank_state: BankState::Uninitialized,
        }
    }

    fn shadow(&mut self, channel: u32) -> Result<&mut ChannelShadow, Error<L, B>> {
        if !self.channels.contains_key(&channel) {
            self.channels
                .insert(channel, ChannelShadow::default())
                .map_err(|_| ShuttlerError::TooManyChannels(channel))?;
        }
        self.channels
            .get_mut(&channel)
            .ok_or(ShuttlerError::TooManyChannels(channel))
    }

    fn send(&mut self, channel: u32, cmd: SampleCommand) -> Result<(), Error<L, B>> {
        let word = cmd.encode();
        self.link
            .output(word.rtio_target(channel), word.payload())
            .map_err(ShuttlerError::Link)
    }

    /// Write one sample. Address and value are truncated to their field
    /// widths (10 and 14 bits); the channel's current enable level is kept.
    pub fn write_sample(
        &mut self,
        channel: u32,
        address: u32,
        value: i32,
    ) -> Result<(), Error<L, B>> {
        let shadow = self.shadow(channel)?;
        let cmd = decode(encode(address, value, shadow.enabled));
        shadow.last = cmd;
        self.send(channel, cmd)
    }

    /// Write `values` to addresses `0..values.len()`, in order, waiting the
    /// configured sample-write spacing between consecutive writes.
    pub fn write_samples(&mut self, channel: u32, values: &[i32]) -> Result<(), Error<L, B>> {
        if values.len() > N_SAMPLES {
            tracing::warn!(
                channel,
                len = values.len(),
                "more samples than buffer slots, addresses will wrap"
            );
        }
        let spacing_ns = self.timing.sample_write_spacing_ns();
        for (address, &value) in (0u32..).zip(values) {
            if address > 0 {
                self.delay.delay_ns(spacing_ns);
            }
            self.write_sample(channel, address, value)?;
        }
        tracing::debug!(channel, count = values.len(), "samples written");
        Ok(())
    }

    /// Switch playback on `channel` on or off.
    ///
    /// Re-sends the last sample written on this channel (address 0, value 0
    /// if none was) with the new enable bit.
    pub fn set_enable(&mut self, channel: u32, enabled: bool) -> Result<(), Error<L, B>> {
        let shadow = self.shadow(channel)?;
        shadow.enabled = enabled;
        shadow.last.enable = enabled;
        let cmd = shadow.last;
        tracing::debug!(channel, enabled, "playback enable");
        self.send(channel, cmd)
    }

    /// Pulse the AWG output-domain reset line.
    pub fn reset_awg(&mut self) -> Result<(), Error<L, B>> {
        self.awg_reset
            .set_high()
            .map_err(|e| ShuttlerError::Pin(e.kind()))?;
        self.delay.delay_ns(self.timing.awg_reset_pulse_ns);
        self.awg_reset
            .set_low()
            .map_err(|e| ShuttlerError::Pin(e.kind()))
    }

    /// Run the DAC bank bring-up and record its outcome.
    pub fn initialize_dac_bank(&mut self) -> Result<(), Error<L, B>> {
        match self.bank.initialize() {
            Ok(()) => {
                self.bank_state = BankState::Ready;
                Ok(())
            }
            Err(e) => {
                self.bank_state = match e.faulted_dac() {
                    Some(dac) => BankState::Faulted { dac },
                    None => BankState::Uninitialized,
                };
                tracing::error!(state = ?self.bank_state, "DAC bank bring-up failed: {e:?}");
                Err(ShuttlerError::Dac(e))
            }
        }
    }

    /// Read the timing status register of DAC `dac` (0..8).
    ///
    /// After a faulted bring-up only the chips ahead of the faulted one were
    /// calibrated; those stay readable, the rest are refused.
    pub fn get_dac_timing_status(&mut self, dac: u8) -> Result<u16, Error<L, B>> {
        let index = DacIndex::new(dac).map_err(|_| ShuttlerError::InvalidDac(dac))?;
        match self.bank_state {
            BankState::Uninitialized => Err(ShuttlerError::NotInitialized),
            BankState::Faulted { dac } if index >= dac => Err(ShuttlerError::BankFaulted { dac }),
            BankState::Faulted { .. } | BankState::Ready => Ok(self.bank.timing_status(index)?),
        }
    }

    /// Outcome of the last bring-up.
    pub fn bank_state(&self) -> BankState {
        self.bank_state
    }

    /// Enable level last sent on `channel`.
    pub fn is_enabled(&self, channel: u32) -> bool {
        self.channels.get(&channel).is_some_and(|s| s.enabled)
    }

    /// Timing in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// The link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// The DAC bank.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Hand back the owned parts.
    pub fn release(self) -> (L, B, D, P) {
        (self.link, self.bank, self.delay, self.awg_reset)
    }
}

impl<L, B, D, P> core::fmt::Debug for Shuttler<L, B, D, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Shuttler")
            .field("bank_state", &self.bank_state)
            .field("channels", &self.channels.len())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
