//! AD9117 register map and SPI frame layout
//!
//! Every transaction starts with one instruction byte:
//!
//! ```text
//! | R/W̅ | N1 N0 | A4 A3 A2 A1 A0 |
//!    7    6  5    4            0
//! ```
//!
//! `N1 N0` (transfer length) is always `0b00` here: one register per
//! transaction. Writes follow the instruction with 16 data bits in the same
//! transfer; reads clock the 16 response bits in a separate, half-duplex
//! input transfer on the same chip select.

#![allow(clippy::arithmetic_side_effects)] // fixed-width shifts on masked fields

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// SPI control (soft reset, LSB-first, 3-wire mode)
pub const REG_SPI_CONTROL: u8 = 0x00;

/// Power-down control
pub const REG_POWER_DOWN: u8 = 0x01;

/// Data interface control
pub const REG_DATA_CONTROL: u8 = 0x02;

/// I-channel internal common-mode resistor control
pub const REG_IRCML: u8 = 0x05;

/// Q-channel internal common-mode resistor control
pub const REG_QRCML: u8 = 0x08;

/// Clock mode / data-path timing status
pub const REG_CLKMODE: u8 = 0x14;

/// Chip version (read-only)
pub const REG_VERSION: u8 = 0x1F;

// ---------------------------------------------------------------------------
// Register values
// ---------------------------------------------------------------------------

/// Version every chip on the board must report.
pub const EXPECTED_VERSION: u16 = 0x0A;

/// REG_IRCML / REG_QRCML: enable the on-chip common-mode resistor
pub const RCML_ENABLE: u16 = 1 << 7;

// ---------------------------------------------------------------------------
// Instruction byte
// ---------------------------------------------------------------------------

/// Read opcode (instruction bit 7)
pub const OPCODE_READ: u8 = 1 << 7;

/// Register address field of the instruction byte
pub const REGISTER_MASK: u8 = 0x1F;

/// Bits in a register write transfer: instruction + 16 data bits.
pub const WRITE_FRAME_BITS: u8 = 24;

/// Bits in read phase 1: the instruction only.
pub const READ_COMMAND_BITS: u8 = 8;

/// Bits in read phase 2: the instruction plus 16 response bits.
pub const READ_FRAME_BITS: u8 = 24;

/// Response bits kept from a read.
pub const READ_DATA_MASK: u32 = 0xFFFF;

const INSTRUCTION_SHIFT: u32 = 24;
const WRITE_DATA_SHIFT: u32 = 8;

/// Instruction byte for a register write.
pub const fn write_instruction(register: u8) -> u8 {
    register & REGISTER_MASK
}

/// Instruction byte for a register read.
pub const fn read_instruction(register: u8) -> u8 {
    OPCODE_READ | (register & REGISTER_MASK)
}

/// Left-aligned 24-bit write frame.
pub const fn write_frame(register: u8, data: u16) -> u32 {
    ((write_instruction(register) as u32) << INSTRUCTION_SHIFT)
        | ((data as u32) << WRITE_DATA_SHIFT)
}

/// Left-aligned frame carrying only `instruction`.
pub const fn instruction_frame(instruction: u8) -> u32 {
    (instruction as u32) << INSTRUCTION_SHIFT
}

/// Instruction byte of a left-aligned frame.
#[allow(clippy::cast_possible_truncation)] // top byte only
pub const fn frame_instruction(frame: u32) -> u8 {
    (frame >> INSTRUCTION_SHIFT) as u8
}

/// 16 data bits of a left-aligned write frame.
#[allow(clippy::cast_possible_truncation)] // masked to 16 bits
pub const fn frame_data(frame: u32) -> u16 {
    ((frame >> WRITE_DATA_SHIFT) & READ_DATA_MASK) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_frame_layout() {
        // opcode 0, N = 00, register 0x05, data 0x0080
        assert_eq!(write_frame(REG_IRCML, RCML_ENABLE), 0x0500_8000);
    }

    #[test]
    fn read_instruction_sets_opcode() {
        assert_eq!(read_instruction(REG_VERSION), 0x9F);
        assert_eq!(
            instruction_frame(read_instruction(REG_CLKMODE)),
            0x9400_0000
        );
    }

    #[test]
    fn register_field_is_five_bits() {
        assert_eq!(write_instruction(0xFF), 0x1F);
        assert_eq!(read_instruction(0x7F), 0x9F);
    }

    #[test]
    fn frame_accessors_invert_write_frame() {
        let frame = write_frame(REG_QRCML, 0xBEEF);
        assert_eq!(frame_instruction(frame), REG_QRCML);
        assert_eq!(frame_data(frame), 0xBEEF);
    }
}
