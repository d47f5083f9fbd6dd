//! Link codec: bit-exact packing of sample writes into RTIO command words.
//!
//! The link's address field is only 8 bits wide, but a channel holds 1024
//! samples. The two address bits that do not fit ride in the top of the
//! payload, directly above the enable bit:
//!
//! ```text
//! link address  | ADDR[7:0] |
//!
//! payload (17)  | ADDR[9:8] | ENABLE |  VALUE[13:0]  |
//!                  16   15      14      13         0
//! ```
//!
//! This module is the only place that knows the split point. Inputs are
//! masked to their field widths; overflow silently drops the high bits.

#![allow(clippy::arithmetic_side_effects)] // fixed-width shifts on masked fields

/// Width of one DAC sample in bits.
pub const SAMPLE_WIDTH: u32 = 14;
/// Width of the link's address field in bits.
pub const LINK_ADDRESS_WIDTH: u32 = 8;
/// Width of a logical sample address in bits.
pub const ADDRESS_WIDTH: u32 = 10;
/// Address bits carried in the payload.
pub const ADDRESS_HIGH_WIDTH: u32 = ADDRESS_WIDTH - LINK_ADDRESS_WIDTH;
/// Width of the link's payload field in bits.
pub const PAYLOAD_WIDTH: u32 = SAMPLE_WIDTH + 1 + ADDRESS_HIGH_WIDTH;

/// Samples per channel (the logical address space).
pub const N_SAMPLES: usize = 1 << ADDRESS_WIDTH;

/// Mask of the value field.
pub const SAMPLE_MASK: u32 = (1 << SAMPLE_WIDTH) - 1;
/// Bit position of the enable flag in the payload.
pub const ENABLE_BIT: u32 = SAMPLE_WIDTH;
/// Shift of the address-high bits in the payload.
pub const ADDRESS_HIGH_SHIFT: u32 = ENABLE_BIT + 1;

const ADDRESS_MASK: u32 = (1 << ADDRESS_WIDTH) - 1;
const ADDRESS_HIGH_MASK: u32 = (1 << ADDRESS_HIGH_WIDTH) - 1;
const LINK_ADDRESS_MASK: u32 = (1 << LINK_ADDRESS_WIDTH) - 1;
const PAYLOAD_MASK: u32 = (1 << PAYLOAD_WIDTH) - 1;

const _: () = assert!(PAYLOAD_WIDTH == 17);
const _: () = assert!(N_SAMPLES == 1024);

/// One word on the control link: the 8-bit address field and the 17-bit
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandWord {
    address: u8,
    payload: u32,
}

impl CommandWord {
    /// Build a word from raw link fields. Payload bits above bit 16 are dropped.
    pub const fn from_parts(address: u8, payload: u32) -> Self {
        Self {
            address,
            payload: payload & PAYLOAD_MASK,
        }
    }

    /// The link address field.
    pub const fn address(self) -> u8 {
        self.address
    }

    /// The 17-bit payload field.
    pub const fn payload(self) -> u32 {
        self.payload
    }

    /// RTIO target word for this command on `channel`.
    ///
    /// Channel bits beyond the 24 that fit above the address field are lost.
    pub const fn rtio_target(self, channel: u32) -> u32 {
        (channel << LINK_ADDRESS_WIDTH) | self.address as u32
    }

    /// Split an RTIO event back into its channel and command word.
    #[allow(clippy::cast_possible_truncation)] // masked to 8 bits first
    pub const fn from_rtio(target: u32, data: u32) -> (u32, Self) {
        let channel = target >> LINK_ADDRESS_WIDTH;
        let address = (target & LINK_ADDRESS_MASK) as u8;
        (channel, Self::from_parts(address, data))
    }
}

/// A decoded sample write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCommand {
    /// Logical address in `[0, N_SAMPLES)`.
    pub address: u16,
    /// 14-bit sample code.
    pub value: u16,
    /// Playback enable level carried by the word.
    pub enable: bool,
}

impl SampleCommand {
    /// The sample code read as a 14-bit two's complement number.
    #[allow(clippy::cast_possible_wrap)] // intentional reinterpretation
    pub const fn signed_value(self) -> i16 {
        ((self.value << 2) as i16) >> 2
    }

    /// Encode this command back onto the link.
    pub fn encode(self) -> CommandWord {
        encode(u32::from(self.address), i32::from(self.value), self.enable)
    }
}

/// Pack a sample write into a command word.
///
/// `address` is truncated to 10 bits and `value` to 14 bits (negative values
/// keep their two's complement low bits).
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)] // masked bit-packing
pub fn encode(address: u32, value: i32, enable: bool) -> CommandWord {
    let address = address & ADDRESS_MASK;
    let value = (value as u32) & SAMPLE_MASK;
    let payload = value
        | (u32::from(enable) << ENABLE_BIT)
        | ((address >> LINK_ADDRESS_WIDTH) << ADDRESS_HIGH_SHIFT);
    CommandWord::from_parts((address & LINK_ADDRESS_MASK) as u8, payload)
}

/// Unpack a command word.
#[allow(clippy::cast_possible_truncation)] // every field is masked to < 16 bits
pub fn decode(word: CommandWord) -> SampleCommand {
    let payload = word.payload();
    let high = (payload >> ADDRESS_HIGH_SHIFT) & ADDRESS_HIGH_MASK;
    SampleCommand {
        address: ((high << LINK_ADDRESS_WIDTH) | u32::from(word.address())) as u16,
        value: (payload & SAMPLE_MASK) as u16,
        enable: (payload >> ENABLE_BIT) & 1 == 1,
    }
}
