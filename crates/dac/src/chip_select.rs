//! DAC chip-select masks
//!
//! The eight DACs sit behind a 3-to-8 decoder. A mask is four bits: bit 3 is
//! the decoder enable (always set, so the bus asserts some chip), bits 2..0
//! are the inverted DAC address.
//!
//! | DAC | mask     |
//! |-----|----------|
//! | 0   | `0b1111` |
//! | 1   | `0b1110` |
//! | …   | …        |
//! | 7   | `0b1000` |

use platform::{DacIndex, DAC_COUNT};

/// Decoder-enable bit, set in every mask.
pub const CS_N_BIT: u8 = 1 << 3;

const ADDRESS_BITS: u8 = 0b111;

/// Chip-select mask per DAC index.
pub const DAC_CS_MASKS: [u8; DAC_COUNT] = [
    0b1111, 0b1110, 0b1101, 0b1100, 0b1011, 0b1010, 0b1001, 0b1000,
];

/// Chip-select mask for `dac`.
pub fn chip_select(dac: DacIndex) -> u8 {
    // DacIndex is always < DAC_COUNT; the fallback is unreachable.
    DAC_CS_MASKS.get(dac.as_usize()).copied().unwrap_or(CS_N_BIT)
}

/// DAC addressed by `mask`, or `None` if the decoder is not enabled or the
/// mask has bits outside the table's four.
pub fn decode_chip_select(mask: u8) -> Option<DacIndex> {
    if mask & CS_N_BIT == 0 || mask & !(CS_N_BIT | ADDRESS_BITS) != 0 {
        return None;
    }
    DacIndex::new(!mask & ADDRESS_BITS).ok()
}
