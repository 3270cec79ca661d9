//! Hex color strings
//!
//! Colors travel as `#` followed by two hex digits per channel. Decoding
//! is lenient: characters that are not hex digits count as zero and missing
//! pairs decode as zero, so any input yields a value.

use core::fmt::Write;

use heapless::String;

/// Maximum number of channels carried by one color string
pub const MAX_HEX_CHANNELS: usize = 5;

/// Value of a single hex digit, zero for anything else
pub const fn hex_digit(ch: u8) -> u8 {
    match ch {
        b'0'..=b'9' => ch - b'0',
        b'a'..=b'f' => ch - b'a' + 10,
        b'A'..=b'F' => ch - b'A' + 10,
        _ => 0,
    }
}

/// Decode a run of hex digits, saturating at 255
pub fn hex_to_u8(digits: &[u8]) -> u8 {
    let value = digits
        .iter()
        .fold(0u16, |acc, &ch| {
            acc.saturating_mul(16).saturating_add(u16::from(hex_digit(ch)))
        });
    u8::try_from(value).unwrap_or(u8::MAX)
}

/// Append `value` as two lowercase hex digits
pub fn push_hex<const N: usize>(out: &mut String<N>, value: u8) {
    let _ = write!(out, "{value:02x}");
}

/// Per-channel levels parsed from a `#..` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HexColor {
    levels: [u8; MAX_HEX_CHANNELS],
}

impl HexColor {
    /// Parse a color string, `None` if it does not start with `#`
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#')?.as_bytes();

        let mut levels = [0u8; MAX_HEX_CHANNELS];
        for (i, level) in levels.iter_mut().enumerate() {
            let start = (2 * i).min(digits.len());
            let end = (2 * i + 2).min(digits.len());
            *level = hex_to_u8(&digits[start..end]);
        }
        Some(Self { levels })
    }

    /// Level of the `index`-th pair, zero past the end
    pub fn level(&self, index: usize) -> u8 {
        self.levels.get(index).copied().unwrap_or(0)
    }
}
