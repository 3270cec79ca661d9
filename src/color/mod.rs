mod hex;

pub use hex::{HexColor, hex_digit, hex_to_u8, push_hex};
use smart_leds::RGB8;

pub type Rgb = RGB8;
