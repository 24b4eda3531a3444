//! Window-size inspection of Brotli frame headers (RFC 7932, section 9.1).
//!
//! The decoder engine accepts any window the format allows, so callers that
//! want to bound decoder memory look at the first byte of each frame and
//! reject the stream before it is handed to the engine.

use crate::BROTLI_MAX_WINDOW_BITS;

/// Value returned for frames using the non-standard large-window extension.
///
/// It is strictly greater than [`BROTLI_MAX_WINDOW_BITS`], so comparing it
/// against any valid ceiling rejects the frame.
pub const LARGE_WINDOW_SENTINEL: u32 = BROTLI_MAX_WINDOW_BITS + 1;

/// Returns the window bits declared by the first byte of a Brotli frame.
///
/// Large-window frames (not part of RFC 7932 and unsupported in web
/// contexts) yield [`LARGE_WINDOW_SENTINEL`].
///
/// # Example
///
/// ```rust
/// use oxiarc_brotli::inspect_window_bits;
///
/// assert_eq!(inspect_window_bits(0x00), 16);
/// assert_eq!(inspect_window_bits(0x0B), 22);
/// ```
pub const fn inspect_window_bits(first_byte: u8) -> u32 {
    if first_byte & 0x01 == 0 {
        return 16;
    }

    let short = ((first_byte >> 1) & 0x07) as u32;
    if short != 0 {
        return 17 + short;
    }

    match ((first_byte >> 4) & 0x07) as u32 {
        0 => 17,
        1 => LARGE_WINDOW_SENTINEL,
        long => 8 + long,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_16_when_low_bit_clear() {
        assert_eq!(inspect_window_bits(0x00), 16);
        assert_eq!(inspect_window_bits(0x06), 16);
        assert_eq!(inspect_window_bits(0xFE), 16);
    }

    #[test]
    fn test_short_window_codes() {
        // (lgwin - 17) << 1 | 1
        assert_eq!(inspect_window_bits(0x03), 18);
        assert_eq!(inspect_window_bits(0x05), 19);
        assert_eq!(inspect_window_bits(0x0B), 22);
        assert_eq!(inspect_window_bits(0x0F), 24);
        // Upper bits do not matter once the short code is non-zero.
        assert_eq!(inspect_window_bits(0xF5), 19);
    }

    #[test]
    fn test_long_window_codes() {
        assert_eq!(inspect_window_bits(0x01), 17);
        assert_eq!(inspect_window_bits(0x21), 10);
        assert_eq!(inspect_window_bits(0x41), 12);
        assert_eq!(inspect_window_bits(0x71), 15);
    }

    #[test]
    fn test_large_window_is_rejected_by_every_ceiling() {
        assert_eq!(inspect_window_bits(0x11), LARGE_WINDOW_SENTINEL);
        assert!(inspect_window_bits(0x11) > BROTLI_MAX_WINDOW_BITS);
    }

    #[test]
    fn test_every_byte_maps_into_range() {
        for byte in 0..=u8::MAX {
            let bits = inspect_window_bits(byte);
            assert!((10..=LARGE_WINDOW_SENTINEL).contains(&bits), "byte {byte:#04x}");
        }
    }
}
