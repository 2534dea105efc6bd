//! Hex color parsing.

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Normalized components in 0.0..=1.0, as PDF content streams expect.
    pub fn to_normalized(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Parse `#RRGGBB` or shorthand `#RGB` (leading `#` optional, either case).
/// Shorthand digits are doubled. Returns `None` for anything else.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&expanded[range], 16).ok();
    Some(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_six_digit_form() {
        assert_eq!(
            hex_to_rgb("#ff8000"),
            Some(Rgb {
                r: 255,
                g: 128,
                b: 0
            })
        );
    }

    #[test]
    fn parses_without_hash() {
        assert_eq!(hex_to_rgb("000000"), Some(Rgb { r: 0, g: 0, b: 0 }));
    }

    #[test]
    fn expands_shorthand() {
        assert_eq!(
            hex_to_rgb("#03F"),
            Some(Rgb {
                r: 0x00,
                g: 0x33,
                b: 0xFF
            })
        );
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(hex_to_rgb("#AbCdEf"), hex_to_rgb("#abcdef"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(hex_to_rgb(""), None);
        assert_eq!(hex_to_rgb("#12"), None);
        assert_eq!(hex_to_rgb("#12345"), None);
        assert_eq!(hex_to_rgb("#1234567"), None);
        assert_eq!(hex_to_rgb("#ggg"), None);
        assert_eq!(hex_to_rgb("not a color"), None);
    }

    #[test]
    fn normalizes_channels() {
        let (r, g, b) = Rgb {
            r: 255,
            g: 128,
            b: 0,
        }
        .to_normalized();
        assert!((r - 1.0).abs() < 0.001);
        assert!((g - 0.502).abs() < 0.01);
        assert!(b.abs() < 0.001);
    }
}
