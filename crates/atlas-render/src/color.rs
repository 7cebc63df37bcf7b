//! Display colors.
//!
//! Annotation colors are stored as free-form hints. They are parsed here,
//! at paint time, and anything unparseable falls back to the configured
//! default instead of failing the paint.

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, or `#RRGGBBAA`; the `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channels: Vec<u8> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_val(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };

        let unit = |v: u8| v as f32 / 255.0;
        Some(Self::rgba(
            unit(channels[0]),
            unit(channels[1]),
            unit(channels[2]),
            channels.get(3).copied().map_or(1.0, unit),
        ))
    }

    /// Parse `hint`, falling back to `fallback`, then to black.
    pub fn resolve(hint: Option<&str>, fallback: &str) -> Self {
        hint.and_then(Self::from_hex)
            .or_else(|| Self::from_hex(fallback))
            .unwrap_or(Self::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_all_hex_lengths() {
        assert_eq!(Color::from_hex("#FFF"), Some(Color::rgba(1.0, 1.0, 1.0, 1.0)));
        assert_eq!(Color::from_hex("000F"), Some(Color::rgba(0.0, 0.0, 0.0, 1.0)));
        assert_eq!(Color::from_hex("#FF0000"), Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(
            Color::from_hex("#00FF0000"),
            Some(Color::rgba(0.0, 1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::from_hex("red"), None);
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn resolve_falls_back() {
        assert_eq!(
            Color::resolve(Some("crimson"), "#0000FF"),
            Color::rgba(0.0, 0.0, 1.0, 1.0)
        );
        assert_eq!(Color::resolve(None, "nope"), Color::BLACK);
    }
}
