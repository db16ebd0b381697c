use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in `[0, 1]`.
///
/// Colours coming from the UI are hex strings (`#05CFE8`, `0x05cfe8`,
/// `05cfe8`, short `#fff`) or packed integers. Malformed input falls
/// back to black instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from a packed `0xRRGGBB` integer.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self::new(r, g, b)
    }

    /// Parses a hex colour string, returning `None` when malformed.
    #[must_use]
    pub fn try_parse(input: &str) -> Option<Self> {
        let s = input.trim();
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            3 => {
                // #rgb -> #rrggbb
                let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16).ok().map(Self::from_hex)
            }
            _ => None,
        }
    }

    /// Parses a hex colour string; malformed input yields black.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::try_parse(input).unwrap_or_else(|| {
            log::warn!("Malformed colour '{input}', falling back to black");
            Self::BLACK
        })
    }

    #[must_use]
    pub fn to_hex(&self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    /// 8-bit channels, truncating like `floor(c * 255)`.
    ///
    /// A small bias absorbs f32 error so packed colours round-trip.
    #[must_use]
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 1e-3).floor().min(255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    #[must_use]
    pub fn to_rgba8(&self) -> [u8; 4] {
        let [r, g, b] = self.to_rgb8();
        [r, g, b, 255]
    }

    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::from(self.to_vec3().lerp(other.to_vec3(), t))
    }

    #[must_use]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    #[must_use]
    pub fn to_vec4(&self, alpha: f32) -> Vec4 {
        self.to_vec3().extend(alpha)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{:06x}", c.to_hex())
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_hex_spelling() {
        let expected = Color::from_hex(0x05cfe8);
        assert_eq!(Color::parse("#05CFE8"), expected);
        assert_eq!(Color::parse("0x05cfe8"), expected);
        assert_eq!(Color::parse("05cfe8"), expected);
        assert_eq!(Color::parse("#fff"), Color::WHITE);
    }

    #[test]
    fn malformed_input_is_black() {
        assert_eq!(Color::parse("not a colour"), Color::BLACK);
        assert_eq!(Color::parse("#12345"), Color::BLACK);
        assert_eq!(Color::parse(""), Color::BLACK);
    }

    #[test]
    fn rgb8_truncates() {
        assert_eq!(Color::from_hex(0x00e1ca).to_rgb8(), [0x00, 0xe1, 0xca]);
        assert_eq!(Color::new(0.999, 0.5, 0.0).to_rgb8(), [254, 127, 0]);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::from_hex(0xcccccc)).unwrap();
        assert_eq!(json, "\"#cccccc\"");
        let back: Color = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back, Color::BLACK);
    }
}
