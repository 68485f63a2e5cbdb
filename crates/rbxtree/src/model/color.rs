//! Color kinds: float triplet, byte-scaled triplet and palette index.

use std::fmt;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// RGB color with normalized float components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from 0-255 components. Out-of-range input is not clamped.
    pub fn from_rgb(r: i32, g: i32, b: i32) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Color from hue, saturation and value, each in `[0, 1]`.
    pub fn from_hsv(hue: f64, sat: f64, val: f64) -> Self {
        let h = (hue.rem_euclid(1.0)) * 6.0;
        let sector = h.floor();
        let frac = h - sector;
        let p = val * (1.0 - sat);
        let q = val * (1.0 - sat * frac);
        let t = val * (1.0 - sat * (1.0 - frac));
        let (r, g, b) = match sector as i32 {
            0 => (val, t, p),
            1 => (q, val, p),
            2 => (p, val, t),
            3 => (p, q, val),
            4 => (t, p, val),
            _ => (val, p, q),
        };
        Self::new(r as f32, g as f32, b as f32)
    }

    /// Returns `(hue, saturation, value)`, each in `[0, 1]`.
    pub fn to_hsv(self) -> (f64, f64, f64) {
        let (r, g, b) = (self.r as f64, self.g as f64, self.b as f64);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let val = max;
        let sat = if max == 0.0 { 0.0 } else { delta / max };
        if delta == 0.0 {
            return (0.0, sat, val);
        }
        let hue = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (hue / 6.0, sat, val)
    }

    pub fn lerp(self, goal: Self, alpha: f64) -> Self {
        let mix = |a: f32, b: f32| (a as f64 + (b as f64 - a as f64) * alpha) as f32;
        Self::new(mix(self.r, goal.r), mix(self.g, goal.g), mix(self.b, goal.b))
    }
}

impl fmt::Display for Color3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

/// Color stored as bytes on disk and as normalized floats in memory.
///
/// Conversion to bytes clamps to `[0, 1]` and rounds, so every byte triple
/// survives any number of byte -> normalized -> byte cycles unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color3uint8 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3uint8 {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [to_byte(self.r), to_byte(self.g), to_byte(self.b)]
    }

    pub fn to_color3(self) -> Color3 {
        Color3::new(self.r, self.g, self.b)
    }
}

impl From<Color3> for Color3uint8 {
    fn from(c: Color3) -> Self {
        Self::new(c.r, c.g, c.b)
    }
}

fn to_byte(c: f32) -> u8 {
    // NaN maps to 0 through the saturating cast.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color3uint8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_bytes();
        write!(f, "{r}, {g}, {b}")
    }
}

// =============================================================================
// BRICK COLOR
// =============================================================================

/// Palette entries as (number, name, r, g, b).
const PALETTE: &[(u32, &str, u8, u8, u8)] = &[
    (1, "White", 242, 243, 243),
    (5, "Brick yellow", 215, 197, 154),
    (21, "Bright red", 196, 40, 28),
    (23, "Bright blue", 13, 105, 172),
    (24, "Bright yellow", 245, 205, 48),
    (26, "Black", 27, 42, 53),
    (28, "Dark green", 40, 127, 71),
    (37, "Bright green", 75, 151, 75),
    (102, "Medium blue", 110, 153, 202),
    (106, "Bright orange", 218, 133, 65),
    (119, "Br. yellowish green", 164, 189, 71),
    (192, "Reddish brown", 105, 64, 40),
    (194, "Medium stone grey", 163, 162, 165),
    (199, "Dark stone grey", 99, 95, 98),
    (208, "Light stone grey", 229, 228, 223),
    (1001, "Institutional white", 248, 248, 248),
    (1003, "Really black", 17, 17, 17),
    (1004, "Really red", 255, 0, 0),
    (1010, "Really blue", 0, 0, 255),
    (1020, "Lime green", 0, 255, 0),
];

lazy_static! {
    static ref BY_NUMBER: FxHashMap<u32, usize> =
        PALETTE.iter().enumerate().map(|(i, e)| (e.0, i)).collect();
    static ref BY_NAME: FxHashMap<&'static str, usize> =
        PALETTE.iter().enumerate().map(|(i, e)| (e.1, i)).collect();
}

/// Index into the named-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrickColor(pub u32);

impl Default for BrickColor {
    fn default() -> Self {
        BrickColor::DEFAULT
    }
}

impl BrickColor {
    /// "Medium stone grey", used for unknown numbers.
    pub const DEFAULT: BrickColor = BrickColor(194);

    /// Palette entry for `number`, falling back to the default color.
    pub fn from_number(number: u32) -> Self {
        if BY_NUMBER.contains_key(&number) {
            BrickColor(number)
        } else {
            Self::DEFAULT
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).map(|i| BrickColor(PALETTE[*i].0))
    }

    /// Nearest palette entry to `color` by squared RGB distance.
    pub fn nearest(color: Color3) -> Self {
        let [r, g, b] = Color3uint8::from(color).to_bytes();
        let dist = |e: &(u32, &str, u8, u8, u8)| {
            let d = |a: u8, b: u8| (a as i32 - b as i32).pow(2);
            d(e.2, r) + d(e.3, g) + d(e.4, b)
        };
        PALETTE
            .iter()
            .min_by_key(|e| dist(e))
            .map(|e| BrickColor(e.0))
            .unwrap_or(Self::DEFAULT)
    }

    pub fn number(self) -> u32 {
        self.0
    }

    fn entry(self) -> &'static (u32, &'static str, u8, u8, u8) {
        let index = BY_NUMBER
            .get(&self.0)
            .or_else(|| BY_NUMBER.get(&Self::DEFAULT.0))
            .copied()
            .unwrap_or(0);
        &PALETTE[index]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn color(self) -> Color3 {
        let e = self.entry();
        Color3::from_rgb(e.2 as i32, e.3 as i32, e.4 as i32)
    }
}

impl fmt::Display for BrickColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color3uint8_byte_cycles() {
        let mut color = Color3uint8::from_bytes([255, 128, 0]);
        for _ in 0..200 {
            color = Color3uint8::from_bytes(color.to_bytes());
        }
        assert_eq!(color.to_bytes(), [255, 128, 0]);
    }

    #[test]
    fn test_color3uint8_rounds_instead_of_truncating() {
        // 0.5 * 255 = 127.5; truncation would give 127.
        assert_eq!(Color3uint8::new(0.5, 1.0, 0.0).to_bytes(), [128, 255, 0]);
        assert_eq!(Color3uint8::new(-1.0, 2.0, f32::NAN).to_bytes(), [0, 255, 0]);
    }

    #[test]
    fn test_every_byte_survives() {
        for byte in 0..=255u8 {
            assert_eq!(Color3uint8::from_bytes([byte; 3]).to_bytes(), [byte; 3]);
        }
    }

    #[test]
    fn test_hsv_roundtrip() {
        let color = Color3::from_rgb(200, 100, 50);
        let (h, s, v) = color.to_hsv();
        let back = Color3::from_hsv(h, s, v);
        assert!((back.r - color.r).abs() < 1e-6);
        assert!((back.g - color.g).abs() < 1e-6);
        assert!((back.b - color.b).abs() < 1e-6);
    }

    #[test]
    fn test_brick_color_lookup() {
        assert_eq!(BrickColor::from_name("Bright red"), Some(BrickColor(21)));
        assert_eq!(BrickColor::from_name("Nope"), None);
        assert_eq!(BrickColor::from_number(999_999), BrickColor::DEFAULT);
        assert_eq!(BrickColor(1004).color(), Color3::new(1.0, 0.0, 0.0));
        assert_eq!(BrickColor::nearest(Color3::new(0.0, 0.0, 0.95)), BrickColor(1010));
        assert_eq!(BrickColor::default().to_string(), "Medium stone grey");
    }

    proptest::proptest! {
        #[test]
        fn test_any_byte_triple_survives_cycles(bytes in proptest::array::uniform3(0u8..=255)) {
            let mut color = Color3uint8::from_bytes(bytes);
            for _ in 0..100 {
                color = Color3uint8::from_bytes(color.to_bytes());
            }
            proptest::prop_assert_eq!(color.to_bytes(), bytes);
        }
    }
}
