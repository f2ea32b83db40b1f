//! Hex colors and the tint/shade harmony calculator.

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lightness added to produce the tint.
const TINT_LIGHTEN: f32 = 0.30;

/// Lightness removed to produce the shade.
const SHADE_DARKEN: f32 = 0.25;

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB color, persisted as `#rrggbb`.
///
/// Parsing also accepts the short `#rgb` form and a missing `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub Srgb<u8>);

impl HexColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(Srgb::new(r, g, b))
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the color as `(r, g, b)`.
    pub fn as_tuple(&self) -> (u8, u8, u8) {
        (self.0.red, self.0.green, self.0.blue)
    }

    /// Returns the HSL lightness of this color in `0.0..=1.0`.
    pub fn lightness(&self) -> f32 {
        self.to_hsl().lightness
    }

    fn to_hsl(self) -> Hsl {
        let rgb = Srgb::new(
            self.0.red as f32 / 255.0,
            self.0.green as f32 / 255.0,
            self.0.blue as f32 / 255.0,
        );
        rgb.into_color()
    }

    fn from_hsl(hsl: Hsl) -> Self {
        let rgb: Srgb = hsl.into_color();
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.as_tuple();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for HexColor {
    type Err = palette::rgb::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rgb: Srgb<u8> = s.trim().parse()?;
        Ok(Self(rgb))
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid color {text:?}: {e}")))
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for HexColor {
    fn schema_name() -> String {
        "HexColor".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

// ============================================================================
// Harmony
// ============================================================================

/// A lighter and a darker companion of a base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harmony {
    pub tint: HexColor,
    pub shade: HexColor,
}

/// Derives a tint and a shade from `base` by moving its HSL lightness.
///
/// Hue and saturation are kept; the tint adds 0.30 lightness (capped at 1)
/// and the shade removes 0.25 (floored at 0). Grays stay gray.
pub fn harmony(base: HexColor) -> Harmony {
    let hsl = base.to_hsl();

    let mut tint = hsl;
    tint.lightness = (hsl.lightness + TINT_LIGHTEN).min(1.0);

    let mut shade = hsl;
    shade.lightness = (hsl.lightness - SHADE_DARKEN).max(0.0);

    Harmony {
        tint: HexColor::from_hsl(tint),
        shade: HexColor::from_hsl(shade),
    }
}

/// Like [`harmony`], but for a hex string. Returns `None` if it does not parse.
pub fn harmony_hex(hex: &str) -> Option<Harmony> {
    hex.parse().ok().map(harmony)
}
