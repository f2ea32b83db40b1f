//! The style description driving every render.
//!
//! A [`StyleDescription`] is a flat bag of text, shape, light and effect
//! parameters. It persists as a flat camelCase JSON object:
//!
//! ```json
//! {
//!   "text": "M",
//!   "font": "Noto Sans JP",
//!   "shape": "hexagon",
//!   "bgColor": "#6200ee",
//!   "globalShadowAngle": 45,
//!   "shadowEnabled": true,
//!   "shadowType": "long",
//!   "shadowDistance": 8
//! }
//! ```
//!
//! Missing keys take their defaults. Numeric keys accept numbers or numeric
//! strings; anything unparseable falls back to that key's default.
//!
//! # Example
//!
//! ```
//! use iconforge::{Shape, StyleDescription};
//!
//! let style = StyleDescription {
//!     shape: Shape::Circle,
//!     text: "A".to_string(),
//!     ..StyleDescription::default()
//! };
//!
//! let json = style.to_json().unwrap();
//! let restored = StyleDescription::from_json(&json).unwrap();
//! assert_eq!(style, restored);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::error::StyleError;
use crate::geometry::Shape;

// ============================================================================
// ShadowType
// ============================================================================

/// How the text shadow is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ShadowType {
    /// A single blurred, offset copy of the glyphs.
    Drop,
    /// A streak of translated copies along the light direction.
    #[default]
    Long,
}

// ============================================================================
// StyleDescription
// ============================================================================

/// Every parameter of an icon.
///
/// Opacities are percentages (0–100) and angles are degrees. The single
/// `global_shadow_angle` drives every directional effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct StyleDescription {
    // --- Text ---
    pub text: String,
    /// Font family. Known families are embedded on export; others are not.
    pub font: String,
    /// Font size as a percentage of the base size.
    #[serde(deserialize_with = "lenient::number")]
    pub font_size_scale: f32,
    #[serde(deserialize_with = "lenient::number")]
    pub offset_x: f32,
    #[serde(deserialize_with = "lenient::number")]
    pub offset_y: f32,
    /// Text rotation in degrees, about the canvas center.
    #[serde(deserialize_with = "lenient::number")]
    pub rotate: f32,
    /// Bold when set.
    pub font_weight: bool,
    /// Italic when set.
    pub font_style: bool,
    pub text_color: HexColor,
    pub text_gradient_enabled: bool,
    pub text_gradient_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub text_gradient_opacity: f32,

    // --- Shape ---
    pub shape: Shape,
    /// Shape size as a percentage of the canvas.
    #[serde(deserialize_with = "lenient::number")]
    pub shape_scale: f32,
    pub bg_color: HexColor,

    // --- Light ---
    /// Direction, in degrees, that every shadow is cast toward.
    #[serde(deserialize_with = "lenient::number")]
    pub global_shadow_angle: f32,

    // --- Shape shadow ---
    pub shape_shadow_enabled: bool,
    pub shape_shadow_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub shape_shadow_opacity: f32,
    pub shape_shadow_blur: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub shape_shadow_distance: f32,

    // --- Shape inner shadow ---
    pub shape_inner_shadow_enabled: bool,
    pub shape_inner_shadow_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub shape_inner_shadow_opacity: f32,
    pub shape_inner_shadow_blur: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub shape_inner_shadow_distance: f32,

    // --- Background gradient ---
    pub bg_gradient_enabled: bool,
    pub bg_gradient_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub bg_gradient_opacity: f32,

    // --- Text shadow ---
    pub shadow_enabled: bool,
    pub shadow_type: ShadowType,
    pub shadow_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub shadow_opacity: f32,
    /// Offset of a drop shadow, or clone count of a long shadow.
    #[serde(alias = "shadowLength", deserialize_with = "lenient::number")]
    pub shadow_distance: f32,
    /// Drop shadow: blurred edge. Long shadow: fading instead of solid.
    pub shadow_blur: bool,

    // --- Text outline ---
    pub outline_enabled: bool,
    pub outline_color: HexColor,
    #[serde(deserialize_with = "lenient::number")]
    pub outline_opacity: f32,
    #[serde(deserialize_with = "lenient::number")]
    pub outline_width: f32,

    // --- Finish layer ---
    pub finish_layer: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub finish_layer_opacity: f32,

    // --- Edge tint/shade ---
    pub edge_tint_shade: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub edge_opacity: f32,
    /// Band width as a percentage of the shape.
    #[serde(deserialize_with = "lenient::number")]
    pub edge_width: f32,
    /// Derive band colors from `bg_color` instead of plain white/black.
    pub auto_color_harmony: bool,

    // --- Score ---
    pub score_enabled: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub score_opacity: f32,
    #[serde(deserialize_with = "lenient::number")]
    pub score_angle: f32,
}

impl Default for StyleDescription {
    fn default() -> Self {
        Self {
            text: "M".to_string(),
            font: "Noto Sans JP".to_string(),
            font_size_scale: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotate: 0.0,
            font_weight: false,
            font_style: false,
            text_color: HexColor::white(),
            text_gradient_enabled: false,
            text_gradient_color: HexColor::new(0xcc, 0xcc, 0xcc),
            text_gradient_opacity: 50.0,

            shape: Shape::Hexagon,
            shape_scale: 90.0,
            bg_color: HexColor::new(0x62, 0x00, 0xee),

            global_shadow_angle: 45.0,

            shape_shadow_enabled: false,
            shape_shadow_color: HexColor::black(),
            shape_shadow_opacity: 50.0,
            shape_shadow_blur: true,
            shape_shadow_distance: 4.0,

            shape_inner_shadow_enabled: false,
            shape_inner_shadow_color: HexColor::white(),
            shape_inner_shadow_opacity: 50.0,
            shape_inner_shadow_blur: true,
            shape_inner_shadow_distance: 4.0,

            bg_gradient_enabled: false,
            bg_gradient_color: HexColor::black(),
            bg_gradient_opacity: 20.0,

            shadow_enabled: true,
            shadow_type: ShadowType::Long,
            shadow_color: HexColor::black(),
            shadow_opacity: 40.0,
            shadow_distance: 8.0,
            shadow_blur: false,

            outline_enabled: false,
            outline_color: HexColor::white(),
            outline_opacity: 100.0,
            outline_width: 4.0,

            finish_layer: true,
            finish_layer_opacity: 15.0,

            edge_tint_shade: true,
            edge_opacity: 20.0,
            edge_width: 2.0,
            auto_color_harmony: true,

            score_enabled: false,
            score_opacity: 15.0,
            score_angle: 180.0,
        }
    }
}

/// Replaces every non-finite numeric field with its default.
macro_rules! sanitize_numbers {
    ($style:expr, $defaults:expr, [$($field:ident),* $(,)?]) => {
        $(
            if !$style.$field.is_finite() {
                $style.$field = $defaults.$field;
            }
        )*
    };
}

impl StyleDescription {
    /// Creates a style with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the style to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the style to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a style from a JSON object. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Deserializes a style from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, StyleError> {
        if !value.is_object() {
            return Err(StyleError::NotAnObject);
        }
        let style: Self = serde_json::from_value(value)?;
        Ok(style.sanitized())
    }

    /// Returns the JSON schema of the persisted document.
    #[cfg(feature = "jsonschema")]
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StyleDescription)
    }

    /// Replaces malformed numbers with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        sanitize_numbers!(
            self,
            defaults,
            [
                font_size_scale,
                offset_x,
                offset_y,
                rotate,
                text_gradient_opacity,
                shape_scale,
                global_shadow_angle,
                shape_shadow_opacity,
                shape_shadow_distance,
                shape_inner_shadow_opacity,
                shape_inner_shadow_distance,
                bg_gradient_opacity,
                shadow_opacity,
                shadow_distance,
                outline_opacity,
                outline_width,
                finish_layer_opacity,
                edge_opacity,
                edge_width,
                score_opacity,
                score_angle,
            ]
        );
        self
    }
}

mod lenient {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    /// Accepts a number or a numeric string. Anything else becomes NaN so
    /// [`StyleDescription::sanitized`](super::StyleDescription::sanitized)
    /// can substitute the default.
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        Ok(match Loose::deserialize(deserializer)? {
            Loose::Number(n) => n as f32,
            Loose::Text(text) => text.trim().parse().unwrap_or(f32::NAN),
            Loose::Other(_) => f32::NAN,
        })
    }
}
