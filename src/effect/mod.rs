//! The effect composer: style description in, ordered scene graph out.
//!
//! Each visual effect is a small type implementing [`Effect`]. It resolves
//! itself from the style (returning `None` when disabled) and appends its
//! layers. [`compose`] owns the ordering:
//!
//! ```text
//! ┌──────────────── shape effects filter (optional) ───────────────┐
//! │ 1. base fill                                                   │
//! │ 2. background gradient   (masked)                              │
//! │ 3. finish-layer gloss    (masked)                              │
//! │ 4. edge tint / shade     (masked)                              │
//! │ 5. score                 (masked)                              │
//! └────────────────────────────────────────────────────────────────┘
//!   6. long-shadow clones      (clipped)
//!   7. drop-shadow text        (filtered, masked)
//!   8. text outline
//!   9. text fill
//!  10. text gradient
//! ```
//!
//! Every directional effect reads the same [`Light`], so changing
//! `global_shadow_angle` moves all of them together.

pub mod shape;
pub mod text;

pub use shape::{BackgroundGradient, EdgeBands, FinishLayer, ScoreOverlay, ShapeEffects};
pub use text::{LongShadow, MainText, TextDropShadow, TextGradient, TextOutline};

use kurbo::{Affine, Point, Vec2};

use crate::fonts;
use crate::geometry::{self, Outline, canvas_center};
use crate::scene::{Fill, GlyphRun, Layer, Paint, SceneGraph};
use crate::style::StyleDescription;

/// Base font size for a single character.
const SINGLE_GLYPH_FONT_SIZE: f64 = 160.0;

/// Base font size for longer text.
const MULTI_GLYPH_FONT_SIZE: f64 = 120.0;

// ============================================================================
// Light
// ============================================================================

/// The single light source shared by every directional effect.
///
/// The angle is the direction shadows are cast toward; the lit side of the
/// icon is the opposite one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub degrees: f64,
}

impl Light {
    pub fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Unit vector pointing where shadows fall.
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.degrees.to_radians())
    }

    /// Gradient endpoints, in box percentages, running from the lit edge
    /// toward the shadowed edge.
    pub fn axis(&self) -> (Point, Point) {
        axis_for(self.degrees)
    }
}

/// Endpoints `(50 − 50·cos θ, 50 − 50·sin θ)` and `(50 + 50·cos θ, 50 + 50·sin θ)`.
pub(crate) fn axis_for(degrees: f64) -> (Point, Point) {
    let d = Vec2::from_angle(degrees.to_radians()) * 50.0;
    let mid = Point::new(50.0, 50.0);
    (mid - d, mid + d)
}

/// Maps a 0–100 opacity percentage to an alpha.
pub(crate) fn alpha(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Distances below one fall back to the effect's default.
pub(crate) fn distance_or(value: f32, fallback: f32) -> f64 {
    if value >= 1.0 {
        value as f64
    } else {
        fallback as f64
    }
}

// ============================================================================
// ComposeContext
// ============================================================================

/// Values shared by every effect during one [`compose`] call.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    pub light: Light,
    /// The shape outline; `None` when the shape is unknown.
    pub silhouette: Option<Outline>,
    /// Text placement and font, filled with the text color. `None` for empty text.
    pub glyphs: Option<GlyphRun>,
}

impl ComposeContext {
    pub fn new(style: &StyleDescription) -> Self {
        let silhouette = geometry::outline(style.shape, style.shape_scale as f64 / 100.0);
        Self {
            light: Light::new(style.global_shadow_angle as f64),
            silhouette,
            glyphs: base_glyph_run(style),
        }
    }

    /// Wraps `children` in a mask of the silhouette.
    pub(crate) fn masked(&self, children: Vec<Layer>) -> Option<Layer> {
        Some(Layer::Mask {
            silhouette: self.silhouette.clone()?,
            children,
        })
    }
}

fn base_glyph_run(style: &StyleDescription) -> Option<GlyphRun> {
    if style.text.is_empty() {
        return None;
    }
    let base_size = if style.text.chars().count() > 1 {
        MULTI_GLYPH_FONT_SIZE
    } else {
        SINGLE_GLYPH_FONT_SIZE
    };
    let transform = Affine::translate((style.offset_x as f64, style.offset_y as f64))
        * Affine::rotate_about((style.rotate as f64).to_radians(), canvas_center());
    Some(GlyphRun {
        text: style.text.clone(),
        font_family: style.font.clone(),
        font_size: base_size * style.font_size_scale as f64 / 100.0,
        bold: style.font_weight,
        italic: style.font_style,
        transform,
        fill: Paint::solid(style.text_color),
        stroke: None,
    })
}

// ============================================================================
// Effect
// ============================================================================

/// A self-contained visual effect.
pub trait Effect: Sized {
    /// Resolves the effect's parameters, or `None` when it contributes nothing.
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self>;

    /// Appends the effect's layers.
    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>);
}

fn apply<E: Effect>(style: &StyleDescription, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
    if let Some(effect) = E::resolve(style, ctx) {
        effect.emit(ctx, layers);
    }
}

/// Builds the scene graph for a style snapshot.
///
/// Pure and deterministic: the same style always yields the same scene.
pub fn compose(style: &StyleDescription) -> SceneGraph {
    let ctx = ComposeContext::new(style);
    let mut scene = SceneGraph::new();
    scene.font_import = fonts::import_url(&style.font).map(str::to_string);

    if let Some(silhouette) = &ctx.silhouette {
        let mut shape_layers = vec![Layer::Fill(Fill {
            outline: silhouette.clone(),
            color: style.bg_color,
        })];
        apply::<BackgroundGradient>(style, &ctx, &mut shape_layers);
        apply::<FinishLayer>(style, &ctx, &mut shape_layers);
        apply::<EdgeBands>(style, &ctx, &mut shape_layers);
        apply::<ScoreOverlay>(style, &ctx, &mut shape_layers);
        apply::<ShapeEffects>(style, &ctx, &mut shape_layers);
        scene.layers.extend(shape_layers);
    }

    apply::<LongShadow>(style, &ctx, &mut scene.layers);
    apply::<TextDropShadow>(style, &ctx, &mut scene.layers);
    apply::<TextOutline>(style, &ctx, &mut scene.layers);
    apply::<MainText>(style, &ctx, &mut scene.layers);
    apply::<TextGradient>(style, &ctx, &mut scene.layers);

    tracing::debug!(
        shape = ?style.shape,
        layers = scene.walk().count(),
        "composed scene"
    );
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::scene::{FilterSpec, Gradient};
    use crate::style::ShadowType;

    const EPS: f64 = 1e-9;

    fn everything_on() -> StyleDescription {
        StyleDescription {
            shape_shadow_enabled: true,
            shape_inner_shadow_enabled: true,
            bg_gradient_enabled: true,
            text_gradient_enabled: true,
            outline_enabled: true,
            finish_layer: true,
            edge_tint_shade: true,
            score_enabled: true,
            ..StyleDescription::default()
        }
    }

    fn kinds(layers: &[Layer]) -> Vec<&'static str> {
        layers
            .iter()
            .map(|layer| match layer {
                Layer::Fill(_) => "fill",
                Layer::GradientOverlay(_) => "gradient",
                Layer::Mask { .. } => "mask",
                Layer::ClipRegion { .. } => "clip",
                Layer::Filter { .. } => "filter",
                Layer::ShadowClone(_) => "clone",
                Layer::TextGlyphRun(_) => "text",
            })
            .collect()
    }

    #[test]
    fn axis_matches_light_formula() {
        let (start, end) = axis_for(0.0);
        assert!((start - Point::new(0.0, 50.0)).hypot() < EPS);
        assert!((end - Point::new(100.0, 50.0)).hypot() < EPS);

        let (start, end) = axis_for(90.0);
        assert!((start - Point::new(50.0, 0.0)).hypot() < EPS);
        assert!((end - Point::new(50.0, 100.0)).hypot() < EPS);
    }

    #[test]
    fn alpha_maps_percentages() {
        assert_eq!(alpha(0.0), 0.0);
        assert_eq!(alpha(40.0), 0.4);
        assert_eq!(alpha(250.0), 1.0);
        assert_eq!(alpha(-5.0), 0.0);
    }

    #[test]
    fn distance_falls_back_below_one() {
        assert_eq!(distance_or(0.0, 4.0), 4.0);
        assert_eq!(distance_or(0.5, 8.0), 8.0);
        assert_eq!(distance_or(12.0, 8.0), 12.0);
    }

    #[test]
    fn font_size_buckets() {
        let single = base_glyph_run(&StyleDescription::default()).unwrap();
        assert_eq!(single.font_size, 160.0);

        let multi = base_glyph_run(&StyleDescription {
            text: "AB".to_string(),
            font_size_scale: 50.0,
            ..StyleDescription::default()
        })
        .unwrap();
        assert_eq!(multi.font_size, 60.0);

        let wide_char = base_glyph_run(&StyleDescription {
            text: "字".to_string(),
            ..StyleDescription::default()
        })
        .unwrap();
        assert_eq!(wide_char.font_size, 160.0);
    }

    #[test]
    fn full_stack_order() {
        let scene = compose(&everything_on());
        assert_eq!(kinds(&scene.layers), ["filter", "clip", "text", "text", "text"]);

        let Layer::Filter { filter, children } = &scene.layers[0] else {
            panic!("shape group should be filtered");
        };
        assert!(matches!(
            filter,
            FilterSpec::ShapeEffects {
                drop: Some(_),
                inner: Some(_)
            }
        ));
        // fill, bg gradient, finish, edge bands, score
        assert_eq!(kinds(children), ["fill", "mask", "mask", "mask", "mask"]);

        let Layer::TextGlyphRun(outline) = &scene.layers[2] else {
            unreachable!()
        };
        assert!(outline.stroke.is_some());
        assert_eq!(outline.fill, Paint::None);

        let Layer::TextGlyphRun(gradient) = &scene.layers[4] else {
            unreachable!()
        };
        assert!(matches!(gradient.fill, Paint::Gradient(_)));
    }

    #[test]
    fn shape_layers_are_unwrapped_without_shape_effects() {
        let style = StyleDescription {
            finish_layer: false,
            edge_tint_shade: false,
            shadow_enabled: false,
            ..StyleDescription::default()
        };
        let scene = compose(&style);
        assert_eq!(kinds(&scene.layers), ["fill", "text"]);
    }

    #[test]
    fn drop_shadow_replaces_long_shadow() {
        let style = StyleDescription {
            shadow_type: ShadowType::Drop,
            ..everything_on()
        };
        let scene = compose(&style);
        assert_eq!(kinds(&scene.layers), ["filter", "mask", "text", "text", "text"]);
    }

    #[test]
    fn unknown_shape_keeps_text_only() {
        let style = StyleDescription {
            shape: Shape::Unknown,
            shadow_type: ShadowType::Drop,
            ..everything_on()
        };
        let scene = compose(&style);
        assert_eq!(kinds(&scene.layers), ["text", "text", "text"]);
    }

    #[test]
    fn empty_text_keeps_shape_only() {
        let style = StyleDescription {
            text: String::new(),
            ..everything_on()
        };
        let scene = compose(&style);
        assert_eq!(kinds(&scene.layers), ["filter"]);
    }

    #[test]
    fn compose_is_deterministic() {
        let style = everything_on();
        assert_eq!(compose(&style), compose(&style));
    }

    #[test]
    fn known_font_sets_import() {
        let scene = compose(&StyleDescription::default());
        assert!(scene.font_import.unwrap().contains("Noto+Sans+JP"));

        let scene = compose(&StyleDescription {
            font: "Comic Sans MS".to_string(),
            ..StyleDescription::default()
        });
        assert!(scene.font_import.is_none());
    }

    #[test]
    fn light_angle_moves_every_directional_effect() {
        for degrees in [0.0f32, 45.0, 90.0, 200.0] {
            let style = StyleDescription {
                global_shadow_angle: degrees,
                shadow_type: ShadowType::Drop,
                ..everything_on()
            };
            let dir = Vec2::from_angle((degrees as f64).to_radians());
            let scene = compose(&style);

            let mut checked = 0;
            for layer in scene.walk() {
                match layer {
                    Layer::GradientOverlay(overlay) => match &overlay.gradient {
                        Gradient::Linear { start, end, stops } => {
                            let axis = (*end - *start).normalize();
                            let is_score = stops.len() == 4 && stops[0].opacity == 0.0;
                            if !is_score {
                                assert!(
                                    axis.cross(dir).abs() < 1e-6,
                                    "gradient axis {axis:?} not aligned with {dir:?}"
                                );
                                checked += 1;
                            }
                        }
                        Gradient::Radial { center, .. } => {
                            let offset = (*center - Point::new(50.0, 50.0)).normalize();
                            assert!((offset - dir).hypot() < 1e-6);
                            checked += 1;
                        }
                    },
                    Layer::Filter { filter, .. } => match filter {
                        FilterSpec::ShapeEffects { drop, inner } => {
                            for offset in [drop.unwrap().offset, inner.unwrap().offset] {
                                assert!((offset.normalize() - dir).hypot() < 1e-6);
                            }
                            checked += 1;
                        }
                        FilterSpec::TextShadow(shadow) => {
                            assert!((shadow.offset.normalize() - dir).hypot() < 1e-6);
                            checked += 1;
                        }
                    },
                    Layer::TextGlyphRun(run) => {
                        if let Paint::Gradient(gradient) = &run.fill {
                            let axis = gradient.axis().unwrap().normalize();
                            assert!((axis - dir).hypot() < 1e-6);
                            checked += 1;
                        }
                    }
                    _ => {}
                }
            }
            // bg gradient, finish, tint, shade, shape filter, text shadow, text gradient
            assert_eq!(checked, 7, "at {degrees} degrees");
        }
    }
}
