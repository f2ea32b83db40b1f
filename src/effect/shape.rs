//! Effects applied to the shape: its filter and the masked overlays.

use kurbo::Point;

use super::{ComposeContext, Effect, alpha, axis_for, distance_or};
use crate::color::{HexColor, harmony};
use crate::scene::{
    DropShadow, FilterSpec, Gradient, GradientOverlay, GradientStop, InnerShadow, Layer,
};
use crate::style::StyleDescription;

/// Fallback distance for shape shadows.
const SHAPE_SHADOW_DISTANCE: f32 = 4.0;

/// Blur radius of a soft shape shadow.
const SHAPE_SHADOW_BLUR: f64 = 4.0;

/// How far the gloss highlight sits from the center, in box percent.
const FINISH_OFFSET: f64 = 30.0;

/// Radius of the gloss highlight, in box percent.
const FINISH_RADIUS: f64 = 60.0;

fn overlay(gradient: Gradient) -> Layer {
    Layer::GradientOverlay(GradientOverlay { gradient })
}

// ============================================================================
// ShapeEffects
// ============================================================================

/// Outer drop shadow and inner shadow, sharing one filter.
///
/// Wraps everything already emitted for the shape, so the overlays are
/// shadowed together with the base fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEffects {
    pub drop: Option<DropShadow>,
    pub inner: Option<InnerShadow>,
}

impl Effect for ShapeEffects {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        let dir = ctx.light.direction();
        let blur = |on: bool| if on { SHAPE_SHADOW_BLUR } else { 0.0 };

        let drop = style.shape_shadow_enabled.then(|| DropShadow {
            offset: dir * distance_or(style.shape_shadow_distance, SHAPE_SHADOW_DISTANCE),
            std_deviation: blur(style.shape_shadow_blur),
            color: style.shape_shadow_color,
            opacity: alpha(style.shape_shadow_opacity),
        });
        let inner = style.shape_inner_shadow_enabled.then(|| InnerShadow {
            offset: dir * distance_or(style.shape_inner_shadow_distance, SHAPE_SHADOW_DISTANCE),
            std_deviation: blur(style.shape_inner_shadow_blur),
            color: style.shape_inner_shadow_color,
            opacity: alpha(style.shape_inner_shadow_opacity),
        });

        if drop.is_none() && inner.is_none() {
            return None;
        }
        Some(Self { drop, inner })
    }

    fn emit(&self, _ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let children = std::mem::take(layers);
        layers.push(Layer::Filter {
            filter: FilterSpec::ShapeEffects {
                drop: self.drop,
                inner: self.inner,
            },
            children,
        });
    }
}

// ============================================================================
// BackgroundGradient
// ============================================================================

/// Darkens (or tints) the shape toward its shadowed side.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundGradient {
    pub color: HexColor,
    pub opacity: f32,
}

impl Effect for BackgroundGradient {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        style.bg_gradient_enabled.then(|| Self {
            color: style.bg_gradient_color,
            opacity: alpha(style.bg_gradient_opacity),
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let (start, end) = ctx.light.axis();
        let gradient = Gradient::Linear {
            start,
            end,
            stops: vec![
                GradientStop::new(0.0, self.color, 0.0),
                GradientStop::new(1.0, self.color, self.opacity),
            ],
        };
        layers.extend(ctx.masked(vec![overlay(gradient)]));
    }
}

// ============================================================================
// FinishLayer
// ============================================================================

/// Soft white gloss, offset from the center along the light axis.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishLayer {
    pub opacity: f32,
}

impl Effect for FinishLayer {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        style.finish_layer.then(|| Self {
            opacity: alpha(style.finish_layer_opacity),
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let center = Point::new(50.0, 50.0) + ctx.light.direction() * FINISH_OFFSET;
        let gradient = Gradient::Radial {
            center,
            radius: FINISH_RADIUS,
            stops: vec![
                GradientStop::new(0.0, HexColor::white(), self.opacity),
                GradientStop::new(1.0, HexColor::white(), 0.0),
            ],
        };
        layers.extend(ctx.masked(vec![overlay(gradient)]));
    }
}

// ============================================================================
// EdgeBands
// ============================================================================

/// Hard-edged tint band on the lit edge and shade band on the opposite edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeBands {
    pub tint: HexColor,
    pub shade: HexColor,
    pub opacity: f32,
    /// Band width as a fraction of the shape's extent.
    pub width: f32,
}

impl Effect for EdgeBands {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        if !style.edge_tint_shade {
            return None;
        }
        let (tint, shade) = if style.auto_color_harmony {
            let h = harmony(style.bg_color);
            (h.tint, h.shade)
        } else {
            (HexColor::white(), HexColor::black())
        };
        Some(Self {
            tint,
            shade,
            opacity: alpha(style.edge_opacity),
            width: (style.edge_width / 100.0).clamp(0.0, 1.0),
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let (lit, shadowed) = ctx.light.axis();
        let band = |start: Point, end: Point, color: HexColor| {
            overlay(Gradient::Linear {
                start,
                end,
                stops: vec![
                    GradientStop::new(0.0, color, self.opacity),
                    GradientStop::new(self.width, color, self.opacity),
                    GradientStop::new(self.width, color, 0.0),
                    GradientStop::new(1.0, color, 0.0),
                ],
            })
        };
        layers.extend(ctx.masked(vec![
            band(lit, shadowed, self.tint),
            band(shadowed, lit, self.shade),
        ]));
    }
}

// ============================================================================
// ScoreOverlay
// ============================================================================

/// A seam: one half of the shape darkened, split along `angle`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOverlay {
    pub opacity: f32,
    pub angle: f64,
}

impl Effect for ScoreOverlay {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        style.score_enabled.then(|| Self {
            opacity: alpha(style.score_opacity),
            angle: style.score_angle as f64,
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let (start, end) = axis_for(self.angle);
        let dark = HexColor::black();
        let gradient = Gradient::Linear {
            start,
            end,
            stops: vec![
                GradientStop::new(0.0, dark, 0.0),
                GradientStop::new(0.5, dark, 0.0),
                GradientStop::new(0.5, dark, self.opacity),
                GradientStop::new(1.0, dark, self.opacity),
            ],
        };
        layers.extend(ctx.masked(vec![overlay(gradient)]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn ctx(style: &StyleDescription) -> ComposeContext {
        ComposeContext::new(style)
    }

    #[test]
    fn shape_effects_need_a_toggle() {
        let style = StyleDescription::default();
        assert!(ShapeEffects::resolve(&style, &ctx(&style)).is_none());
    }

    #[test]
    fn shape_shadow_uses_light_and_fallback_distance() {
        let style = StyleDescription {
            shape_shadow_enabled: true,
            shape_shadow_distance: 0.0,
            shape_shadow_blur: false,
            global_shadow_angle: 90.0,
            ..StyleDescription::default()
        };
        let fx = ShapeEffects::resolve(&style, &ctx(&style)).unwrap();
        let drop = fx.drop.unwrap();
        assert!(drop.offset.x.abs() < 1e-9);
        assert!((drop.offset.y - 4.0).abs() < 1e-9);
        assert_eq!(drop.std_deviation, 0.0);
        assert_eq!(drop.opacity, 0.5);
        assert!(fx.inner.is_none());
    }

    #[test]
    fn shape_effects_wrap_existing_layers() {
        let style = StyleDescription {
            shape_inner_shadow_enabled: true,
            ..StyleDescription::default()
        };
        let c = ctx(&style);
        let mut layers = vec![Layer::GradientOverlay(GradientOverlay {
            gradient: Gradient::Radial {
                center: Point::new(50.0, 50.0),
                radius: 10.0,
                stops: Vec::new(),
            },
        })];
        ShapeEffects::resolve(&style, &c).unwrap().emit(&c, &mut layers);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].children().len(), 1);
    }

    #[test]
    fn background_gradient_is_transparent_on_lit_side() {
        let style = StyleDescription {
            bg_gradient_enabled: true,
            ..StyleDescription::default()
        };
        let c = ctx(&style);
        let mut layers = Vec::new();
        BackgroundGradient::resolve(&style, &c).unwrap().emit(&c, &mut layers);

        let Layer::Mask { children, .. } = &layers[0] else {
            panic!("background gradient must be masked");
        };
        let Layer::GradientOverlay(GradientOverlay { gradient }) = &children[0] else {
            panic!("mask should hold the gradient");
        };
        let stops = gradient.stops();
        assert_eq!(stops[0].opacity, 0.0);
        assert_eq!(stops[1].opacity, 0.2);
    }

    #[test]
    fn edge_bands_follow_harmony_setting() {
        let auto = StyleDescription::default();
        let bands = EdgeBands::resolve(&auto, &ctx(&auto)).unwrap();
        assert_eq!(bands.tint, harmony(auto.bg_color).tint);
        assert_eq!(bands.shade, harmony(auto.bg_color).shade);
        assert_eq!(bands.width, 0.02);

        let fixed = StyleDescription {
            auto_color_harmony: false,
            ..StyleDescription::default()
        };
        let bands = EdgeBands::resolve(&fixed, &ctx(&fixed)).unwrap();
        assert_eq!(bands.tint, HexColor::white());
        assert_eq!(bands.shade, HexColor::black());
    }

    #[test]
    fn edge_bands_are_hard_stops_on_opposite_edges() {
        let style = StyleDescription::default();
        let c = ctx(&style);
        let mut layers = Vec::new();
        EdgeBands::resolve(&style, &c).unwrap().emit(&c, &mut layers);

        let children = layers[0].children();
        assert_eq!(children.len(), 2);
        let axes: Vec<_> = children
            .iter()
            .map(|layer| match layer {
                Layer::GradientOverlay(o) => {
                    let stops = o.gradient.stops();
                    assert_eq!(stops[1].offset, stops[2].offset);
                    o.gradient.axis().unwrap()
                }
                _ => panic!("expected gradients"),
            })
            .collect();
        assert!((axes[0] + axes[1]).hypot() < 1e-9);
    }

    #[test]
    fn score_splits_in_half() {
        let style = StyleDescription {
            score_enabled: true,
            score_angle: 180.0,
            ..StyleDescription::default()
        };
        let c = ctx(&style);
        let mut layers = Vec::new();
        ScoreOverlay::resolve(&style, &c).unwrap().emit(&c, &mut layers);

        let Layer::GradientOverlay(o) = &layers[0].children()[0] else {
            panic!("expected gradient");
        };
        let stops = o.gradient.stops();
        assert_eq!(stops[1].offset, 0.5);
        assert_eq!(stops[2].offset, 0.5);
        assert_eq!(stops[3].opacity, 0.15);
        // 180 degrees runs right to left: a vertical seam.
        let axis = o.gradient.axis().unwrap();
        assert!(axis.y.abs() < 1e-9 && axis.x < 0.0);
    }

    #[test]
    fn overlays_skip_unknown_shapes() {
        let style = StyleDescription {
            shape: Shape::Unknown,
            bg_gradient_enabled: true,
            score_enabled: true,
            ..StyleDescription::default()
        };
        let c = ctx(&style);
        assert!(BackgroundGradient::resolve(&style, &c).is_none());
        assert!(FinishLayer::resolve(&style, &c).is_none());
        assert!(EdgeBands::resolve(&style, &c).is_none());
        assert!(ScoreOverlay::resolve(&style, &c).is_none());
    }
}
