//! Effects applied to the text, drawn above the shape group.

use kurbo::{Affine, Vec2};

use super::{ComposeContext, Effect, alpha, distance_or};
use crate::color::HexColor;
use crate::scene::{
    DropShadow, FilterSpec, GlyphRun, Gradient, GradientStop, Layer, Paint, ShadowClone,
    TextStroke,
};
use crate::style::{ShadowType, StyleDescription};

/// Fallback distance (and long-shadow length) for the text shadow.
const TEXT_SHADOW_DISTANCE: f32 = 8.0;

/// Longest streak drawn. Clones past the canvas diagonal, ceil(256 * sqrt 2),
/// are fully clipped away.
pub const MAX_LONG_SHADOW_LENGTH: u32 = 363;

/// Blur radius of a soft drop shadow.
const TEXT_SHADOW_BLUR: f64 = 6.0;

// ============================================================================
// LongShadow
// ============================================================================

/// A streak of translated glyph copies along the light direction, clipped
/// to the shape.
///
/// Solid streaks put the opacity on the group so overlapping copies do not
/// compound. Fading streaks (`shadow_blur` set) give each copy its own
/// linearly decaying opacity instead.
#[derive(Debug, Clone, PartialEq)]
pub struct LongShadow {
    pub length: u32,
    pub color: HexColor,
    pub opacity: f32,
    pub solid: bool,
}

impl LongShadow {
    /// Opacity of clone `index` (1-based) within its group.
    pub fn clone_opacity(&self, index: u32) -> f32 {
        if self.solid {
            1.0
        } else {
            self.opacity * (1.0 - index as f32 / self.length as f32)
        }
    }
}

impl Effect for LongShadow {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        ctx.glyphs.as_ref()?;
        if !style.shadow_enabled || style.shadow_type != ShadowType::Long {
            return None;
        }
        Some(Self {
            length: distance_or(style.shadow_distance, TEXT_SHADOW_DISTANCE)
                .min(MAX_LONG_SHADOW_LENGTH as f64)
                .round() as u32,
            color: style.shadow_color,
            opacity: alpha(style.shadow_opacity),
            solid: !style.shadow_blur,
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let (Some(outline), Some(base)) = (&ctx.silhouette, &ctx.glyphs) else {
            return;
        };
        let dir = ctx.light.direction();
        let children = (1..=self.length)
            .map(|index| {
                let offset = dir * index as f64;
                Layer::ShadowClone(ShadowClone {
                    index,
                    offset,
                    run: GlyphRun {
                        transform: Affine::translate(offset) * base.transform,
                        fill: Paint::Solid {
                            color: self.color,
                            opacity: self.clone_opacity(index),
                        },
                        ..base.clone()
                    },
                })
            })
            .collect();
        layers.push(Layer::ClipRegion {
            outline: outline.clone(),
            opacity: self.solid.then_some(self.opacity),
            children,
        });
    }
}

// ============================================================================
// TextDropShadow
// ============================================================================

/// A blurred, offset shadow of the glyphs, masked to the shape.
///
/// The offset is computed in the text's rotated frame, so the shadow still
/// falls along the light direction on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDropShadow {
    pub shadow: DropShadow,
}

impl Effect for TextDropShadow {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.silhouette.as_ref()?;
        ctx.glyphs.as_ref()?;
        if !style.shadow_enabled || style.shadow_type != ShadowType::Drop {
            return None;
        }
        let local_angle = (ctx.light.degrees - style.rotate as f64).to_radians();
        let distance = distance_or(style.shadow_distance, TEXT_SHADOW_DISTANCE);
        Some(Self {
            shadow: DropShadow {
                offset: Vec2::from_angle(local_angle) * distance,
                std_deviation: if style.shadow_blur {
                    TEXT_SHADOW_BLUR
                } else {
                    0.0
                },
                color: style.shadow_color,
                opacity: alpha(style.shadow_opacity),
            },
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let Some(base) = &ctx.glyphs else {
            return;
        };
        let run = GlyphRun {
            fill: Paint::solid(self.shadow.color),
            ..base.clone()
        };
        let filtered = Layer::Filter {
            filter: FilterSpec::TextShadow(self.shadow),
            children: vec![Layer::TextGlyphRun(run)],
        };
        layers.extend(ctx.masked(vec![filtered]));
    }
}

// ============================================================================
// TextOutline
// ============================================================================

/// Stroke-only copy drawn beneath the fill, so only its outer half shows.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOutline {
    pub stroke: TextStroke,
}

impl Effect for TextOutline {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.glyphs.as_ref()?;
        style.outline_enabled.then(|| Self {
            stroke: TextStroke {
                color: style.outline_color,
                width: style.outline_width as f64 * 2.0,
                opacity: alpha(style.outline_opacity),
            },
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        if let Some(base) = &ctx.glyphs {
            layers.push(Layer::TextGlyphRun(GlyphRun {
                fill: Paint::None,
                stroke: Some(self.stroke),
                ..base.clone()
            }));
        }
    }
}

// ============================================================================
// MainText
// ============================================================================

/// The glyphs in the text color.
#[derive(Debug, Clone, PartialEq)]
pub struct MainText;

impl Effect for MainText {
    fn resolve(_style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.glyphs.as_ref().map(|_| Self)
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        if let Some(base) = &ctx.glyphs {
            layers.push(Layer::TextGlyphRun(base.clone()));
        }
    }
}

// ============================================================================
// TextGradient
// ============================================================================

/// A gradient-filled copy of the glyphs over the main fill.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGradient {
    pub color: HexColor,
    pub opacity: f32,
}

impl Effect for TextGradient {
    fn resolve(style: &StyleDescription, ctx: &ComposeContext) -> Option<Self> {
        ctx.glyphs.as_ref()?;
        style.text_gradient_enabled.then(|| Self {
            color: style.text_gradient_color,
            opacity: alpha(style.text_gradient_opacity),
        })
    }

    fn emit(&self, ctx: &ComposeContext, layers: &mut Vec<Layer>) {
        let Some(base) = &ctx.glyphs else {
            return;
        };
        let (start, end) = ctx.light.axis();
        let gradient = Gradient::Linear {
            start,
            end,
            stops: vec![
                GradientStop::new(0.0, self.color, self.opacity),
                GradientStop::new(1.0, self.color, 0.0),
            ],
        };
        layers.push(Layer::TextGlyphRun(GlyphRun {
            fill: Paint::Gradient(gradient),
            ..base.clone()
        }));
    }
}
