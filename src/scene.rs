//! The resolved scene graph handed from the composer to the serializer.
//!
//! Layers carry only final numbers and colors. Nothing here refers back to
//! the [`StyleDescription`](crate::StyleDescription) it came from, so the
//! serializer never has to make a decision of its own.

use kurbo::{Affine, Point, Vec2};

use crate::color::HexColor;
use crate::geometry::{CANVAS_SIZE, Outline};

// ============================================================================
// Paint
// ============================================================================

/// One color stop of a gradient. `offset` and `opacity` are in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: HexColor,
    pub opacity: f32,
}

impl GradientStop {
    pub fn new(offset: f32, color: HexColor, opacity: f32) -> Self {
        Self {
            offset,
            color,
            opacity,
        }
    }
}

/// A gradient in bounding-box percentages (0–100 on both axes).
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Gradient {
    pub fn stops(&self) -> &[GradientStop] {
        match self {
            Gradient::Linear { stops, .. } | Gradient::Radial { stops, .. } => stops,
        }
    }

    /// The direction a linear gradient runs in, or `None` for radial ones.
    pub fn axis(&self) -> Option<Vec2> {
        match self {
            Gradient::Linear { start, end, .. } => Some(*end - *start),
            Gradient::Radial { .. } => None,
        }
    }
}

/// How a glyph run is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Solid { color: HexColor, opacity: f32 },
    Gradient(Gradient),
}

impl Paint {
    pub fn solid(color: HexColor) -> Self {
        Paint::Solid {
            color,
            opacity: 1.0,
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Offset, blurred copy of the source drawn behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub offset: Vec2,
    pub std_deviation: f64,
    pub color: HexColor,
    pub opacity: f32,
}

/// Shadow cast inward from the source's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnerShadow {
    pub offset: Vec2,
    pub std_deviation: f64,
    pub color: HexColor,
    pub opacity: f32,
}

/// A filter applied to a group of layers.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Drop shadow, then the source, then the inner shadow, merged in that order.
    ShapeEffects {
        drop: Option<DropShadow>,
        inner: Option<InnerShadow>,
    },
    /// Alpha blur, offset, flood and composite. Outputs only the shadow.
    TextShadow(DropShadow),
}

// ============================================================================
// Text
// ============================================================================

/// Stroke drawn around glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStroke {
    pub color: HexColor,
    pub width: f64,
    pub opacity: f32,
}

/// Text centered on the canvas, placed by `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub transform: Affine,
    pub fill: Paint,
    pub stroke: Option<TextStroke>,
}

/// One copy of a long shadow, translated along the light direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowClone {
    /// 1-based position in the streak.
    pub index: u32,
    pub offset: Vec2,
    pub run: GlyphRun,
}

// ============================================================================
// Layers
// ============================================================================

/// The silhouette filled with a solid color.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub outline: Outline,
    pub color: HexColor,
}

/// A gradient painted over the bounds of the enclosing mask's silhouette.
///
/// Gradient percentages are relative to those bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientOverlay {
    pub gradient: Gradient,
}

/// A layer of the scene. Wrapping variants apply to their children.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Fill(Fill),
    GradientOverlay(GradientOverlay),
    /// Children shown only where a white fill of the silhouette (stroke included) is.
    Mask {
        silhouette: Outline,
        children: Vec<Layer>,
    },
    /// Children cut to the painted outline, with an optional group opacity.
    ///
    /// A hard clip for plain outlines; rounded outlines are cut through a
    /// mask so the widening stroke is included.
    ClipRegion {
        outline: Outline,
        opacity: Option<f32>,
        children: Vec<Layer>,
    },
    Filter {
        filter: FilterSpec,
        children: Vec<Layer>,
    },
    ShadowClone(ShadowClone),
    TextGlyphRun(GlyphRun),
}

impl Layer {
    /// Direct children of a wrapping layer; empty for leaves.
    pub fn children(&self) -> &[Layer] {
        match self {
            Layer::Mask { children, .. }
            | Layer::ClipRegion { children, .. }
            | Layer::Filter { children, .. } => children,
            _ => &[],
        }
    }
}

// ============================================================================
// SceneGraph
// ============================================================================

/// An ordered, back-to-front stack of layers on the square canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    /// Style-sheet URL to import for the text's font, if the font is known.
    pub font_import: Option<String>,
    pub layers: Vec<Layer>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            font_import: None,
            layers: Vec::new(),
        }
    }

    /// Edge length of the canvas in user units.
    pub fn size(&self) -> f64 {
        CANVAS_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterates over every layer, parents before children, in paint order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.layers.iter().rev().collect(),
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first iterator returned by [`SceneGraph::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Layer>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Layer;

    fn next(&mut self) -> Option<Self::Item> {
        let layer = self.stack.pop()?;
        self.stack.extend(layer.children().iter().rev());
        Some(layer)
    }
}
