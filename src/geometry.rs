//! Shape outlines on the fixed 256×256 canvas.
//!
//! Every shape is a fixed analytic path centered on (128, 128). Diamonds are
//! stored as pre-rotated polygons so the only transform ever attached to an
//! outline is the uniform scale about the canvas center. "Rounded" variants
//! reuse the sharp geometry and carry a [`StrokeHint`] instead of a distinct
//! path.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as _};
use serde::{Deserialize, Serialize};

/// Edge length of the square canvas, in user units.
pub const CANVAS_SIZE: f64 = 256.0;

/// Center of the canvas on both axes.
pub const CANVAS_CENTER: f64 = CANVAS_SIZE / 2.0;

/// Stroke width used to fake rounded corners.
pub const ROUNDED_STROKE_WIDTH: f64 = 32.0;

/// The canvas center as a point.
pub fn canvas_center() -> Point {
    Point::new(CANVAS_CENTER, CANVAS_CENTER)
}

// ============================================================================
// Shape
// ============================================================================

/// The fixed palette of supported outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Circle,
    Square,
    #[serde(alias = "rounded")]
    RoundedSquare,
    Rectangle,
    RoundedRectangle,
    Triangle,
    RoundedTriangle,
    #[default]
    Hexagon,
    RoundedHexagon,
    Diamond,
    RoundedDiamond,
    Shield,
    /// Any identifier outside the palette. Produces no geometry.
    #[serde(other)]
    Unknown,
}

impl Shape {
    /// All shapes that produce geometry.
    pub const ALL: [Shape; 12] = [
        Shape::Circle,
        Shape::Square,
        Shape::RoundedSquare,
        Shape::Rectangle,
        Shape::RoundedRectangle,
        Shape::Triangle,
        Shape::RoundedTriangle,
        Shape::Hexagon,
        Shape::RoundedHexagon,
        Shape::Diamond,
        Shape::RoundedDiamond,
        Shape::Shield,
    ];

    /// Returns true for the stroke-rounded variants.
    pub fn is_rounded(self) -> bool {
        matches!(
            self,
            Shape::RoundedSquare
                | Shape::RoundedRectangle
                | Shape::RoundedTriangle
                | Shape::RoundedHexagon
                | Shape::RoundedDiamond
        )
    }

    /// Maps a rounded variant to the sharp shape it is built from.
    fn sharp(self) -> Shape {
        match self {
            Shape::RoundedSquare => Shape::Square,
            Shape::RoundedRectangle => Shape::Rectangle,
            Shape::RoundedTriangle => Shape::Triangle,
            Shape::RoundedHexagon => Shape::Hexagon,
            Shape::RoundedDiamond => Shape::Diamond,
            other => other,
        }
    }
}

// ============================================================================
// Outline
// ============================================================================

/// Untransformed geometry of an outline, in canvas units.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSpec {
    Circle(Circle),
    Rect(Rect),
    /// A closed polygon through the given vertices.
    Polygon(Vec<Point>),
    /// A general closed path.
    Path(BezPath),
}

impl PathSpec {
    /// Converts the geometry to a Bézier path.
    pub fn to_bez_path(&self) -> BezPath {
        match self {
            PathSpec::Circle(circle) => circle.to_path(0.1),
            PathSpec::Rect(rect) => rect.to_path(0.1),
            PathSpec::Polygon(points) => {
                let mut path = BezPath::new();
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    path.move_to(*first);
                    for p in iter {
                        path.line_to(*p);
                    }
                    path.close_path();
                }
                path
            }
            PathSpec::Path(path) => path.clone(),
        }
    }
}

/// Uniform stroke that widens a sharp outline into a rounded-looking one.
///
/// The stroke color always matches whatever the outline is filled with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeHint {
    pub width: f64,
    pub round_join: bool,
}

/// A shape's geometry plus the transform placing it on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub path: PathSpec,
    pub transform: Affine,
    pub stroke: Option<StrokeHint>,
}

impl Outline {
    /// The outline as a transformed Bézier path, ignoring any stroke.
    pub fn to_bez_path(&self) -> BezPath {
        self.transform * self.path.to_bez_path()
    }

    /// Bounding box of the transformed geometry, ignoring any stroke.
    pub fn bounds(&self) -> Rect {
        match &self.path {
            PathSpec::Circle(circle) => (self.transform * *circle).bounding_box(),
            PathSpec::Rect(rect) => self.transform.transform_rect_bbox(*rect),
            _ => self.to_bez_path().bounding_box(),
        }
    }

    /// Bounding box of the painted silhouette, stroke included.
    pub fn painted_bounds(&self) -> Rect {
        let bounds = self.bounds();
        match self.stroke {
            Some(stroke) => {
                let half = stroke.width / 2.0 * self.transform.determinant().abs().sqrt();
                bounds.inflate(half, half)
            }
            None => bounds,
        }
    }
}

/// Returns the outline for `shape` at `scale` (1.0 = fills the canvas).
///
/// Scaling is about the canvas center. Unknown shapes return `None`, which
/// callers treat as "nothing to draw".
pub fn outline(shape: Shape, scale: f64) -> Option<Outline> {
    let path = base_path(shape.sharp())?;
    let c = canvas_center().to_vec2();
    let transform = Affine::translate(c) * Affine::scale(scale) * Affine::translate(-c);
    let stroke = shape.is_rounded().then_some(StrokeHint {
        width: ROUNDED_STROKE_WIDTH,
        round_join: true,
    });
    Some(Outline {
        path,
        transform,
        stroke,
    })
}

fn base_path(shape: Shape) -> Option<PathSpec> {
    let s = CANVAS_SIZE;
    let c = CANVAS_CENTER;
    let spec = match shape {
        Shape::Circle => PathSpec::Circle(Circle::new(canvas_center(), c)),
        Shape::Square => PathSpec::Rect(Rect::new(0.0, 0.0, s, s)),
        Shape::Rectangle => PathSpec::Rect(Rect::new(0.0, s * 0.125, s, s * 0.875)),
        Shape::Triangle => {
            // Equilateral, side = canvas width, centered vertically.
            let h = s * 3f64.sqrt() / 2.0;
            let top = (s - h) / 2.0;
            PathSpec::Polygon(vec![
                Point::new(c, top),
                Point::new(s, top + h),
                Point::new(0.0, top + h),
            ])
        }
        Shape::Hexagon => {
            let points = (0..6)
                .map(|i| {
                    let angle = (60.0 * i as f64 - 30.0).to_radians();
                    Point::new(c + c * angle.cos(), c + c * angle.sin())
                })
                .collect();
            PathSpec::Polygon(points)
        }
        Shape::Diamond => PathSpec::Polygon(vec![
            Point::new(c, 0.0),
            Point::new(s, c),
            Point::new(c, s),
            Point::new(0.0, c),
        ]),
        Shape::Shield => {
            let mut path = BezPath::new();
            path.move_to((c, 0.0));
            path.line_to((s, s * 0.25));
            path.line_to((s, s * 0.5));
            path.curve_to((s, s * 0.8), (c, s), (c, s));
            path.curve_to((c, s), (0.0, s * 0.8), (0.0, s * 0.5));
            path.line_to((0.0, s * 0.25));
            path.close_path();
            PathSpec::Path(path)
        }
        _ => return None,
    };
    Some(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn every_shape_fits_the_canvas() {
        let frame = Rect::new(-EPS, -EPS, CANVAS_SIZE + EPS, CANVAS_SIZE + EPS);
        for shape in Shape::ALL {
            let outline = outline(shape, 1.0).unwrap();
            let bounds = outline.bounds();
            assert!(
                bounds.width() > 100.0 && bounds.height() > 100.0,
                "{shape:?} is degenerate: {bounds:?}"
            );
            assert!(
                frame.contains(bounds.origin())
                    && frame.contains(Point::new(bounds.x1, bounds.y1)),
                "{shape:?} escapes the canvas: {bounds:?}"
            );
        }
    }

    #[test]
    fn every_path_is_closed() {
        for shape in Shape::ALL {
            let path = outline(shape, 1.0).unwrap().to_bez_path();
            assert!(
                path.elements()
                    .iter()
                    .any(|el| matches!(el, kurbo::PathEl::ClosePath)),
                "{shape:?} path is not closed"
            );
        }
    }

    #[test]
    fn scaling_is_about_the_center() {
        let full = outline(Shape::Square, 1.0).unwrap().bounds();
        let half = outline(Shape::Square, 0.5).unwrap().bounds();
        assert!((half.width() - full.width() / 2.0).abs() < EPS);
        assert!((half.center().x - CANVAS_CENTER).abs() < EPS);
        assert!((half.center().y - CANVAS_CENTER).abs() < EPS);
    }

    #[test]
    fn rounded_variants_share_sharp_geometry() {
        let sharp = outline(Shape::Hexagon, 0.9).unwrap();
        let rounded = outline(Shape::RoundedHexagon, 0.9).unwrap();
        assert_eq!(sharp.path, rounded.path);
        assert_eq!(sharp.transform, rounded.transform);
        assert!(sharp.stroke.is_none());
        let stroke = rounded.stroke.unwrap();
        assert_eq!(stroke.width, ROUNDED_STROKE_WIDTH);
        assert!(stroke.round_join);
    }

    #[test]
    fn painted_bounds_include_the_stroke() {
        let sharp = outline(Shape::Square, 0.5).unwrap();
        assert_eq!(sharp.painted_bounds(), sharp.bounds());

        let rounded = outline(Shape::RoundedSquare, 0.5).unwrap();
        let painted = rounded.painted_bounds();
        assert!((painted.width() - (128.0 + 16.0)).abs() < EPS);
        assert!((painted.x0 - (64.0 - 8.0)).abs() < EPS);
    }

    #[test]
    fn diamond_is_pre_rotated() {
        let diamond = outline(Shape::Diamond, 1.0).unwrap();
        assert!(matches!(diamond.path, PathSpec::Polygon(ref p) if p.len() == 4));
        assert_eq!(diamond.transform, Affine::IDENTITY);
    }

    #[test]
    fn unknown_shape_has_no_outline() {
        assert!(outline(Shape::Unknown, 1.0).is_none());
    }

    #[test]
    fn shape_ids_are_kebab_case() {
        let id = serde_json::to_string(&Shape::RoundedHexagon).unwrap();
        assert_eq!(id, "\"rounded-hexagon\"");
        let legacy: Shape = serde_json::from_str("\"rounded\"").unwrap();
        assert_eq!(legacy, Shape::RoundedSquare);
        let unknown: Shape = serde_json::from_str("\"star\"").unwrap();
        assert_eq!(unknown, Shape::Unknown);
    }
}
