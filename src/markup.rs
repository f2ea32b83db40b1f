//! Scene graph to SVG markup.
//!
//! Emission is purely mechanical: every number and color comes from the
//! scene. Definitions (masks, clip paths, filters, gradients) are collected
//! into `<defs>` with counter-based ids while the body is written, so the
//! same scene always produces byte-identical markup.

use core::fmt::Write as _;

use kurbo::{Affine, Rect};

use crate::fonts;
use crate::geometry::{CANVAS_SIZE, Outline, PathSpec};
use crate::scene::{
    DropShadow, FilterSpec, GlyphRun, Gradient, GradientStop, InnerShadow, Layer, Paint,
    SceneGraph,
};

/// Serializes a scene to a standalone SVG document on the 256×256 canvas.
pub fn serialize(scene: &SceneGraph) -> String {
    let mut writer = SvgWriter::default();
    if let Some(url) = &scene.font_import {
        writer.defs.push_str(&fonts::import_placeholder(url));
    }

    let canvas = Rect::new(0.0, 0.0, scene.size(), scene.size());
    let mut body = String::new();
    for layer in &scene.layers {
        writer.layer(layer, canvas, &mut body);
    }

    let size = fmt(scene.size());
    let mut out = String::with_capacity(writer.defs.len() + body.len() + 160);
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
         viewBox=\"0 0 {size} {size}\">"
    );
    if !writer.defs.is_empty() {
        let _ = write!(out, "<defs>{}</defs>", writer.defs);
    }
    out.push_str(&body);
    out.push_str("</svg>");
    out
}

#[derive(Default)]
struct SvgWriter {
    defs: String,
    masks: u32,
    clips: u32,
    filters: u32,
    gradients: u32,
}

impl SvgWriter {
    /// Writes one layer. `frame` is the box gradient overlays cover: the
    /// enclosing silhouette's bounds, or the canvas outside any mask.
    fn layer(&mut self, layer: &Layer, frame: Rect, body: &mut String) {
        match layer {
            Layer::Fill(fill) => {
                let color = fill.color.to_string();
                body.push_str(&shape_element(&fill.outline, &color, true));
            }
            Layer::GradientOverlay(overlay) => {
                let id = self.gradient(&overlay.gradient);
                let _ = write!(
                    body,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"url(#{id})\"/>",
                    fmt(frame.x0),
                    fmt(frame.y0),
                    fmt(frame.width()),
                    fmt(frame.height()),
                );
            }
            Layer::Mask {
                silhouette,
                children,
            } => {
                let id = self.silhouette_mask(silhouette);
                let _ = write!(body, "<g mask=\"url(#{id})\">");
                self.children(children, silhouette.painted_bounds(), body);
                body.push_str("</g>");
            }
            Layer::ClipRegion {
                outline,
                opacity,
                children,
            } => {
                // clipPath ignores strokes, so rounded outlines need a mask.
                if outline.stroke.is_some() {
                    let id = self.silhouette_mask(outline);
                    let _ = write!(body, "<g mask=\"url(#{id})\"");
                } else {
                    self.clips += 1;
                    let id = format!("clip{}", self.clips);
                    let _ = write!(
                        self.defs,
                        "<clipPath id=\"{id}\">{}</clipPath>",
                        shape_element(outline, "#000000", false),
                    );
                    let _ = write!(body, "<g clip-path=\"url(#{id})\"");
                }
                if let Some(opacity) = opacity {
                    let _ = write!(body, " opacity=\"{}\"", fmt(*opacity as f64));
                }
                body.push('>');
                self.children(children, outline.painted_bounds(), body);
                body.push_str("</g>");
            }
            Layer::Filter { filter, children } => {
                self.filters += 1;
                let id = format!("filter{}", self.filters);
                let _ = write!(
                    self.defs,
                    "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">"
                );
                match filter {
                    FilterSpec::ShapeEffects { drop, inner } => {
                        shape_effect_primitives(&mut self.defs, drop.as_ref(), inner.as_ref());
                    }
                    FilterSpec::TextShadow(shadow) => {
                        text_shadow_primitives(&mut self.defs, shadow);
                    }
                }
                self.defs.push_str("</filter>");

                // Text shadow offsets are in the glyphs' rotated frame, so the
                // filtered group carries that frame and the text inside is
                // drawn untransformed.
                let glyph_frame = match filter {
                    FilterSpec::TextShadow(_) => shared_glyph_transform(children),
                    FilterSpec::ShapeEffects { .. } => None,
                };
                match glyph_frame {
                    Some(transform) => {
                        let _ = write!(
                            body,
                            "<g{} filter=\"url(#{id})\">",
                            transform_attr(transform)
                        );
                        for child in children {
                            if let Layer::TextGlyphRun(run) = child {
                                self.text(run, Affine::IDENTITY, body);
                            }
                        }
                    }
                    None => {
                        let _ = write!(body, "<g filter=\"url(#{id})\">");
                        self.children(children, frame, body);
                    }
                }
                body.push_str("</g>");
            }
            Layer::ShadowClone(clone) => self.text(&clone.run, clone.run.transform, body),
            Layer::TextGlyphRun(run) => self.text(run, run.transform, body),
        }
    }

    /// Defines a mask showing the painted silhouette and returns its id.
    fn silhouette_mask(&mut self, silhouette: &Outline) -> String {
        self.masks += 1;
        let id = format!("mask{}", self.masks);
        let _ = write!(
            self.defs,
            "<mask id=\"{id}\" maskUnits=\"userSpaceOnUse\" x=\"0\" y=\"0\" \
             width=\"{size}\" height=\"{size}\">{}</mask>",
            shape_element(silhouette, "#ffffff", true),
            size = fmt(CANVAS_SIZE),
        );
        id
    }

    fn children(&mut self, children: &[Layer], frame: Rect, body: &mut String) {
        for child in children {
            self.layer(child, frame, body);
        }
    }

    /// Writes a glyph run placed by `transform` rather than its own.
    fn text(&mut self, run: &GlyphRun, transform: Affine, body: &mut String) {
        let _ = write!(
            body,
            "<text x=\"50%\" y=\"50%\" text-anchor=\"middle\" dominant-baseline=\"central\" \
             font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{}\"",
            escape(&run.font_family),
            fmt(run.font_size),
            if run.bold { "bold" } else { "normal" },
            if run.italic { "italic" } else { "normal" },
        );
        body.push_str(&transform_attr(transform));

        match &run.fill {
            Paint::None => body.push_str(" fill=\"none\""),
            Paint::Solid { color, opacity } => {
                let _ = write!(body, " fill=\"{color}\"");
                if *opacity < 1.0 {
                    let _ = write!(body, " fill-opacity=\"{}\"", fmt(*opacity as f64));
                }
            }
            Paint::Gradient(gradient) => {
                let id = self.gradient(gradient);
                let _ = write!(body, " fill=\"url(#{id})\"");
            }
        }
        match &run.stroke {
            Some(stroke) => {
                let _ = write!(
                    body,
                    " stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" \
                     stroke-linejoin=\"round\"",
                    stroke.color,
                    fmt(stroke.width),
                    fmt(stroke.opacity as f64),
                );
            }
            None => body.push_str(" stroke=\"none\""),
        }
        let _ = write!(body, ">{}</text>", escape(&run.text));
    }

    /// Defines a gradient and returns its id.
    fn gradient(&mut self, gradient: &Gradient) -> String {
        self.gradients += 1;
        let id = format!("gradient{}", self.gradients);
        match gradient {
            Gradient::Linear { start, end, stops } => {
                let _ = write!(
                    self.defs,
                    "<linearGradient id=\"{id}\" x1=\"{}%\" y1=\"{}%\" x2=\"{}%\" y2=\"{}%\">",
                    fmt(start.x),
                    fmt(start.y),
                    fmt(end.x),
                    fmt(end.y),
                );
                write_stops(&mut self.defs, stops);
                self.defs.push_str("</linearGradient>");
            }
            Gradient::Radial {
                center,
                radius,
                stops,
            } => {
                let _ = write!(
                    self.defs,
                    "<radialGradient id=\"{id}\" cx=\"{}%\" cy=\"{}%\" r=\"{}%\">",
                    fmt(center.x),
                    fmt(center.y),
                    fmt(*radius),
                );
                write_stops(&mut self.defs, stops);
                self.defs.push_str("</radialGradient>");
            }
        }
        id
    }
}

/// The transform every child shares, when all of them are plain glyph runs.
fn shared_glyph_transform(children: &[Layer]) -> Option<Affine> {
    let mut transforms = children.iter().map(|child| match child {
        Layer::TextGlyphRun(run) => Some(run.transform),
        _ => None,
    });
    let first = transforms.next()??;
    transforms
        .all(|t| t == Some(first))
        .then_some(first)
}

fn write_stops(defs: &mut String, stops: &[GradientStop]) {
    for stop in stops {
        let _ = write!(
            defs,
            "<stop offset=\"{}%\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
            fmt(stop.offset as f64 * 100.0),
            stop.color,
            fmt(stop.opacity as f64),
        );
    }
}

/// Drop shadow, inner shadow, then a merge of shadow, source and inner shadow.
fn shape_effect_primitives(
    defs: &mut String,
    drop: Option<&DropShadow>,
    inner: Option<&InnerShadow>,
) {
    if let Some(drop) = drop {
        let _ = write!(
            defs,
            "<feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" \
             flood-opacity=\"{}\" result=\"dropShadow\"/>",
            fmt(drop.offset.x),
            fmt(drop.offset.y),
            fmt(drop.std_deviation),
            drop.color,
            fmt(drop.opacity as f64),
        );
    }
    if let Some(inner) = inner {
        let _ = write!(
            defs,
            "<feComponentTransfer in=\"SourceAlpha\" result=\"invertedAlpha\">\
             <feFuncA type=\"table\" tableValues=\"1 0\"/></feComponentTransfer>\
             <feGaussianBlur in=\"invertedAlpha\" stdDeviation=\"{}\" result=\"blurredInverted\"/>\
             <feOffset in=\"blurredInverted\" dx=\"{}\" dy=\"{}\" result=\"offsetBlurred\"/>\
             <feComposite in=\"offsetBlurred\" in2=\"SourceAlpha\" operator=\"in\" \
             result=\"innerShadowAlpha\"/>\
             <feFlood flood-color=\"{}\" flood-opacity=\"{}\" result=\"innerFlood\"/>\
             <feComposite in=\"innerFlood\" in2=\"innerShadowAlpha\" operator=\"in\" \
             result=\"innerShadow\"/>",
            fmt(inner.std_deviation),
            fmt(inner.offset.x),
            fmt(inner.offset.y),
            inner.color,
            fmt(inner.opacity as f64),
        );
    }
    defs.push_str("<feMerge>");
    if drop.is_some() {
        defs.push_str("<feMergeNode in=\"dropShadow\"/>");
    }
    defs.push_str("<feMergeNode in=\"SourceGraphic\"/>");
    if inner.is_some() {
        defs.push_str("<feMergeNode in=\"innerShadow\"/>");
    }
    defs.push_str("</feMerge>");
}

/// Shadow only: the glyphs themselves are drawn by a separate layer.
fn text_shadow_primitives(defs: &mut String, shadow: &DropShadow) {
    let _ = write!(
        defs,
        "<feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"{}\" result=\"blur\"/>\
         <feOffset in=\"blur\" dx=\"{}\" dy=\"{}\" result=\"offset\"/>\
         <feFlood flood-color=\"{}\" flood-opacity=\"{}\" result=\"flood\"/>\
         <feComposite in=\"flood\" in2=\"offset\" operator=\"in\"/>",
        fmt(shadow.std_deviation),
        fmt(shadow.offset.x),
        fmt(shadow.offset.y),
        shadow.color,
        fmt(shadow.opacity as f64),
    );
}

/// Writes an outline as a single element filled with `fill`.
///
/// With `stroked`, a rounded outline also gets its widening stroke in the
/// same color.
fn shape_element(outline: &Outline, fill: &str, stroked: bool) -> String {
    let mut el = String::new();
    match &outline.path {
        PathSpec::Circle(circle) => {
            let _ = write!(
                el,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
                fmt(circle.center.x),
                fmt(circle.center.y),
                fmt(circle.radius),
            );
        }
        PathSpec::Rect(rect) => {
            let _ = write!(
                el,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                fmt(rect.x0),
                fmt(rect.y0),
                fmt(rect.width()),
                fmt(rect.height()),
            );
        }
        PathSpec::Polygon(points) => {
            let points: Vec<String> = points
                .iter()
                .map(|p| format!("{},{}", fmt(p.x), fmt(p.y)))
                .collect();
            let _ = write!(el, "<polygon points=\"{}\"", points.join(" "));
        }
        PathSpec::Path(path) => {
            let _ = write!(el, "<path d=\"{}\"", path.to_svg());
        }
    }
    el.push_str(&transform_attr(outline.transform));
    let _ = write!(el, " fill=\"{fill}\"");
    if let Some(stroke) = outline.stroke.filter(|_| stroked) {
        let _ = write!(el, " stroke=\"{fill}\" stroke-width=\"{}\"", fmt(stroke.width));
        if stroke.round_join {
            el.push_str(" stroke-linejoin=\"round\"");
        }
    }
    el.push_str("/>");
    el
}

fn transform_attr(transform: Affine) -> String {
    if transform == Affine::IDENTITY {
        return String::new();
    }
    let c = transform.as_coeffs();
    format!(
        " transform=\"matrix({} {} {} {} {} {})\"",
        fmt(c[0]),
        fmt(c[1]),
        fmt(c[2]),
        fmt(c[3]),
        fmt(c[4]),
        fmt(c[5]),
    )
}

/// Formats a number compactly: integers without a fraction, everything else
/// with at most four decimals.
fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = v.round();
    if (v - rounded).abs() < 1e-6 {
        return format!("{}", rounded as i64);
    }
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
