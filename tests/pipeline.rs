use iconforge::error::FontFetchError;
use iconforge::geometry::PathSpec;
use iconforge::scene::Paint;
use iconforge::{
    ExportError, FontFetcher, HexColor, Layer, RasterSet, Rasterizer, ShadowType, Shape,
    StyleDescription, StyleStore, TARGET_SIZES, compose, encode, export_icon, serialize,
};
use kurbo::Vec2;

fn long_shadow_style() -> StyleDescription {
    StyleDescription {
        shape: Shape::Circle,
        bg_color: "#6200ee".parse().unwrap(),
        text: "A".to_string(),
        shadow_enabled: true,
        shadow_type: ShadowType::Long,
        shadow_distance: 8.0,
        shadow_blur: false,
        global_shadow_angle: 45.0,
        ..StyleDescription::default()
    }
}

fn everything_on() -> StyleDescription {
    StyleDescription {
        text: "Hi".to_string(),
        shape: Shape::RoundedHexagon,
        text_gradient_enabled: true,
        shape_shadow_enabled: true,
        shape_inner_shadow_enabled: true,
        bg_gradient_enabled: true,
        outline_enabled: true,
        finish_layer: true,
        edge_tint_shade: true,
        score_enabled: true,
        shadow_blur: true,
        rotate: 12.0,
        offset_x: -6.0,
        ..StyleDescription::default()
    }
}

#[test]
fn long_shadow_end_to_end() {
    let style = long_shadow_style();
    let scene = compose(&style);

    let (outline, opacity, children) = scene
        .layers
        .iter()
        .find_map(|layer| match layer {
            Layer::ClipRegion {
                outline,
                opacity,
                children,
            } => Some((outline, opacity, children)),
            _ => None,
        })
        .expect("long shadow group");

    assert!(matches!(outline.path, PathSpec::Circle(_)));
    assert_eq!(*opacity, Some(style.shadow_opacity / 100.0));
    assert_eq!(children.len(), 8);

    let dir = Vec2::new(45f64.to_radians().cos(), 45f64.to_radians().sin());
    let mut opacities = Vec::new();
    for (i, child) in children.iter().enumerate() {
        let Layer::ShadowClone(clone) = child else {
            panic!("expected a shadow clone, got {child:?}");
        };
        let step = (i + 1) as f64;
        assert_eq!(clone.index as usize, i + 1);
        assert_eq!(clone.run.text, "A");
        assert!((clone.offset - dir * step).hypot() < 1e-9);
        match clone.run.fill {
            Paint::Solid { color, opacity } => {
                assert_eq!(color, style.shadow_color);
                opacities.push(opacity);
            }
            ref other => panic!("unexpected clone fill {other:?}"),
        }
    }
    assert!(opacities.windows(2).all(|w| w[0] == w[1]));

    let svg = serialize(&scene);
    assert!(svg.contains("fill=\"#6200ee\""));
    assert_eq!(svg.matches(">A</text>").count(), 8 + 1);
}

#[test]
fn save_load_compose_roundtrip() {
    let style = everything_on();
    let mut store = StyleStore::with_style(style.clone());
    let json = store.save_json().unwrap();

    let mut restored = StyleStore::new();
    restored.load_json(&json).unwrap();
    assert_eq!(compose(&restored.snapshot()), compose(&style));

    // A failed load keeps what was there.
    assert!(store.load_json("{\"shadowType\": \"sideways\"}").is_err());
    assert_eq!(compose(&store.snapshot()), compose(&style));
}

#[test]
fn legacy_documents_still_load() {
    let style = StyleDescription::from_json(
        r##"{"shape": "rounded", "shadowLength": "24", "offsetX": "oops", "bgColor": "#00ff00"}"##,
    )
    .unwrap();
    assert_eq!(style.shape, Shape::RoundedSquare);
    assert_eq!(style.shadow_distance, 24.0);
    assert_eq!(style.offset_x, StyleDescription::default().offset_x);
    assert_eq!(style.bg_color, HexColor::new(0, 255, 0));
}

#[test]
fn container_layout() {
    let mut set = RasterSet::new();
    for size in TARGET_SIZES {
        set.insert(size, vec![0xAB; size as usize]).unwrap();
    }
    let bytes = encode(&set).unwrap();

    assert_eq!(&bytes[..6], &[0, 0, 1, 0, 6, 0]);
    let payload: usize = TARGET_SIZES.iter().map(|s| *s as usize).sum();
    assert_eq!(bytes.len(), 6 + 16 * 6 + payload);
    // the last directory entry describes the 256px image
    let last = 6 + 16 * 5;
    assert_eq!(&bytes[last..last + 2], &[0, 0]);
}

struct PngStub;

impl Rasterizer for PngStub {
    fn rasterize(&self, markup: &str, size: u32) -> Result<Vec<u8>, ExportError> {
        assert!(markup.starts_with("<svg"));
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&size.to_be_bytes());
        Ok(bytes)
    }
}

struct Unreachable;

impl FontFetcher for Unreachable {
    fn fetch_text(&self, url: &str) -> Result<String, FontFetchError> {
        Err(FontFetchError::new(url, "network is down"))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FontFetchError> {
        Err(FontFetchError::new(url, "network is down"))
    }
}

#[test]
fn export_with_stub_backends() {
    let ico = export_icon(&everything_on(), &PngStub, Some(&Unreachable)).unwrap();
    assert_eq!(u16::from_le_bytes([ico[4], ico[5]]), 6);
    assert_eq!(ico.len(), 6 + 16 * 6 + 12 * 6);

    let first_image = u32::from_le_bytes([ico[18], ico[19], ico[20], ico[21]]) as usize;
    assert_eq!(&ico[first_image..first_image + 4], b"\x89PNG");
}
