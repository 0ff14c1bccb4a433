use kurbo::{Affine, BezPath, ParamCurve, PathEl, PathSeg, Point, Rect, Shape};
use usvg::tiny_skia_path::PathSegment;
use usvg::{Options, Tree};

use crate::error::{Error, Result};

/// One named SVG icon to be merged into the font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSource {
    /// Icon name, unique within a generation request
    pub name: String,
    /// Raw SVG markup
    pub markup: String,
    /// Codepoint requested for this icon, if any
    pub codepoint: Option<u32>,
}

impl IconSource {
    pub fn new(name: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markup: markup.into(),
            codepoint: None,
        }
    }

    pub fn with_codepoint(mut self, codepoint: u32) -> Self {
        self.codepoint = Some(codepoint);
        self
    }
}

/// Outline extracted from an icon, in the icon's own y-down coordinates
#[derive(Debug, Clone)]
pub struct IconOutline {
    /// Bezier path representing the icon shape
    pub path: BezPath,
    /// Original viewBox width
    pub width: f64,
    /// Original viewBox height
    pub height: f64,
}

/// Parse an icon's SVG markup into a single outline
pub fn parse_icon(icon: &IconSource) -> Result<IconOutline> {
    let parse_error = |reason: String| Error::GlyphParse {
        name: icon.name.clone(),
        reason,
    };

    let opt = Options::default();
    let tree = Tree::from_str(&icon.markup, &opt).map_err(|e| parse_error(e.to_string()))?;

    let size = tree.size();
    let width = size.width() as f64;
    let height = size.height() as f64;
    if width <= 0.0 || height <= 0.0 {
        return Err(parse_error(format!("invalid size {width}x{height}")));
    }

    Ok(IconOutline {
        path: extract_paths(&tree),
        width,
        height,
    })
}

/// Merge every visible path of the tree into one outline
fn extract_paths(tree: &Tree) -> BezPath {
    let mut combined = BezPath::new();
    collect_paths(tree.root(), &mut combined);
    combined
}

fn collect_paths(group: &usvg::Group, combined: &mut BezPath) {
    for node in group.children() {
        match node {
            usvg::Node::Path(path) if path.is_visible() => {
                combined.extend(to_kurbo(path));
            }
            usvg::Node::Group(child) => collect_paths(child, combined),
            _ => {}
        }
    }
}

/// Path in document coordinates, with even-odd fills rewound for
/// non-zero filling
fn to_kurbo(path: &usvg::Path) -> BezPath {
    let pt = |p: usvg::tiny_skia_path::Point| Point::new(p.x as f64, p.y as f64);

    let mut bez = BezPath::new();
    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => bez.move_to(pt(p)),
            PathSegment::LineTo(p) => bez.line_to(pt(p)),
            PathSegment::QuadTo(c, p) => bez.quad_to(pt(c), pt(p)),
            PathSegment::CubicTo(c1, c2, p) => bez.curve_to(pt(c1), pt(c2), pt(p)),
            PathSegment::Close => bez.close_path(),
        }
    }

    let ts = path.abs_transform();
    bez.apply_affine(Affine::new([
        ts.sx as f64,
        ts.ky as f64,
        ts.kx as f64,
        ts.sy as f64,
        ts.tx as f64,
        ts.ty as f64,
    ]));

    let even_odd = path
        .fill()
        .is_some_and(|fill| fill.rule() == usvg::FillRule::EvenOdd);
    if even_odd {
        bez = rewind_for_nonzero(&bez);
    }
    bez
}

fn subpaths(path: &BezPath) -> Vec<BezPath> {
    let mut subpaths: Vec<BezPath> = Vec::new();
    for el in path.elements() {
        if subpaths.is_empty() || matches!(el, PathEl::MoveTo(_)) {
            subpaths.push(BezPath::new());
        }
        if let Some(current) = subpaths.last_mut() {
            current.push(*el);
        }
    }
    subpaths
}

/// The same subpath drawn in the opposite direction
fn reverse_contour(contour: &BezPath) -> BezPath {
    let segments: Vec<PathSeg> = contour.segments().collect();
    let closed = contour
        .elements()
        .last()
        .is_some_and(|el| matches!(el, PathEl::ClosePath));

    let mut reversed = BezPath::new();
    let Some(last) = segments.last() else {
        return contour.clone();
    };
    reversed.move_to(last.end());
    for seg in segments.iter().rev() {
        reversed.push(seg.reverse().as_path_el());
    }
    if closed {
        reversed.close_path();
    }
    reversed
}

struct Contour {
    path: BezPath,
    /// Signed area; negative means clockwise in y-up terms
    area: f64,
    bounds: Rect,
}

/// Make each contour's direction depend on how deeply it is nested, so that
/// non-zero filling reproduces the even-odd result.
fn rewind_for_nonzero(path: &BezPath) -> BezPath {
    let mut contours: Vec<Contour> = subpaths(path)
        .into_iter()
        .map(|path| Contour {
            area: path.area(),
            bounds: path.bounding_box(),
            path,
        })
        .collect();
    if contours.len() < 2 {
        return path.clone();
    }

    // Only a larger contour can enclose a smaller one
    contours.sort_by(|a, b| b.bounds.area().total_cmp(&a.bounds.area()));

    let mut rewound = BezPath::new();
    for (i, contour) in contours.iter().enumerate() {
        let probe = contour.bounds.center();
        let depth = contours[..i]
            .iter()
            .filter(|outer| outer.bounds.contains(probe) && outer.path.contains(probe))
            .count();

        let want_clockwise = depth % 2 == 0;
        if want_clockwise == (contour.area < 0.0) {
            rewound.extend(contour.path.iter());
        } else {
            rewound.extend(reverse_contour(&contour.path));
        }
    }
    rewound
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
        <path d="M2 2 H22 V22 H2 Z"/>
    </svg>"#;

    #[test]
    fn test_parse_icon_reads_size_and_path() {
        let outline = parse_icon(&IconSource::new("square", SQUARE)).unwrap();
        assert_eq!(outline.width, 24.0);
        assert_eq!(outline.height, 24.0);
        let bbox = outline.path.bounding_box();
        assert!((bbox.x0 - 2.0).abs() < 1e-6);
        assert!((bbox.x1 - 22.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_icon_applies_transforms() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20">
            <g transform="translate(5 5)"><rect width="10" height="10"/></g>
        </svg>"#;
        let outline = parse_icon(&IconSource::new("moved", svg)).unwrap();
        let bbox = outline.path.bounding_box();
        assert!((bbox.x0 - 5.0).abs() < 1e-6);
        assert!((bbox.y1 - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_icon_rejects_bad_markup() {
        let err = parse_icon(&IconSource::new("broken", "<svg><path")).unwrap_err();
        match err {
            Error::GlyphParse { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_evenodd_hole_winds_opposite() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20">
            <path fill-rule="evenodd" d="M0 0 H20 V20 H0 Z M5 5 H15 V15 H5 Z"/>
        </svg>"#;
        let outline = parse_icon(&IconSource::new("ring", svg)).unwrap();
        let contours = subpaths(&outline.path);
        assert_eq!(contours.len(), 2);
        assert!(contours[0].area().signum() != contours[1].area().signum());
    }

    #[test]
    fn test_reverse_contour_flips_area() {
        let mut square = BezPath::new();
        square.move_to((0.0, 0.0));
        square.line_to((10.0, 0.0));
        square.line_to((10.0, 10.0));
        square.line_to((0.0, 10.0));
        square.close_path();
        let reversed = reverse_contour(&square);
        assert!((square.area() + reversed.area()).abs() < 1e-9);
    }
}
