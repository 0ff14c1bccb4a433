use anyhow::{anyhow, Context, Result};
use kurbo::{BezPath, CubicBez, PathEl, Point};
use write_fonts::{
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, SimpleGlyph},
        head::{Head, MacStyle},
        hhea::Hhea,
        hmtx::Hmtx,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::Os2,
        post::Post,
        vmtx::LongMetric,
    },
    types::{FWord, Fixed, GlyphId, NameId, UfWord},
    FontBuilder,
};

use super::Transcoder;
use crate::svg_font::{SvgFont, VectorFontDocument};

/// Maximum distance, in font units, between a cubic and its quadratic approximation
const CURVE_TOLERANCE: f64 = 0.5;

/// Builds a TrueType font from the SVG font document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtfTranscoder;

impl Transcoder for TtfTranscoder {
    fn transcode(&self, doc: &VectorFontDocument) -> Result<Vec<u8>> {
        let font = doc.parse()?;
        build_ttf(&font)
    }
}

/// Assemble a TTF from parsed SVG font glyphs
pub fn build_ttf(font: &SvgFont) -> Result<Vec<u8>> {
    let metrics = font.metrics;
    let num_glyphs = u16::try_from(font.glyphs.len() + 1)
        .map_err(|_| anyhow!("too many glyphs: {}", font.glyphs.len()))?;

    let mut glyf_builder = GlyfLocaBuilder::new();

    // .notdef glyph (required, empty)
    glyf_builder.add_glyph(&SimpleGlyph::default())?;

    let mut h_metrics: Vec<LongMetric> = vec![LongMetric {
        advance: metrics.units_per_em,
        side_bearing: 0,
    }];
    let mut bounds = FontBounds::default();
    let mut max_points = 0u16;
    let mut max_contours = 0u16;

    for glyph in &font.glyphs {
        // TTF glyphs only support quadratic beziers
        let quadratic = cubic_to_quadratic(&glyph.path);
        let simple = if quadratic.elements().is_empty() {
            SimpleGlyph::default()
        } else {
            SimpleGlyph::from_bezpath(&quadratic)
                .map_err(|e| anyhow!("glyph '{}': {:?}", glyph.name, e))?
        };

        let (points, contours) = count_points(&quadratic);
        max_points = max_points.max(points);
        max_contours = max_contours.max(contours);

        let bbox = simple.bbox;
        let has_outline = !quadratic.elements().is_empty();
        bounds.add(glyph.advance, has_outline.then_some(bbox));

        glyf_builder
            .add_glyph(&simple)
            .with_context(|| format!("Failed to add glyph '{}'", glyph.name))?;

        h_metrics.push(LongMetric {
            advance: glyph.advance,
            side_bearing: if has_outline { bbox.x_min } else { 0 },
        });
    }

    let (glyf, loca, loca_format) = glyf_builder.build();

    let cmap = build_cmap(font)?;

    let mut head = build_head(font, &bounds);
    head.index_to_loc_format = loca_format as i16;

    let extents = VerticalExtents::new(font)?;
    let hhea = build_hhea(extents, &bounds, num_glyphs);
    let hmtx = Hmtx::new(h_metrics, vec![]);

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(max_points),
        max_contours: Some(max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
        ..Default::default()
    };

    let name = build_name(&font.family);
    let os2 = build_os2(font, extents, &bounds);

    let glyph_names: Vec<&str> = std::iter::once(".notdef")
        .chain(font.glyphs.iter().map(|g| g.name.as_str()))
        .collect();
    let post = Post::new_v2(glyph_names);

    let font_data = FontBuilder::new()
        .add_table(&head)?
        .add_table(&hhea)?
        .add_table(&maxp)?
        .add_table(&os2)?
        .add_table(&hmtx)?
        .add_table(&cmap)?
        .add_table(&name)?
        .add_table(&post)?
        .add_table(&loca)?
        .add_table(&glyf)?
        .build();

    Ok(font_data)
}

/// Running extents over all glyphs, used by head, hhea and OS/2
#[derive(Debug, Default)]
struct FontBounds {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    advance_max: u16,
    advance_sum: u64,
    count: u64,
    min_lsb: Option<i16>,
    min_rsb: Option<i16>,
    max_extent: i16,
    seen_outline: bool,
}

impl FontBounds {
    fn add(&mut self, advance: u16, bbox: Option<write_fonts::tables::glyf::Bbox>) {
        self.advance_max = self.advance_max.max(advance);
        self.advance_sum += advance as u64;
        self.count += 1;

        let Some(bbox) = bbox else {
            return;
        };
        if self.seen_outline {
            self.x_min = self.x_min.min(bbox.x_min);
            self.y_min = self.y_min.min(bbox.y_min);
            self.x_max = self.x_max.max(bbox.x_max);
            self.y_max = self.y_max.max(bbox.y_max);
        } else {
            self.x_min = bbox.x_min;
            self.y_min = bbox.y_min;
            self.x_max = bbox.x_max;
            self.y_max = bbox.y_max;
            self.seen_outline = true;
        }

        let width = bbox.x_max as i32 - bbox.x_min as i32;
        let rsb = clamp_i16(advance as i32 - bbox.x_min as i32 - width);
        self.min_lsb = Some(self.min_lsb.map_or(bbox.x_min, |v| v.min(bbox.x_min)));
        self.min_rsb = Some(self.min_rsb.map_or(rsb, |v| v.min(rsb)));
        self.max_extent = self.max_extent.max(clamp_i16(bbox.x_min as i32 + width));
    }

    fn average_advance(&self) -> i16 {
        if self.count == 0 {
            return 0;
        }
        clamp_i16((self.advance_sum / self.count) as i32)
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// On-curve plus off-curve points and contour count of a quadratic path
fn count_points(path: &BezPath) -> (u16, u16) {
    let mut points = 0u32;
    let mut contours = 0u32;
    for el in path.elements() {
        match el {
            PathEl::MoveTo(_) => {
                contours += 1;
                points += 1;
            }
            PathEl::LineTo(_) => points += 1,
            PathEl::QuadTo(..) => points += 2,
            PathEl::CurveTo(..) => points += 3,
            PathEl::ClosePath => {}
        }
    }
    (
        points.min(u16::MAX as u32) as u16,
        contours.min(u16::MAX as u32) as u16,
    )
}

/// Replace every cubic with quadratics lying within [`CURVE_TOLERANCE`]
fn cubic_to_quadratic(path: &BezPath) -> BezPath {
    let mut result = BezPath::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;

    for el in path.elements() {
        if let PathEl::CurveTo(p1, p2, p3) = *el {
            for (_, _, quad) in CubicBez::new(last, p1, p2, p3).to_quads(CURVE_TOLERANCE) {
                result.quad_to(quad.p1, quad.p2);
            }
        } else {
            result.push(*el);
        }

        last = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                p
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => p,
            PathEl::ClosePath => start,
        };
    }

    result
}

/// Build the cmap table (character to glyph mapping)
fn build_cmap(font: &SvgFont) -> Result<Cmap> {
    let mut mappings: Vec<(char, GlyphId)> = font
        .glyphs
        .iter()
        .enumerate()
        .map(|(i, glyph)| {
            char::from_u32(glyph.codepoint)
                .map(|c| (c, GlyphId::new((i + 1) as u32))) // +1 because .notdef is 0
                .ok_or_else(|| anyhow!("glyph '{}' has invalid codepoint", glyph.name))
        })
        .collect::<Result<_>>()?;
    mappings.sort_by_key(|(c, _)| *c);

    Cmap::from_mappings(mappings).map_err(|e| anyhow!("Failed to create cmap: {:?}", e))
}

fn build_head(font: &SvgFont, bounds: &FontBounds) -> Head {
    Head {
        font_revision: Fixed::from_f64(1.0),
        units_per_em: font.metrics.units_per_em,
        created: Default::default(),
        modified: Default::default(),
        x_min: bounds.x_min,
        y_min: bounds.y_min,
        x_max: bounds.x_max,
        y_max: bounds.y_max,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        index_to_loc_format: 1, // Long offsets (will be updated)
        ..Default::default()
    }
}

/// Ascender and descender as signed font units
#[derive(Debug, Clone, Copy)]
struct VerticalExtents {
    ascender: i16,
    descender: i16,
}

impl VerticalExtents {
    fn new(font: &SvgFont) -> Result<Self> {
        let metrics = font.metrics;
        let ascender = i16::try_from(metrics.ascent)
            .with_context(|| format!("ascent {} does not fit the font", metrics.ascent))?;
        let descender = i16::try_from(metrics.descent)
            .map(|d| -d)
            .with_context(|| format!("descent {} does not fit the font", metrics.descent))?;
        Ok(Self {
            ascender,
            descender,
        })
    }
}

fn build_hhea(extents: VerticalExtents, bounds: &FontBounds, num_glyphs: u16) -> Hhea {
    Hhea {
        ascender: FWord::new(extents.ascender),
        descender: FWord::new(extents.descender),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(bounds.advance_max),
        min_left_side_bearing: FWord::new(bounds.min_lsb.unwrap_or(0)),
        min_right_side_bearing: FWord::new(bounds.min_rsb.unwrap_or(0)),
        x_max_extent: FWord::new(bounds.max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
        ..Default::default()
    }
}

fn build_name(family: &str) -> Name {
    let mut name = Name::default();

    name.name_record.push(create_name_record(
        NameId::COPYRIGHT_NOTICE,
        "Generated by svg2webfont",
    ));
    name.name_record
        .push(create_name_record(NameId::FAMILY_NAME, family));
    name.name_record
        .push(create_name_record(NameId::SUBFAMILY_NAME, "Regular"));
    name.name_record.push(create_name_record(
        NameId::UNIQUE_ID,
        &format!("svg2webfont: {}", family),
    ));
    name.name_record
        .push(create_name_record(NameId::FULL_NAME, family));
    name.name_record
        .push(create_name_record(NameId::VERSION_STRING, "Version 1.0"));
    name.name_record.push(create_name_record(
        NameId::POSTSCRIPT_NAME,
        &postscript_name(family),
    ));

    name
}

fn create_name_record(name_id: NameId, value: &str) -> NameRecord {
    NameRecord {
        platform_id: 3,     // Windows
        encoding_id: 1,     // Unicode BMP
        language_id: 0x409, // English US
        name_id,
        string: value.to_string().into(),
    }
}

/// PostScript names are printable ASCII without spaces or delimiters
fn postscript_name(family: &str) -> String {
    let name: String = family
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .take(63)
        .collect();
    if name.is_empty() {
        "Icons".to_string()
    } else {
        name
    }
}

fn build_os2(font: &SvgFont, extents: VerticalExtents, bounds: &FontBounds) -> Os2 {
    let metrics = font.metrics;
    let first_char = font.glyphs.iter().map(|g| g.codepoint).min().unwrap_or(0);
    let last_char = font.glyphs.iter().map(|g| g.codepoint).max().unwrap_or(0);
    let uses_pua = font
        .glyphs
        .iter()
        .any(|g| (0xE000..=0xF8FF).contains(&g.codepoint));

    Os2 {
        x_avg_char_width: bounds.average_advance(),
        us_weight_class: 400, // Normal
        us_width_class: 5,    // Medium
        fs_type: 0,           // Installable
        y_subscript_x_size: 650,
        y_subscript_y_size: 600,
        y_subscript_x_offset: 0,
        y_subscript_y_offset: 75,
        y_superscript_x_size: 650,
        y_superscript_y_size: 600,
        y_superscript_x_offset: 0,
        y_superscript_y_offset: 350,
        y_strikeout_size: 50,
        y_strikeout_position: 300,
        s_typo_ascender: extents.ascender,
        s_typo_descender: extents.descender,
        s_typo_line_gap: 0,
        us_win_ascent: metrics.ascent.max(bounds.y_max.max(0) as u16),
        us_win_descent: metrics.descent.max(bounds.y_min.min(0).unsigned_abs()),
        ul_unicode_range_1: 0,
        ul_unicode_range_2: if uses_pua { 1 << 28 } else { 0 }, // Private Use Area (bit 60)
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        us_first_char_index: first_char.min(0xFFFF) as u16,
        us_last_char_index: last_char.min(0xFFFF) as u16,
        ul_code_page_range_1: Some(1), // Latin 1
        ul_code_page_range_2: Some(0),
        sx_height: Some(0),
        s_cap_height: Some(0),
        us_default_char: Some(0),
        us_break_char: Some(32),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg_font::FontMetrics;
    use crate::transcode::tests::sample_document;
    use read_fonts::{FontRef, TableProvider};

    #[test]
    fn test_ttf_maps_codepoints_to_glyphs() {
        let data = TtfTranscoder.transcode(&sample_document()).unwrap();
        let font = FontRef::new(&data).unwrap();

        assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
        assert_eq!(font.head().unwrap().units_per_em(), 1000);

        let cmap = font.cmap().unwrap();
        assert_eq!(cmap.map_codepoint(0xF101u32).map(|g| g.to_u32()), Some(1));
        assert_eq!(cmap.map_codepoint(0xF102u32).map(|g| g.to_u32()), Some(2));
        assert_eq!(cmap.map_codepoint(0xF103u32), None);
    }

    #[test]
    fn test_ttf_vertical_metrics() {
        let data = TtfTranscoder.transcode(&sample_document()).unwrap();
        let font = FontRef::new(&data).unwrap();
        let hhea = font.hhea().unwrap();
        assert_eq!(hhea.ascender().to_i16(), 850);
        assert_eq!(hhea.descender().to_i16(), -150);
    }

    #[test]
    fn test_oversized_metrics_rejected() {
        let mut font = sample_document().parse().unwrap();
        font.metrics = FontMetrics {
            units_per_em: 40000,
            ascent: 39000,
            descent: 1000,
        };
        let err = build_ttf(&font).unwrap_err();
        assert!(format!("{err:#}").contains("ascent 39000"));
    }

    #[test]
    fn test_cubic_to_quadratic_removes_cubics() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 500.0), (1000.0, 500.0), (1000.0, 0.0));
        path.close_path();

        let quadratic = cubic_to_quadratic(&path);
        assert!(quadratic
            .elements()
            .iter()
            .all(|el| !matches!(el, PathEl::CurveTo(..))));
        assert!(quadratic
            .elements()
            .iter()
            .any(|el| matches!(el, PathEl::QuadTo(..))));
    }

    #[test]
    fn test_postscript_name() {
        assert_eq!(postscript_name("My Icons (v2)"), "MyIconsv2");
        assert_eq!(postscript_name("   "), "Icons");
    }
}
