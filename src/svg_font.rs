//! The consolidated SVG font document.
//!
//! The composer writes one of these per generation; every transcoder reads it
//! back from its text, so the document carries its own metrics and glyph list.

use std::fmt::Write as _;

use anyhow::{anyhow, bail, Context, Result};
use kurbo::{BezPath, PathEl};

/// Default units per em for generated fonts
pub const DEFAULT_UNITS_PER_EM: u16 = 1000;

/// Default depth below the baseline, in font units
pub const DEFAULT_DESCENT: u16 = 150;

/// Units-per-em range accepted by the OpenType head table
pub const UNITS_PER_EM_RANGE: std::ops::RangeInclusive<u16> = 16..=16384;

/// Vertical metrics shared by every glyph in the font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    /// Height above the baseline
    pub ascent: u16,
    /// Depth below the baseline, as a positive number
    pub descent: u16,
}

impl FontMetrics {
    /// Metrics where ascent and descent together span exactly one em.
    pub fn new(units_per_em: u16, descent: u16) -> Option<Self> {
        if !UNITS_PER_EM_RANGE.contains(&units_per_em) || descent >= units_per_em {
            return None;
        }
        Some(Self {
            units_per_em,
            ascent: units_per_em - descent,
            descent,
        })
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            units_per_em: DEFAULT_UNITS_PER_EM,
            ascent: DEFAULT_UNITS_PER_EM - DEFAULT_DESCENT,
            descent: DEFAULT_DESCENT,
        }
    }
}

/// An SVG font document holding every icon glyph.
///
/// Built once per generation and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorFontDocument {
    family: String,
    metrics: FontMetrics,
    glyph_count: usize,
    markup: String,
}

impl VectorFontDocument {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.markup.as_bytes()
    }

    /// Re-read the document into glyph outlines.
    pub fn parse(&self) -> Result<SvgFont> {
        SvgFont::parse(&self.markup)
    }
}

/// A glyph as stored in the SVG font, in font units with y pointing up.
#[derive(Debug, Clone)]
pub struct SvgGlyph {
    pub name: String,
    pub codepoint: u32,
    pub advance: u16,
    pub path: BezPath,
}

/// Parsed form of a [`VectorFontDocument`].
#[derive(Debug, Clone)]
pub struct SvgFont {
    pub family: String,
    pub metrics: FontMetrics,
    pub glyphs: Vec<SvgGlyph>,
}

impl SvgFont {
    /// Serialize into an SVG font document.
    pub fn to_document(&self) -> VectorFontDocument {
        let family = escape_xml(&self.family);
        let FontMetrics {
            units_per_em,
            ascent,
            descent,
        } = self.metrics;

        let mut markup = String::new();
        markup.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n");
        markup.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\">\n<defs>\n");
        let _ = writeln!(
            markup,
            "<font id=\"{family}\" horiz-adv-x=\"{units_per_em}\">"
        );
        let _ = writeln!(
            markup,
            "<font-face font-family=\"{family}\" units-per-em=\"{units_per_em}\" ascent=\"{ascent}\" descent=\"-{descent}\" />"
        );
        markup.push_str("<missing-glyph horiz-adv-x=\"0\" />\n");

        for glyph in &self.glyphs {
            let _ = write!(
                markup,
                "<glyph glyph-name=\"{}\" unicode=\"&#x{:X};\" horiz-adv-x=\"{}\"",
                escape_xml(&glyph.name),
                glyph.codepoint,
                glyph.advance
            );
            if !glyph.path.elements().is_empty() {
                let _ = write!(markup, " d=\"{}\"", path_data(&glyph.path));
            }
            markup.push_str(" />\n");
        }

        markup.push_str("</font>\n</defs>\n</svg>\n");

        VectorFontDocument {
            family: self.family.clone(),
            metrics: self.metrics,
            glyph_count: self.glyphs.len(),
            markup,
        }
    }

    /// Parse SVG font markup.
    pub fn parse(markup: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(markup).context("SVG font is not well-formed XML")?;

        let font = doc
            .descendants()
            .find(|n| n.tag_name().name() == "font")
            .ok_or_else(|| anyhow!("SVG font has no <font> element"))?;
        let face = font
            .children()
            .find(|n| n.tag_name().name() == "font-face")
            .ok_or_else(|| anyhow!("SVG font has no <font-face> element"))?;

        let family = face
            .attribute("font-family")
            .or_else(|| font.attribute("id"))
            .ok_or_else(|| anyhow!("SVG font has no family name"))?
            .to_string();

        let units_per_em: u16 = number_attr(face, "units-per-em")?
            .unwrap_or(DEFAULT_UNITS_PER_EM as f64) as u16;
        let ascent = number_attr(face, "ascent")?.unwrap_or(units_per_em as f64);
        let descent = number_attr(face, "descent")?.unwrap_or(0.0);
        let metrics = FontMetrics {
            units_per_em,
            ascent: ascent.round() as u16,
            descent: descent.abs().round() as u16,
        };

        let default_advance = number_attr(font, "horiz-adv-x")?.unwrap_or(units_per_em as f64);

        let mut glyphs = Vec::new();
        for node in font.children().filter(|n| n.tag_name().name() == "glyph") {
            let name = node.attribute("glyph-name").unwrap_or_default().to_string();
            let unicode = node
                .attribute("unicode")
                .ok_or_else(|| anyhow!("glyph '{name}' has no unicode attribute"))?;
            let mut chars = unicode.chars();
            let codepoint = match (chars.next(), chars.next()) {
                (Some(c), None) => c as u32,
                _ => bail!("glyph '{name}' must map exactly one character, found '{unicode}'"),
            };
            let advance = number_attr(node, "horiz-adv-x")?.unwrap_or(default_advance);
            let path = match node.attribute("d") {
                Some(d) => BezPath::from_svg(d)
                    .map_err(|e| anyhow!("glyph '{name}' has invalid path data: {e:?}"))?,
                None => BezPath::new(),
            };

            glyphs.push(SvgGlyph {
                name,
                codepoint,
                advance: advance.round().max(0.0) as u16,
                path,
            });
        }

        Ok(Self {
            family,
            metrics,
            glyphs,
        })
    }
}

fn number_attr(node: roxmltree::Node, name: &str) -> Result<Option<f64>> {
    node.attribute(name)
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("attribute {name}=\"{v}\" is not a number"))
        })
        .transpose()
}

/// Absolute SVG path data with coordinates rounded to hundredths
fn path_data(path: &BezPath) -> String {
    let mut d = String::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) => {
                let _ = write!(d, "M{} {}", num(p.x), num(p.y));
            }
            PathEl::LineTo(p) => {
                let _ = write!(d, "L{} {}", num(p.x), num(p.y));
            }
            PathEl::QuadTo(p1, p2) => {
                let _ = write!(d, "Q{} {} {} {}", num(p1.x), num(p1.y), num(p2.x), num(p2.y));
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    num(p1.x),
                    num(p1.y),
                    num(p2.x),
                    num(p2.y),
                    num(p3.x),
                    num(p3.y)
                );
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}

fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Escape text for use inside XML/HTML attributes and content
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((500.0, 850.0));
        path.curve_to((600.0, 700.0), (800.0, 300.0), (1000.0, 0.0));
        path.close_path();
        path
    }

    fn sample_font() -> SvgFont {
        SvgFont {
            family: "Test Icons".to_string(),
            metrics: FontMetrics::default(),
            glyphs: vec![
                SvgGlyph {
                    name: "home".to_string(),
                    codepoint: 0xF101,
                    advance: 1000,
                    path: triangle(),
                },
                SvgGlyph {
                    name: "blank".to_string(),
                    codepoint: 0x41,
                    advance: 500,
                    path: BezPath::new(),
                },
            ],
        }
    }

    #[test]
    fn test_document_is_self_describing() {
        let doc = sample_font().to_document();
        assert_eq!(doc.glyph_count(), 2);
        assert!(doc.as_str().contains("units-per-em=\"1000\""));
        assert!(doc.as_str().contains("ascent=\"850\""));
        assert!(doc.as_str().contains("descent=\"-150\""));
        assert!(doc.as_str().contains("unicode=\"&#xF101;\""));
        assert!(doc.as_str().contains("glyph-name=\"home\""));

        let parsed = doc.parse().unwrap();
        assert_eq!(parsed.family, "Test Icons");
        assert_eq!(parsed.metrics, FontMetrics::default());
        assert_eq!(parsed.glyphs.len(), 2);
        assert_eq!(parsed.glyphs[0].codepoint, 0xF101);
        assert_eq!(parsed.glyphs[0].path.elements().len(), 4);
        assert_eq!(parsed.glyphs[1].advance, 500);
        assert!(parsed.glyphs[1].path.elements().is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_font() {
        assert!(SvgFont::parse("<svg xmlns=\"http://www.w3.org/2000/svg\"/>").is_err());
        assert!(SvgFont::parse("<svg").is_err());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-3.5), "-3.5");
    }

    #[test]
    fn test_metrics_validation() {
        assert_eq!(FontMetrics::new(2048, 0).unwrap().ascent, 2048);
        assert!(FontMetrics::new(1000, 1000).is_none());
        assert!(FontMetrics::new(0, 0).is_none());
        assert!(FontMetrics::new(8, 0).is_none());
        assert!(FontMetrics::new(40000, 150).is_none());
        assert_eq!(FontMetrics::new(16384, 150).unwrap().ascent, 16234);
    }
}
