//! Builds the consolidated SVG font from icon sources.

use kurbo::{Affine, Shape};
use log::{debug, warn};

use crate::codepoints::CodepointAssignment;
use crate::error::{Error, Result};
use crate::svg_font::{FontMetrics, SvgFont, SvgGlyph, VectorFontDocument};
use crate::svg_parser::{parse_icon, IconOutline, IconSource};

/// How icon outlines are placed inside their glyph box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlyphLayout {
    /// Every glyph advances by one em instead of its scaled width
    pub fixed_width: bool,
    /// Center the outline horizontally within its advance
    pub center_horizontally: bool,
}

/// Compose every icon into one SVG font document.
///
/// Each icon is scaled so its view height spans ascent plus descent, flipped
/// into y-up font space and tagged with its resolved codepoint. Any icon that
/// fails to parse aborts the whole composition.
pub fn compose(
    family: &str,
    icons: &[IconSource],
    codepoints: &CodepointAssignment,
    metrics: FontMetrics,
    layout: GlyphLayout,
) -> Result<VectorFontDocument> {
    let mut glyphs = Vec::with_capacity(icons.len());

    for icon in icons {
        let codepoint = *codepoints.get(&icon.name).ok_or_else(|| {
            Error::config(format!("no codepoint assigned to '{}'", icon.name))
        })?;

        let outline = parse_icon(icon)?;
        if outline.path.elements().is_empty() {
            warn!("Icon '{}' has no filled paths", icon.name);
        }

        let glyph = outline_to_glyph(&icon.name, codepoint, &outline, metrics, layout);
        debug!(
            "Composed glyph: {} (U+{:04X}, advance {})",
            glyph.name, glyph.codepoint, glyph.advance
        );
        glyphs.push(glyph);
    }

    let font = SvgFont {
        family: family.to_string(),
        metrics,
        glyphs,
    };
    Ok(font.to_document())
}

/// Normalize an icon outline into font units
fn outline_to_glyph(
    name: &str,
    codepoint: u32,
    outline: &IconOutline,
    metrics: FontMetrics,
    layout: GlyphLayout,
) -> SvgGlyph {
    let em_height = metrics.ascent as f64 + metrics.descent as f64;
    let scale = em_height / outline.height;

    // Scale and flip Y axis (SVG is Y-down, fonts are Y-up); the icon's top
    // edge lands on the ascent line.
    let transform = Affine::new([scale, 0.0, 0.0, -scale, 0.0, metrics.ascent as f64]);
    let mut path = transform * outline.path.clone();

    let advance = if layout.fixed_width {
        metrics.units_per_em
    } else {
        (outline.width * scale).round().clamp(0.0, u16::MAX as f64) as u16
    };

    if layout.center_horizontally && !path.elements().is_empty() {
        let bbox = path.bounding_box();
        let dx = (advance as f64 - bbox.width()) / 2.0 - bbox.x0;
        path.apply_affine(Affine::translate((dx, 0.0)));
    }

    SvgGlyph {
        name: name.to_string(),
        codepoint,
        advance,
        path,
    }
}
