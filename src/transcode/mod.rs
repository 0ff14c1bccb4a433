//! Derives binary font formats from the SVG font document.
//!
//! Each format is produced by a [`Transcoder`] looked up in a
//! [`TranscoderSet`]. Transcoders only read the shared document, so the set
//! runs them in parallel and gathers the results in request order.

mod eot;
mod sfnt;
mod ttf;
mod woff;
mod woff2;

use indexmap::IndexMap;
use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::format::FontFormat;
use crate::svg_font::VectorFontDocument;

pub use eot::EotTranscoder;
pub use ttf::{build_ttf, TtfTranscoder};
pub use woff::WoffTranscoder;
pub use woff2::Woff2Transcoder;

/// Font payloads keyed by format, in the order the formats were requested.
pub type FontArtifactSet = IndexMap<FontFormat, Vec<u8>>;

/// Turns an SVG font document into one font format.
pub trait Transcoder: Send + Sync {
    fn transcode(&self, doc: &VectorFontDocument) -> anyhow::Result<Vec<u8>>;
}

impl<F> Transcoder for F
where
    F: Fn(&VectorFontDocument) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn transcode(&self, doc: &VectorFontDocument) -> anyhow::Result<Vec<u8>> {
        self(doc)
    }
}

/// The SVG format is the document itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgTranscoder;

impl Transcoder for SvgTranscoder {
    fn transcode(&self, doc: &VectorFontDocument) -> anyhow::Result<Vec<u8>> {
        Ok(doc.as_bytes().to_vec())
    }
}

/// Table of transcoders by format.
pub struct TranscoderSet {
    table: IndexMap<FontFormat, Box<dyn Transcoder>>,
}

impl TranscoderSet {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            table: IndexMap::new(),
        }
    }

    /// Every supported format with its built-in transcoder.
    pub fn standard() -> Self {
        Self::new()
            .with(FontFormat::Svg, SvgTranscoder)
            .with(FontFormat::Ttf, TtfTranscoder)
            .with(FontFormat::Eot, EotTranscoder)
            .with(FontFormat::Woff, WoffTranscoder)
            .with(FontFormat::Woff2, Woff2Transcoder::default())
    }

    /// Register (or replace) the transcoder for `format`.
    pub fn with(mut self, format: FontFormat, transcoder: impl Transcoder + 'static) -> Self {
        self.table.insert(format, Box::new(transcoder));
        self
    }

    pub fn supports(&self, format: FontFormat) -> bool {
        self.table.contains_key(&format)
    }

    pub fn formats(&self) -> impl Iterator<Item = FontFormat> + '_ {
        self.table.keys().copied()
    }

    /// Produce one artifact per requested format.
    ///
    /// Any failure fails the whole call; when several formats fail, the one
    /// requested first is reported.
    pub fn transcode_all(
        &self,
        doc: &VectorFontDocument,
        formats: &[FontFormat],
    ) -> Result<FontArtifactSet> {
        let outputs: Vec<(FontFormat, Result<Vec<u8>>)> = formats
            .par_iter()
            .map(|&format| (format, self.transcode(doc, format)))
            .collect();

        let mut artifacts = FontArtifactSet::with_capacity(outputs.len());
        for (format, output) in outputs {
            let data = output?;
            debug!("Built {format}: {} bytes", data.len());
            artifacts.insert(format, data);
        }
        Ok(artifacts)
    }

    fn transcode(&self, doc: &VectorFontDocument, format: FontFormat) -> Result<Vec<u8>> {
        let transcoder = self.table.get(&format).ok_or_else(|| Error::Transcoding {
            format,
            reason: "no transcoder registered".to_string(),
        })?;

        let data = transcoder
            .transcode(doc)
            .map_err(|e| Error::Transcoding {
                format,
                reason: format!("{e:#}"),
            })?;

        if data.is_empty() {
            return Err(Error::Transcoding {
                format,
                reason: "transcoder produced no data".to_string(),
            });
        }
        Ok(data)
    }
}

impl Default for TranscoderSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg_font::{FontMetrics, SvgFont, SvgGlyph};
    use kurbo::BezPath;

    pub(crate) fn sample_document() -> VectorFontDocument {
        let mut square = BezPath::new();
        square.move_to((100.0, -100.0));
        square.line_to((100.0, 800.0));
        square.curve_to((400.0, 900.0), (600.0, 900.0), (900.0, 800.0));
        square.line_to((900.0, -100.0));
        square.close_path();

        SvgFont {
            family: "Sample".to_string(),
            metrics: FontMetrics::default(),
            glyphs: vec![
                SvgGlyph {
                    name: "home".to_string(),
                    codepoint: 0xF101,
                    advance: 1000,
                    path: square.clone(),
                },
                SvgGlyph {
                    name: "close".to_string(),
                    codepoint: 0xF102,
                    advance: 1000,
                    path: square,
                },
            ],
        }
        .to_document()
    }

    #[test]
    fn test_standard_set_covers_all_formats() {
        let set = TranscoderSet::standard();
        for format in FontFormat::ALL {
            assert!(set.supports(format));
        }
        assert_eq!(set.formats().collect::<Vec<_>>(), FontFormat::ALL);
        assert!(!TranscoderSet::new().supports(FontFormat::Svg));
    }

    #[test]
    fn test_one_artifact_per_requested_format() {
        let doc = sample_document();
        let requested = [FontFormat::Woff2, FontFormat::Ttf, FontFormat::Woff];
        let artifacts = TranscoderSet::standard()
            .transcode_all(&doc, &requested)
            .unwrap();

        assert_eq!(artifacts.keys().copied().collect::<Vec<_>>(), requested);
        assert!(artifacts.values().all(|data| !data.is_empty()));
    }

    #[test]
    fn test_svg_alone() {
        let doc = sample_document();
        let artifacts = TranscoderSet::standard()
            .transcode_all(&doc, &[FontFormat::Svg])
            .unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[&FontFormat::Svg], doc.as_bytes());
    }

    #[test]
    fn test_failure_is_tagged_and_fatal() {
        let set = TranscoderSet::standard().with(
            FontFormat::Woff,
            |_: &VectorFontDocument| -> anyhow::Result<Vec<u8>> {
                anyhow::bail!("compressor exploded")
            },
        );
        let err = set
            .transcode_all(&sample_document(), &[FontFormat::Ttf, FontFormat::Woff])
            .unwrap_err();
        match err {
            Error::Transcoding { format, reason } => {
                assert_eq!(format, FontFormat::Woff);
                assert!(reason.contains("compressor exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_transcoder() {
        let set = TranscoderSet::new().with(FontFormat::Svg, SvgTranscoder);
        assert!(!set.supports(FontFormat::Ttf));
        assert!(set
            .transcode_all(&sample_document(), &[FontFormat::Ttf])
            .is_err());
    }
}
