//! Runs a generation end to end.

use std::path::{Path, PathBuf};

use log::info;

use crate::codepoints::{self, CodepointAssignment};
use crate::composer;
use crate::config::{GenerationConfig, ValidatedConfig};
use crate::error::{Error, Result};
use crate::format::FontFormat;
use crate::preview::render_preview;
use crate::stylesheet::{default_urls, FontUrls, Stylesheet};
use crate::svg_font::VectorFontDocument;
use crate::transcode::{FontArtifactSet, TranscoderSet};

/// Everything one generation produced, held in memory.
#[derive(Debug)]
pub struct GenerationResult {
    /// Font payload per requested format
    pub artifacts: FontArtifactSet,
    /// Codepoint per icon, in icon order
    pub codepoints: CodepointAssignment,
    /// The composed SVG font
    pub document: VectorFontDocument,
    /// Stylesheet rendered with the configured URLs, if enabled
    pub css: Option<String>,
    /// HTML preview, if enabled
    pub html: Option<String>,
    stylesheet: Stylesheet,
    outputs: OutputPaths,
}

/// Where the caller is expected to store each output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dest: PathBuf,
    pub css: PathBuf,
    pub html: PathBuf,
}

impl OutputPaths {
    pub fn font(&self, font_name: &str, format: FontFormat) -> PathBuf {
        self.dest.join(format!("{font_name}.{}", format.extension()))
    }
}

impl GenerationResult {
    /// Render the stylesheet again with other font URLs.
    ///
    /// Formats missing from `overrides` keep their configured URL.
    pub fn render_stylesheet(&self, overrides: &FontUrls) -> String {
        self.stylesheet.render(overrides)
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn font_name(&self) -> &str {
        self.stylesheet.font_name()
    }

    pub fn outputs(&self) -> &OutputPaths {
        &self.outputs
    }

    pub fn font_path(&self, format: FontFormat) -> PathBuf {
        self.outputs.font(self.font_name(), format)
    }

    pub fn dest(&self) -> &Path {
        &self.outputs.dest
    }
}

/// Generate an icon font with the built-in transcoders.
pub fn generate(config: GenerationConfig) -> Result<GenerationResult> {
    generate_with(config, &TranscoderSet::standard())
}

/// Generate an icon font with a custom transcoder table.
///
/// The configuration is validated before any icon is parsed. After that,
/// codepoints are assigned, the SVG font is composed, every format is
/// transcoded, and the stylesheet and preview are rendered. The first error
/// aborts the run.
pub fn generate_with(
    config: GenerationConfig,
    transcoders: &TranscoderSet,
) -> Result<GenerationResult> {
    let config = config.validate()?;
    if let Some(format) = config.formats.iter().find(|f| !transcoders.supports(**f)) {
        return Err(Error::config(format!("no transcoder for format '{format}'")));
    }
    run(config, transcoders)
}

fn run(config: ValidatedConfig, transcoders: &TranscoderSet) -> Result<GenerationResult> {
    let codepoints = codepoints::assign(
        config.icons.iter().map(|icon| icon.name.as_str()),
        &config.codepoints,
        config.start_codepoint,
    )?;

    let document = composer::compose(
        &config.font_name,
        &config.icons,
        &codepoints,
        config.metrics,
        config.layout,
    )?;

    let artifacts = transcoders.transcode_all(&document, &config.formats)?;

    let urls = configured_urls(&config, &config.css_fonts_url);

    let stylesheet = Stylesheet::new(
        config.font_name.clone(),
        config.formats.clone(),
        codepoints.clone(),
        urls,
        config.stylesheet.clone(),
    )?;

    let css = config.css.then(|| stylesheet.render(&FontUrls::new()));

    let html = config.html.then(|| {
        let urls = configured_urls(&config, &config.html_fonts_url);
        render_preview(&stylesheet, &urls, config.html_template.as_deref())
    });

    info!(
        "Generated {} with {} icons: {}",
        config.font_name,
        codepoints.len(),
        config
            .formats
            .iter()
            .map(|f| f.id())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(GenerationResult {
        artifacts,
        codepoints,
        document,
        css,
        html,
        stylesheet,
        outputs: OutputPaths {
            dest: config.dest,
            css: config.css_path,
            html: config.html_path,
        },
    })
}

/// Derived font URLs under `prefix`, with explicitly configured URLs on top
fn configured_urls(config: &ValidatedConfig, prefix: &str) -> FontUrls {
    let mut urls = default_urls(&config.font_name, &config.formats, prefix);
    for (format, url) in &config.urls {
        if let Some(slot) = urls.get_mut(format) {
            *slot = url.clone();
        }
    }
    urls
}
