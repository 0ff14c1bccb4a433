//! Turn a set of SVG icons into an icon font.
//!
//! A generation run assigns a codepoint to every icon, merges the outlines
//! into an SVG font, derives the requested binary formats from it and renders
//! a stylesheet mapping one CSS class per icon to its codepoint. Everything
//! stays in memory; [`output::write_outputs`] stores a result on disk.
//!
//! ```no_run
//! use svg2webfont::{generate, FontFormat, GenerationConfig, IconSource};
//!
//! let icons = vec![IconSource::new("home", std::fs::read_to_string("home.svg")?)];
//! let config = GenerationConfig::new("icons", "dist", icons, vec![FontFormat::Woff2]);
//! let result = generate(config)?;
//! svg2webfont::output::write_outputs(&result)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod codepoints;
pub mod composer;
pub mod config;
pub mod error;
pub mod format;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod sources;
pub mod stylesheet;
pub mod svg_font;
pub mod svg_parser;
pub mod transcode;

pub use codepoints::CodepointAssignment;
pub use config::GenerationConfig;
pub use error::{Error, Result};
pub use format::FontFormat;
pub use pipeline::{generate, generate_with, GenerationResult};
pub use stylesheet::{FontUrls, Stylesheet};
pub use svg_font::VectorFontDocument;
pub use svg_parser::IconSource;
pub use transcode::{FontArtifactSet, Transcoder, TranscoderSet};
