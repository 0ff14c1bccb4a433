//! Generation options and their validation.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;

use crate::codepoints::DEFAULT_START_CODEPOINT;
use crate::composer::GlyphLayout;
use crate::error::{Error, Result};
use crate::format::FontFormat;
use crate::stylesheet::{check_identifier, is_identifier, FontUrls, StylesheetOptions};
use crate::svg_font::{FontMetrics, DEFAULT_DESCENT, DEFAULT_UNITS_PER_EM, UNITS_PER_EM_RANGE};
use crate::svg_parser::IconSource;

/// Everything a caller can ask of a generation run.
///
/// Unset options get their defaults in [`GenerationConfig::validate`].
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    /// Font family name; also the base name of every output file
    pub font_name: Option<String>,
    /// Directory the fonts are meant for. Only checked for presence here;
    /// writing is up to the caller.
    pub dest: Option<PathBuf>,
    /// Icons in codepoint and stylesheet order
    pub icons: Vec<IconSource>,
    /// Formats to build, in stylesheet `src` order
    pub formats: Vec<FontFormat>,
    /// Explicit codepoints by icon name
    pub codepoints: IndexMap<String, u32>,
    /// First codepoint for automatic assignment
    pub start_codepoint: Option<u32>,

    pub units_per_em: Option<u16>,
    /// Depth below the baseline in font units
    pub descent: Option<u16>,
    pub fixed_width: bool,
    pub center_horizontally: bool,

    /// Render a stylesheet (on unless set to `false`)
    pub css: Option<bool>,
    pub css_dest: Option<PathBuf>,
    pub css_template: Option<String>,
    /// Prefix for font URLs in the stylesheet
    pub css_fonts_url: Option<String>,
    pub class_prefix: Option<String>,
    pub base_selector: Option<String>,
    /// Font URL per format, replacing the derived default
    pub urls: FontUrls,

    /// Render an HTML preview
    pub html: bool,
    pub html_dest: Option<PathBuf>,
    pub html_template: Option<String>,
}

impl GenerationConfig {
    pub fn new(
        font_name: impl Into<String>,
        dest: impl Into<PathBuf>,
        icons: Vec<IconSource>,
        formats: Vec<FontFormat>,
    ) -> Self {
        Self {
            font_name: Some(font_name.into()),
            dest: Some(dest.into()),
            icons,
            formats,
            ..Default::default()
        }
    }

    /// Check every option and fix all defaults.
    pub fn validate(self) -> Result<ValidatedConfig> {
        let font_name = self
            .font_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::config("font name is required"))?;
        // Also the SVG font id and a file name
        if !is_identifier(&font_name) {
            return Err(Error::config(format!(
                "font name '{font_name}' may only contain ASCII letters, digits, '-' and '_'"
            )));
        }

        let dest = self
            .dest
            .filter(|dest| !dest.as_os_str().is_empty())
            .ok_or_else(|| Error::config("destination is required"))?;

        if self.icons.is_empty() {
            return Err(Error::config("no icons given"));
        }
        if self.formats.is_empty() {
            return Err(Error::config("no font formats requested"));
        }

        let mut seen_formats = HashSet::new();
        for format in &self.formats {
            if !seen_formats.insert(*format) {
                return Err(Error::config(format!("format '{format}' requested twice")));
            }
        }

        let mut codepoints = self.codepoints;
        let mut seen_names = HashSet::new();
        for icon in &self.icons {
            check_identifier(&icon.name)?;
            if !seen_names.insert(icon.name.as_str()) {
                return Err(Error::config(format!("duplicate icon name '{}'", icon.name)));
            }
            if let Some(codepoint) = icon.codepoint {
                match codepoints.get(&icon.name) {
                    Some(&mapped) if mapped != codepoint => {
                        return Err(Error::config(format!(
                            "icon '{}' has codepoint 0x{codepoint:X} but is mapped to 0x{mapped:X}",
                            icon.name
                        )));
                    }
                    _ => {
                        codepoints.insert(icon.name.clone(), codepoint);
                    }
                }
            }
        }

        let units_per_em = self.units_per_em.unwrap_or(DEFAULT_UNITS_PER_EM);
        let descent = self.descent.unwrap_or(DEFAULT_DESCENT);
        if !UNITS_PER_EM_RANGE.contains(&units_per_em) {
            return Err(Error::config(format!(
                "units per em {units_per_em} must be between {} and {}",
                UNITS_PER_EM_RANGE.start(),
                UNITS_PER_EM_RANGE.end()
            )));
        }
        let metrics = FontMetrics::new(units_per_em, descent).ok_or_else(|| {
            Error::config(format!(
                "descent {descent} must be smaller than units per em {units_per_em}"
            ))
        })?;

        let css_path = self
            .css_dest
            .unwrap_or_else(|| dest.join(format!("{font_name}.css")));
        let html_path = self
            .html_dest
            .unwrap_or_else(|| dest.join(format!("{font_name}.html")));

        // Font URLs default to paths relative to where the stylesheet lives.
        let css_fonts_url = self
            .css_fonts_url
            .unwrap_or_else(|| relative_url(parent_dir(&css_path), &dest));
        let html_fonts_url = relative_url(parent_dir(&html_path), &dest);

        Ok(ValidatedConfig {
            font_name,
            dest,
            icons: self.icons,
            formats: self.formats,
            codepoints,
            start_codepoint: self.start_codepoint.unwrap_or(DEFAULT_START_CODEPOINT),
            metrics,
            layout: GlyphLayout {
                fixed_width: self.fixed_width,
                center_horizontally: self.center_horizontally,
            },
            css: self.css.unwrap_or(true),
            css_path,
            css_fonts_url,
            stylesheet: StylesheetOptions {
                class_prefix: self
                    .class_prefix
                    .unwrap_or_else(|| StylesheetOptions::default().class_prefix),
                base_selector: self
                    .base_selector
                    .unwrap_or_else(|| StylesheetOptions::default().base_selector),
                template: self.css_template,
            },
            urls: self.urls,
            html: self.html,
            html_path,
            html_fonts_url,
            html_template: self.html_template,
        })
    }
}

/// A [`GenerationConfig`] with every default applied.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub font_name: String,
    pub dest: PathBuf,
    pub icons: Vec<IconSource>,
    pub formats: Vec<FontFormat>,
    pub codepoints: IndexMap<String, u32>,
    pub start_codepoint: u32,
    pub metrics: FontMetrics,
    pub layout: GlyphLayout,
    pub css: bool,
    pub css_path: PathBuf,
    pub css_fonts_url: String,
    pub stylesheet: StylesheetOptions,
    pub urls: FontUrls,
    pub html: bool,
    pub html_path: PathBuf,
    pub html_fonts_url: String,
    pub html_template: Option<String>,
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new(""))
}

/// URL path leading from directory `from` to directory `to`.
///
/// Both are compared lexically; an empty result means the same directory.
fn relative_url(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = normalized(from);
    let to: Vec<Component> = normalized(to);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat("..".to_string()).take(from.len() - common));
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join("/"))
    }
}

fn normalized(path: &Path) -> Vec<Component<'_>> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icons() -> Vec<IconSource> {
        vec![
            IconSource::new("home", "<svg/>"),
            IconSource::new("close", "<svg/>"),
        ]
    }

    fn config() -> GenerationConfig {
        GenerationConfig::new("icons", "out", icons(), vec![FontFormat::Woff2])
    }

    #[test]
    fn test_defaults_are_fixed() {
        let validated = config().validate().unwrap();
        assert_eq!(validated.start_codepoint, DEFAULT_START_CODEPOINT);
        assert_eq!(validated.metrics, FontMetrics::default());
        assert!(validated.css);
        assert!(!validated.html);
        assert_eq!(validated.css_path, PathBuf::from("out/icons.css"));
        assert_eq!(validated.css_fonts_url, "");
        assert_eq!(validated.stylesheet.class_prefix, "icon-");
        assert_eq!(validated.stylesheet.base_selector, ".icon");
    }

    #[test]
    fn test_missing_required_options() {
        let mut no_icons = config();
        no_icons.icons.clear();
        assert!(matches!(no_icons.validate(), Err(Error::Configuration(_))));

        let mut no_formats = config();
        no_formats.formats.clear();
        assert!(matches!(no_formats.validate(), Err(Error::Configuration(_))));

        let mut no_dest = config();
        no_dest.dest = None;
        assert!(matches!(no_dest.validate(), Err(Error::Configuration(_))));

        let mut no_name = config();
        no_name.font_name = Some("  ".to_string());
        assert!(matches!(no_name.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_font_name_must_be_identifier() {
        for bad in ["My Icons", "icons/v2", "a\\b", "ico\"ns", "ïcons"] {
            let mut named = config();
            named.font_name = Some(bad.to_string());
            assert!(
                matches!(named.validate(), Err(Error::Configuration(_))),
                "{bad}"
            );
        }

        let mut named = config();
        named.font_name = Some(" my-icons_2 ".to_string());
        assert_eq!(named.validate().unwrap().font_name, "my-icons_2");
    }

    #[test]
    fn test_duplicate_and_unsafe_names() {
        let mut duplicate = config();
        duplicate.icons.push(IconSource::new("home", "<svg/>"));
        assert!(duplicate.validate().is_err());

        let mut unsafe_name = config();
        unsafe_name.icons.push(IconSource::new("a b", "<svg/>"));
        assert!(unsafe_name.validate().is_err());

        let mut twice = config();
        twice.formats.push(FontFormat::Woff2);
        assert!(twice.validate().is_err());
    }

    #[test]
    fn test_icon_codepoints_merge_into_map() {
        let mut merged = config();
        merged.icons[1] = IconSource::new("close", "<svg/>").with_codepoint(0xE001);
        let validated = merged.validate().unwrap();
        assert_eq!(validated.codepoints.get("close"), Some(&0xE001));

        let mut conflicting = config();
        conflicting.icons[1] = IconSource::new("close", "<svg/>").with_codepoint(0xE001);
        conflicting.codepoints.insert("close".to_string(), 0xE002);
        assert!(conflicting.validate().is_err());
    }

    #[test]
    fn test_metrics_must_fit() {
        let mut bad = config();
        bad.units_per_em = Some(512);
        bad.descent = Some(512);
        assert!(bad.validate().is_err());

        let mut huge = config();
        huge.units_per_em = Some(40000);
        assert!(matches!(huge.validate(), Err(Error::Configuration(_))));

        let mut tiny = config();
        tiny.units_per_em = Some(8);
        tiny.descent = Some(2);
        assert!(matches!(tiny.validate(), Err(Error::Configuration(_))));

        let mut largest = config();
        largest.units_per_em = Some(16384);
        assert_eq!(largest.validate().unwrap().metrics.ascent, 16384 - 150);
    }

    #[test]
    fn test_fonts_url_relative_to_stylesheet() {
        let mut separate = config();
        separate.dest = Some(PathBuf::from("dist/fonts"));
        separate.css_dest = Some(PathBuf::from("dist/css/icons.css"));
        let validated = separate.validate().unwrap();
        assert_eq!(validated.css_fonts_url, "../fonts/");
        assert_eq!(validated.html_fonts_url, "");
    }

    #[test]
    fn test_relative_url() {
        assert_eq!(relative_url(Path::new("a/b"), Path::new("a/b")), "");
        assert_eq!(relative_url(Path::new("a"), Path::new("a/b")), "b/");
        assert_eq!(relative_url(Path::new("./a/c"), Path::new("a/b")), "../b/");
    }
}
