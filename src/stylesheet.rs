//! CSS generation for the icon font.
//!
//! A [`Stylesheet`] is a plain value holding the codepoints and naming
//! options. Rendering it again with other font URLs only changes the URLs;
//! no font work is repeated.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::codepoints::CodepointAssignment;
use crate::error::{Error, Result};
use crate::format::FontFormat;

pub const DEFAULT_CLASS_PREFIX: &str = "icon-";
pub const DEFAULT_BASE_SELECTOR: &str = ".icon";

/// Font URL per format.
pub type FontUrls = IndexMap<FontFormat, String>;

/// Naming and template options for the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetOptions {
    /// Prepended to each icon name to form its class
    pub class_prefix: String,
    /// Selector that receives the font-family rule
    pub base_selector: String,
    /// Replaces the built-in layout; see [`Stylesheet::render`]
    pub template: Option<String>,
}

impl Default for StylesheetOptions {
    fn default() -> Self {
        Self {
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            base_selector: DEFAULT_BASE_SELECTOR.to_string(),
            template: None,
        }
    }
}

/// Everything needed to render the stylesheet.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    font_name: String,
    formats: Vec<FontFormat>,
    codepoints: CodepointAssignment,
    default_urls: FontUrls,
    options: StylesheetOptions,
}

impl Stylesheet {
    /// Fails if any icon name is not a safe CSS class fragment.
    pub fn new(
        font_name: impl Into<String>,
        formats: Vec<FontFormat>,
        codepoints: CodepointAssignment,
        default_urls: FontUrls,
        options: StylesheetOptions,
    ) -> Result<Self> {
        for name in codepoints.keys() {
            check_identifier(name)?;
        }
        Ok(Self {
            font_name: font_name.into(),
            formats,
            codepoints,
            default_urls,
            options,
        })
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub fn formats(&self) -> &[FontFormat] {
        &self.formats
    }

    pub fn codepoints(&self) -> &CodepointAssignment {
        &self.codepoints
    }

    pub fn options(&self) -> &StylesheetOptions {
        &self.options
    }

    /// Default URLs with `overrides` applied; unrequested formats are ignored.
    pub fn urls(&self, overrides: &FontUrls) -> FontUrls {
        self.formats
            .iter()
            .map(|format| {
                let url = overrides
                    .get(format)
                    .or_else(|| self.default_urls.get(format))
                    .cloned()
                    .unwrap_or_default();
                (*format, url)
            })
            .collect()
    }

    /// Render the stylesheet.
    ///
    /// A custom template may use `{{fontName}}`, `{{src}}`,
    /// `{{baseSelector}}`, `{{classPrefix}}` and `{{icons}}`.
    pub fn render(&self, overrides: &FontUrls) -> String {
        let urls = self.urls(overrides);
        let src = self.src(&urls);
        let icons = self.icon_rules();

        if let Some(template) = &self.options.template {
            return fill_template(
                template,
                &[
                    ("fontName", self.font_name.as_str()),
                    ("src", src.as_str()),
                    ("baseSelector", self.options.base_selector.as_str()),
                    ("classPrefix", self.options.class_prefix.as_str()),
                    ("icons", icons.as_str()),
                ],
            );
        }

        let family = css_string(&self.font_name);
        let mut css = String::new();
        css.push_str("@font-face {\n");
        let _ = writeln!(css, "\tfont-family: {family};");
        if let Some(eot) = urls.get(&FontFormat::Eot) {
            let _ = writeln!(css, "\tsrc: url({});", css_string(eot));
        }
        let _ = writeln!(css, "\tsrc: {src};");
        css.push_str("\tfont-weight: normal;\n\tfont-style: normal;\n}\n\n");

        let _ = writeln!(css, "{}:before {{", self.options.base_selector);
        let _ = writeln!(css, "\tfont-family: {family} !important;");
        css.push_str("\tfont-style: normal;\n");
        css.push_str("\tfont-weight: normal !important;\n");
        css.push_str("\tfont-variant: normal;\n");
        css.push_str("\ttext-transform: none;\n");
        css.push_str("\tline-height: 1;\n");
        css.push_str("\tvertical-align: top;\n");
        css.push_str("\t-webkit-font-smoothing: antialiased;\n");
        css.push_str("\t-moz-osx-font-smoothing: grayscale;\n}\n\n");

        css.push_str(&icons);
        css
    }

    /// The `src` list, in request order
    fn src(&self, urls: &FontUrls) -> String {
        urls.iter()
            .map(|(format, url)| {
                let url = match format {
                    FontFormat::Eot => format!("{url}?#iefix"),
                    FontFormat::Svg => format!("{url}#{}", self.font_name),
                    _ => url.clone(),
                };
                format!("url({}) format(\"{}\")", css_string(&url), format.css_format())
            })
            .collect::<Vec<_>>()
            .join(",\n\t\t")
    }

    fn icon_rules(&self) -> String {
        let mut rules = String::new();
        for (name, codepoint) in &self.codepoints {
            let _ = writeln!(
                rules,
                ".{}{}:before {{\n\tcontent: \"\\{:x}\";\n}}",
                self.options.class_prefix, name, codepoint
            );
        }
        rules
    }
}

/// `<prefix>/<font name>.<ext>` for each format
pub fn default_urls(font_name: &str, formats: &[FontFormat], prefix: &str) -> FontUrls {
    let prefix = if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    };
    formats
        .iter()
        .map(|format| (*format, format!("{prefix}{font_name}.{}", format.extension())))
        .collect()
}

/// Non-empty and made of ASCII letters, digits, `-` and `_` only
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Icon names may only contain ASCII letters, digits, `-` and `_`.
pub fn check_identifier(name: &str) -> Result<()> {
    if !is_identifier(name) {
        return Err(Error::config(format!(
            "icon name '{name}' is not usable as a CSS class \
             (allowed: ASCII letters, digits, '-' and '_')"
        )));
    }
    Ok(())
}

/// Double-quoted CSS string
fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Replace `{{key}}` placeholders in a single pass; unknown keys are kept.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stylesheet(formats: Vec<FontFormat>) -> Stylesheet {
        let codepoints: CodepointAssignment =
            [("home".to_string(), 0xF101), ("close".to_string(), 0xF102)]
                .into_iter()
                .collect();
        let urls = default_urls("icons", &formats, "");
        Stylesheet::new("icons", formats, codepoints, urls, StylesheetOptions::default()).unwrap()
    }

    #[test]
    fn test_icon_rules_escape_codepoints() {
        let css = stylesheet(vec![FontFormat::Woff2]).render(&FontUrls::new());
        assert!(css.contains(".icon-home:before {\n\tcontent: \"\\f101\";\n}"));
        assert!(css.contains(".icon-close:before {\n\tcontent: \"\\f102\";\n}"));
        assert!(css.find("icon-home").unwrap() < css.find("icon-close").unwrap());
    }

    #[test]
    fn test_src_follows_request_order() {
        let css = stylesheet(vec![FontFormat::Woff2, FontFormat::Eot, FontFormat::Svg])
            .render(&FontUrls::new());
        let woff2 = css.find("url(\"icons.woff2\") format(\"woff2\")").unwrap();
        let eot = css
            .find("url(\"icons.eot?#iefix\") format(\"embedded-opentype\")")
            .unwrap();
        let svg = css.find("url(\"icons.svg#icons\") format(\"svg\")").unwrap();
        assert!(woff2 < eot && eot < svg);
        assert!(css.contains("src: url(\"icons.eot\");"));
    }

    #[test]
    fn test_rerender_changes_only_urls() {
        let sheet = stylesheet(vec![FontFormat::Ttf, FontFormat::Woff]);
        let first = sheet.render(&FontUrls::new());

        let overrides: FontUrls = [
            (FontFormat::Ttf, "https://cdn.example/AAA.ttf".to_string()),
            (FontFormat::Svg, "ignored.svg".to_string()),
        ]
        .into_iter()
        .collect();
        let second = sheet.render(&overrides);

        assert!(second.contains("https://cdn.example/AAA.ttf"));
        assert!(second.contains("icons.woff"));
        assert!(!second.contains("ignored.svg"));
        assert_eq!(
            second.replace("https://cdn.example/AAA.ttf", "icons.ttf"),
            first
        );
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let codepoints: CodepointAssignment =
            [("bad name".to_string(), 0xF101)].into_iter().collect();
        let err = Stylesheet::new(
            "icons",
            vec![FontFormat::Ttf],
            codepoints,
            FontUrls::new(),
            StylesheetOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        assert!(check_identifier("arrow-left_2").is_ok());
        assert!(check_identifier("").is_err());
        assert!(check_identifier("a.b").is_err());
        assert!(check_identifier("café").is_err());
    }

    #[test]
    fn test_custom_template() {
        let mut sheet = stylesheet(vec![FontFormat::Woff]);
        sheet.options.template =
            Some("/* {{fontName}} */ {{src}}\n{{icons}}{{unknown}}".to_string());
        let css = sheet.render(&FontUrls::new());
        assert!(css.starts_with(
            "/* icons */ url(\"icons.woff\") format(\"woff\")\n.icon-home:before"
        ));
        assert!(css.ends_with("{{unknown}}"));
    }

    #[test]
    fn test_default_urls_prefix() {
        let urls = default_urls("icons", &[FontFormat::Ttf], "../fonts");
        assert_eq!(urls[&FontFormat::Ttf], "../fonts/icons.ttf");
        let urls = default_urls("icons", &[FontFormat::Ttf], "fonts/");
        assert_eq!(urls[&FontFormat::Ttf], "fonts/icons.ttf");
    }

    #[test]
    fn test_fill_template() {
        assert_eq!(
            fill_template("a {{ x }} b {{y}} {{", &[("x", "1"), ("y", "{{x}}")]),
            "a 1 b {{x}} {{"
        );
    }
}
