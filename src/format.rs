//! Font container formats the generator can emit.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontFormat {
    Svg,
    Ttf,
    Eot,
    Woff,
    Woff2,
}

impl FontFormat {
    pub const ALL: [FontFormat; 5] = [
        FontFormat::Svg,
        FontFormat::Ttf,
        FontFormat::Eot,
        FontFormat::Woff,
        FontFormat::Woff2,
    ];

    /// Identifier used in configuration; also the file extension.
    pub fn id(self) -> &'static str {
        match self {
            FontFormat::Svg => "svg",
            FontFormat::Ttf => "ttf",
            FontFormat::Eot => "eot",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
        }
    }

    pub fn extension(self) -> &'static str {
        self.id()
    }

    /// Value of the `format()` hint in a `@font-face` `src` list.
    pub fn css_format(self) -> &'static str {
        match self {
            FontFormat::Svg => "svg",
            FontFormat::Ttf => "truetype",
            FontFormat::Eot => "embedded-opentype",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FontFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FontFormat::ALL
            .into_iter()
            .find(|format| format.id() == wanted)
            .ok_or_else(|| {
                Error::config(format!(
                    "unsupported font format '{s}' (expected one of: svg, ttf, eot, woff, woff2)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_ids() {
        assert_eq!("woff2".parse::<FontFormat>().unwrap(), FontFormat::Woff2);
        assert_eq!(" TTF ".parse::<FontFormat>().unwrap(), FontFormat::Ttf);
        assert!(matches!(
            "otf".parse::<FontFormat>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_css_format_hints() {
        assert_eq!(FontFormat::Ttf.css_format(), "truetype");
        assert_eq!(FontFormat::Eot.css_format(), "embedded-opentype");
        assert_eq!(FontFormat::Woff2.to_string(), "woff2");
    }
}
