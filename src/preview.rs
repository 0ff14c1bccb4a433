use std::fmt::Write as _;

use crate::stylesheet::{fill_template, FontUrls, Stylesheet};
use crate::svg_font::escape_xml;

/// Generate an HTML preview page for the icon font.
///
/// The page embeds the stylesheet rendered with `urls` and shows one card per
/// icon. A custom template may use `{{fontName}}`, `{{styles}}`, `{{icons}}`
/// and `{{iconCount}}`.
pub fn render_preview(stylesheet: &Stylesheet, urls: &FontUrls, template: Option<&str>) -> String {
    let styles = stylesheet.render(urls);
    let icons_html = icon_cards(stylesheet);
    let icon_count = stylesheet.codepoints().len().to_string();
    let font_name = escape_xml(stylesheet.font_name());

    match template {
        Some(template) => fill_template(
            template,
            &[
                ("fontName", font_name.as_str()),
                ("styles", styles.as_str()),
                ("icons", icons_html.as_str()),
                ("iconCount", icon_count.as_str()),
            ],
        ),
        None => default_page(&font_name, &styles, &icons_html, &icon_count),
    }
}

fn icon_cards(stylesheet: &Stylesheet) -> String {
    let prefix = &stylesheet.options().class_prefix;
    let mut icons_html = String::new();

    for (name, codepoint) in stylesheet.codepoints() {
        let _ = writeln!(
            icons_html,
            r#"<div class="icon-card" data-name="{name}" data-codepoint="{codepoint:04X}"><div class="preview-glyph {prefix}{name}"></div><div class="icon-name">{name}</div><div class="icon-code">U+{codepoint:04X}</div></div>"#,
            prefix = escape_xml(prefix),
        );
    }

    icons_html
}

fn default_page(font_name: &str, styles: &str, icons_html: &str, icon_count: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{font_name}</title>
<style>
{styles}
</style>
<style>
body {{ margin: 0; font: 14px/1.4 system-ui, sans-serif; background: #101214; color: #d8dadc; }}
header {{ display: flex; align-items: baseline; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid #24282c; }}
header h1 {{ margin: 0; font-size: 1.25rem; }}
header .count {{ color: #7c8288; }}
header input {{ margin-left: auto; padding: 0.4rem 0.8rem; border: 1px solid #2e3338; border-radius: 6px; background: #181b1e; color: inherit; }}
main {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(128px, 1fr)); gap: 0.75rem; padding: 2rem; }}
.icon-card {{ padding: 1rem 0.5rem; border: 1px solid #24282c; border-radius: 8px; text-align: center; }}
.icon-card[hidden] {{ display: none; }}
.preview-glyph {{ font-size: 32px; line-height: 1; margin-bottom: 0.5rem; }}
.preview-glyph:before {{ font-family: "{font_name}"; }}
.icon-name {{ font-size: 0.75rem; overflow-wrap: anywhere; }}
.icon-code {{ font: 0.7rem monospace; color: #7c8288; }}
</style>
</head>
<body>
<header>
<h1>{font_name}</h1>
<span class="count">{icon_count} icons</span>
<input type="search" id="filter" placeholder="Filter by name or codepoint">
</header>
<main>
{icons_html}
</main>
<script>
document.getElementById('filter').addEventListener('input', function () {{
    var query = this.value.trim().toLowerCase();
    document.querySelectorAll('.icon-card').forEach(function (card) {{
        var text = (card.dataset.name + ' ' + card.dataset.codepoint).toLowerCase();
        card.hidden = query !== '' && text.indexOf(query) === -1;
    }});
}});
</script>
</body>
</html>
"##
    )
}
