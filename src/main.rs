use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;

use svg2webfont::manifest::write_manifest;
use svg2webfont::output::write_outputs;
use svg2webfont::sources::{collect_icons, IconNaming};
use svg2webfont::{generate, FontFormat, GenerationConfig};

#[derive(Parser)]
#[command(name = "svg2webfont")]
#[command(about = "Convert SVG icons to an icon font with a matching stylesheet")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the icon font, stylesheet and optional preview
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// SVG files or directories containing SVG files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for the fonts
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Font family name, also the base name of every output file
    #[arg(short, long, default_value = "iconfont")]
    name: String,

    /// Font formats to generate, in stylesheet order
    #[arg(short, long, value_delimiter = ',', default_value = "eot,woff,woff2")]
    types: Vec<FontFormat>,

    /// First codepoint for automatic assignment (hex, e.g. F101)
    #[arg(long, value_parser = parse_codepoint)]
    start_codepoint: Option<u32>,

    /// JSON object mapping icon names to codepoints
    #[arg(long)]
    codepoints: Option<PathBuf>,

    /// Also write an HTML preview
    #[arg(long)]
    html: bool,

    /// Do not write a stylesheet
    #[arg(long)]
    no_css: bool,

    /// Stylesheet path (default: <output>/<name>.css)
    #[arg(long)]
    css_dest: Option<PathBuf>,

    /// Preview path (default: <output>/<name>.html)
    #[arg(long)]
    html_dest: Option<PathBuf>,

    /// URL prefix for fonts in the stylesheet
    #[arg(long)]
    css_fonts_url: Option<String>,

    #[arg(long)]
    class_prefix: Option<String>,

    #[arg(long)]
    base_selector: Option<String>,

    /// Custom stylesheet template
    #[arg(long)]
    css_template: Option<PathBuf>,

    /// Custom preview template
    #[arg(long)]
    html_template: Option<PathBuf>,

    /// Give every glyph an advance of one em
    #[arg(long)]
    fixed_width: bool,

    /// Center each glyph within its advance
    #[arg(long)]
    center_horizontally: bool,

    #[arg(long)]
    units_per_em: Option<u16>,

    /// Depth below the baseline in font units
    #[arg(long)]
    descent: Option<u16>,

    /// Write a JSON manifest of the codepoints to this path
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Convert file names to snake_case icon names
    #[arg(long)]
    snake_case: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Generate(args) => generate_font(args),
    }
}

fn generate_font(args: GenerateArgs) -> Result<()> {
    let naming = if args.snake_case {
        IconNaming::SnakeCase
    } else {
        IconNaming::FileStem
    };
    let icons = collect_icons(&args.inputs, naming)?;
    if icons.is_empty() {
        bail!("No SVG files found in the given inputs");
    }
    info!("Found {} icons", icons.len());

    let mut config = GenerationConfig::new(&args.name, &args.output, icons, args.types);
    if let Some(path) = &args.codepoints {
        config.codepoints = read_codepoints(path)?;
    }
    config.start_codepoint = args.start_codepoint;
    config.units_per_em = args.units_per_em;
    config.descent = args.descent;
    config.fixed_width = args.fixed_width;
    config.center_horizontally = args.center_horizontally;
    config.css = Some(!args.no_css);
    config.css_dest = args.css_dest;
    config.css_fonts_url = args.css_fonts_url;
    config.class_prefix = args.class_prefix;
    config.base_selector = args.base_selector;
    config.css_template = args.css_template.as_deref().map(read_text).transpose()?;
    config.html = args.html;
    config.html_dest = args.html_dest;
    config.html_template = args.html_template.as_deref().map(read_text).transpose()?;

    let result = generate(config)?;
    write_outputs(&result)?;

    if let Some(path) = &args.manifest {
        write_manifest(result.font_name(), &result.codepoints, path)?;
        info!("Wrote {}", path.display());
    }

    println!(
        "Done! {} icons written to {}",
        result.codepoints.len(),
        result.dest().display()
    );
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Codepoint given either as a JSON number or as a hex string
#[derive(Deserialize)]
#[serde(untagged)]
enum CodepointValue {
    Number(u32),
    Hex(String),
}

fn read_codepoints(path: &Path) -> Result<IndexMap<String, u32>> {
    let text = read_text(path)?;
    let raw: IndexMap<String, CodepointValue> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid codepoints file {}", path.display()))?;

    raw.into_iter()
        .map(|(name, value)| -> Result<(String, u32)> {
            let codepoint = match value {
                CodepointValue::Number(n) => n,
                CodepointValue::Hex(s) => parse_codepoint(&s)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid codepoint for '{name}'"))?,
            };
            Ok((name, codepoint))
        })
        .collect()
}

/// Accepts `F101`, `0xF101` and `U+F101`
fn parse_codepoint(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix("U+"))
        .or_else(|| s.strip_prefix("u+"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("'{s}' is not a hex codepoint: {e}"))
}
