//! Quire CLI
//!
//! Paginates a JSON document description and prints the resulting page
//! box trees, either as an indented summary or as JSON.

mod document;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use quire_layout::{
    BoxKind, CachedMeasurer, LayoutBox, LayoutConfig, LayoutContext, MonospaceMeasurer,
    layout_document,
};

use document::DocumentSpec;

/// Quire: paginated CSS box layout
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the page trees of a document
    quire document.json

    # Dump the page boxes as JSON
    quire --format json document.json

    # Use a configuration file and a lower page cap
    quire --config quire.json --max-pages 20 document.json

    # More logging
    RUST_LOG=quire_layout=debug quire document.json
"#)]
struct Cli {
    /// Path to the JSON document description
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// JSON layout configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the page cap from the configuration
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Glyph advance as a fraction of the font size
    #[arg(long, default_value = "0.6")]
    advance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented box trees with geometry
    Summary,
    /// The page boxes serialized as JSON
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            LayoutConfig::from_json_str(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }

    let json = fs::read_to_string(&cli.path)
        .with_context(|| format!("reading document {}", cli.path.display()))?;
    let doc = DocumentSpec::from_json_str(&json)
        .with_context(|| format!("parsing document {}", cli.path.display()))?
        .load();

    let measurer = CachedMeasurer::new(MonospaceMeasurer::new(cli.advance));
    let ctx = LayoutContext {
        tree: &doc.tree,
        styles: &doc.styles,
        measurer: &measurer,
        replaced: &doc.images,
        config: &config,
    };
    let pages = layout_document(&ctx).context("laying out document")?;
    log::debug!("{} text measurements cached", measurer.cached_entries());

    match cli.format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        Format::Summary => {
            for page in &pages {
                print_page(page);
            }
            println!("{} {}", pages.len().bold(), "pages".dimmed());
        }
    }
    Ok(())
}

/// Print one page header and its box tree.
fn print_page(page: &LayoutBox) {
    let BoxKind::Page(page_type) = &page.kind else {
        return;
    };
    let mut flags = vec![page_type.side.to_string()];
    if page_type.first {
        flags.push("first".to_string());
    }
    if page_type.blank {
        flags.push("blank".to_string());
    }
    let area = page.dimensions.content;
    println!(
        "{} {} ({}) area {:.1}x{:.1} at ({:.1}, {:.1})",
        "Page".green().bold(),
        page_type.index + 1,
        flags.join(", "),
        area.width,
        area.height,
        area.x,
        area.y
    );
    for child in &page.children {
        print_box(child, 1);
    }
}

/// Recursively print a box with its content rectangle.
fn print_box(bx: &LayoutBox, depth: usize) {
    let indent = "  ".repeat(depth);
    let rect = bx.dimensions.content;
    let name = match &bx.kind {
        BoxKind::Text(text) => {
            let preview: String = text.chars().take(30).collect();
            let suffix = if text.chars().count() > 30 { "..." } else { "" };
            format!("Text(\"{}{}\")", preview.replace('\n', "\\n"), suffix)
                .yellow()
                .to_string()
        }
        BoxKind::MarginBox(area) => format!("@{area}").cyan().to_string(),
        _ => bx.describe(),
    };
    println!(
        "{indent}{name} {}",
        format!(
            "x={:.1} y={:.1} w={:.1} h={:.1}",
            rect.x, rect.y, rect.width, rect.height
        )
        .dimmed()
    );
    if let Some(marker) = &bx.outside_marker {
        print_box(marker, depth + 1);
    }
    for child in &bx.children {
        print_box(child, depth + 1);
    }
}
