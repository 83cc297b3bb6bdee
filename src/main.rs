//! chanmarkup - parse image-board post markup from the command line
//!
//! Reads a post body from a file (or stdin) and prints the styled spans.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use chanmarkup::config;
use chanmarkup::markup::{Color, Link, SiteRegistry, Span};

/// Parse image-board post markup into styled spans
#[derive(Parser, Debug)]
#[command(name = "chanmarkup", version, about, long_about = None)]
struct Cli {
    /// Post body file; reads stdin when omitted or "-"
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Site whose rules and quote patterns to use
    #[arg(short, long, default_value = "vichan")]
    site: String,

    /// Extra site file (TOML); ~/.chanmarkup.toml is always tried
    #[arg(long, value_name = "PATH")]
    sites: Option<PathBuf>,

    /// Print spans as JSON lines
    #[arg(long)]
    json: bool,

    /// List available sites and exit
    #[arg(long)]
    list_sites: bool,

    /// Log parser repairs and rule matches
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let mut registry = SiteRegistry::new();
    if let Some(path) = config::config_path().filter(|p| p.exists()) {
        registry
            .load_file(&path)
            .with_context(|| format!("Failed to load site file {}", path.display()))?;
    }
    if let Some(path) = &cli.sites {
        registry
            .load_file(path)
            .with_context(|| format!("Failed to load site file {}", path.display()))?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list_sites {
        for name in registry.list_sites() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let site = registry.require(&cli.site)?;
    let raw = read_input(cli.file.as_ref())?;
    debug!(site = %site.name, bytes = raw.len(), "parsing post body");

    for span in site.parse_comment(&raw) {
        if cli.json {
            serde_json::to_writer(&mut out, &span)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", describe(&span))?;
        }
    }

    Ok(())
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

/// One-line human readable form of a span
fn describe(span: &Span) -> String {
    let style = &span.style;
    let mut tags = Vec::new();
    if !style.fg.is_default() {
        tags.push(format!("fg={}", color_name(style.fg)));
    }
    if !style.bg.is_default() {
        tags.push(format!("bg={}", color_name(style.bg)));
    }
    for (set, name) in [
        (style.bold, "bold"),
        (style.italic, "italic"),
        (style.underline, "underline"),
        (style.strikethrough, "strike"),
        (style.monospace, "mono"),
        (style.spoiler, "spoiler"),
    ] {
        if set {
            tags.push(name.to_string());
        }
    }
    match &style.link {
        Some(Link::Quote { post_id }) => tags.push(format!("quote>>{post_id}")),
        Some(Link::Thread {
            board,
            thread_id,
            post_id,
        }) => tags.push(format!("thread>>/{board}/{thread_id}#{post_id}")),
        Some(Link::Url { url }) => tags.push(format!("url={url}")),
        None => {}
    }

    if tags.is_empty() {
        format!("{:?}", span.text)
    } else {
        format!("[{}] {:?}", tags.join(" "), span.text)
    }
}

fn color_name(color: Color) -> String {
    match color {
        Color::Rgb(rgb) => format!("#{rgb:06x}"),
        other => format!("{other:?}"),
    }
}
