use std::io::Write;

use owo_colors::OwoColorize;
use paperfetch_core::PaperRecord;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a record as an indented, human-readable block.
pub fn print_record(w: &mut dyn Write, record: &PaperRecord, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", record.title.bold())?;
    } else {
        writeln!(w, "{}", record.title)?;
    }

    if !record.authors.is_empty() {
        writeln!(w, "  Authors: {}", record.authors.join(", "))?;
    }

    let mut published = Vec::new();
    if let Some(year) = record.year {
        published.push(year.to_string());
    }
    if let Some(ref venue) = record.venue {
        published.push(venue.clone());
    }
    if !published.is_empty() {
        writeln!(w, "  Published: {}", published.join(", "))?;
    }

    print_link(w, "Semantic Scholar", &record.url, color)?;
    if let Some(ref url) = record.arxiv_url {
        print_link(w, "arXiv", url, color)?;
    }

    print_assets(w, "Figures", &record.figure_urls, color)?;
    print_assets(w, "Tables", &record.table_urls, color)?;

    if let Some(ref text) = record.abstract_text {
        writeln!(w)?;
        writeln!(w, "  {}", text.trim())?;
    }
    Ok(())
}

fn print_link(w: &mut dyn Write, label: &str, url: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "  {}: {}", label, url.cyan())
    } else {
        writeln!(w, "  {}: {}", label, url)
    }
}

fn print_assets(
    w: &mut dyn Write,
    label: &str,
    urls: &[String],
    color: ColorMode,
) -> std::io::Result<()> {
    if urls.is_empty() {
        return Ok(());
    }
    writeln!(w, "  {} ({}):", label, urls.len())?;
    for url in urls {
        if color.enabled() {
            writeln!(w, "    {}", url.dimmed())?;
        } else {
            writeln!(w, "    {}", url)?;
        }
    }
    Ok(())
}

pub fn print_not_found(w: &mut dyn Write, query: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "NOT FOUND:".red(), query)
    } else {
        writeln!(w, "NOT FOUND: {}", query)
    }
}
