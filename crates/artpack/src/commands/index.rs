use crate::errors::CliError;
use crate::println_pad;
use artpack_merge::{CatalogEntry, MergeConfig, Pack, PackIndex};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct IndexReport<'a> {
    packs: &'a [Pack],
    entries: &'a [CatalogEntry],
    warnings: &'a [String],
}

pub fn show_index(config: &MergeConfig, json: bool) -> Result<()> {
    config.validate().map_err(CliError::from)?;
    let packs = config.packs();
    let index = PackIndex::build(&packs, &config.nested_suffix()).map_err(CliError::from)?;

    if json {
        let report = IndexReport {
            packs: &packs,
            entries: index.entries(),
            warnings: index.warnings(),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    println_pad!(
        "{} {}",
        "📚 Catalog entries:".bright_blue().bold(),
        index.len().to_string().bright_cyan().bold()
    );
    for entry in index.entries() {
        let labels: Vec<&str> = entry
            .contributions
            .iter()
            .filter_map(|c| packs.get(c.pack))
            .map(|pack| pack.label.as_str())
            .collect();
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            entry.id.bright_white().bold(),
            format!("({})", labels.join(", ")).dimmed()
        );
    }

    if !index.warnings().is_empty() {
        println_pad!("\n{}", "⚠️  Warnings:".bright_yellow().bold());
        for warning in index.warnings() {
            println_pad!("   {} {}", "•".bright_yellow(), warning);
        }
    }

    Ok(())
}
