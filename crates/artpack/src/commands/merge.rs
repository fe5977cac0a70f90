use crate::errors::CliError;
use crate::println_pad;
use crate::utils::print_ansi_boxed_lines;
use artpack_merge::{
    ContentStore, DigestKind, EntryStatus, MergeConfig, MergeOrchestrator, RunSummary, SkipReason,
};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DigestArg {
    Sha1,
    Sha256,
}

impl From<DigestArg> for DigestKind {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Sha1 => DigestKind::Sha1,
            DigestArg::Sha256 => DigestKind::Sha256,
        }
    }
}

/// Command-line values layered over the loaded configuration.
#[derive(Debug, Default)]
pub struct MergeOverrides {
    pub packs: Vec<Utf8PathBuf>,
    pub labels: Vec<String>,
    pub output_dir: Option<Utf8PathBuf>,
    pub scratch_dir: Option<Utf8PathBuf>,
    pub max_entries: Option<usize>,
    pub overwrite: bool,
    pub no_dedup: bool,
    pub digest: Option<DigestArg>,
    pub keep_scratch: bool,
    pub run_log: Option<Utf8PathBuf>,
    pub error_log: Option<Utf8PathBuf>,
}

impl MergeOverrides {
    /// Apply to `config`. Packs given on the command line replace the
    /// configured list, and so do labels.
    pub fn apply(self, config: &mut MergeConfig) {
        if !self.packs.is_empty() {
            config.pack_paths = self.packs;
        }
        if !self.labels.is_empty() {
            config.pack_labels = self.labels;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(scratch_dir) = self.scratch_dir {
            config.scratch_dir = Some(scratch_dir);
        }
        if let Some(max_entries) = self.max_entries {
            config.max_entries = max_entries;
        }
        if self.overwrite {
            config.overwrite = true;
        }
        if self.no_dedup {
            config.dedup = false;
        }
        if let Some(digest) = self.digest {
            config.digest = digest.into();
        }
        if self.keep_scratch {
            config.cleanup_scratch = false;
        }
        if let Some(run_log) = self.run_log {
            config.run_log = Some(run_log);
        }
        if let Some(error_log) = self.error_log {
            config.error_log = Some(error_log);
        }
    }
}

pub fn merge_packs(config: &MergeConfig) -> Result<()> {
    println_pad!(
        "{} {} {}",
        "🧩 Merging".bright_blue().bold(),
        config.pack_paths.len().to_string().bright_cyan().bold(),
        "pack(s)".bright_blue().bold()
    );
    for (path, label) in config.pack_paths.iter().zip(&config.pack_labels) {
        println_pad!("   {} {} {}", "•".bright_cyan(), label.bright_cyan().bold(), path.as_str().dimmed());
    }

    let store = ContentStore::from_config(config);
    let summary = MergeOrchestrator::new(config, &store)
        .and_then(|orchestrator| orchestrator.run())
        .map_err(CliError::from)?;

    print_summary(config, &summary);

    if summary.failed > 0 {
        return Err(CliError::EntriesFailed {
            failed: summary.failed,
            total: summary.outcomes.len(),
        }
        .into());
    }
    Ok(())
}

fn print_summary(config: &MergeConfig, summary: &RunSummary) {
    let written: usize = summary.outcomes.iter().map(|o| o.assets_written).sum();
    let deduplicated: usize = summary.outcomes.iter().map(|o| o.assets_deduplicated).sum();
    let capped = summary
        .outcomes
        .iter()
        .filter(|o| o.status == EntryStatus::Skipped(SkipReason::Capped))
        .count();

    println!();
    print_ansi_boxed_lines(&[
        format!("{} {}", "Processed:".bright_green(), summary.processed.to_string().bold()),
        format!(
            "{} {} {}",
            "Skipped:".bright_yellow(),
            summary.skipped.to_string().bold(),
            format!("({} over the cap)", capped).dimmed()
        ),
        format!("{} {}", "Failed:".bright_red(), summary.failed.to_string().bold()),
        format!(
            "{} {} written, {} deduplicated",
            "Assets:".bright_white(),
            written,
            deduplicated
        ),
        format!("{} {}", "Findings:".bright_white(), summary.findings()),
        format!("{} {:.2?}", "Elapsed:".bright_white(), summary.elapsed),
    ]);

    for outcome in &summary.outcomes {
        if let EntryStatus::Failed { state, error } = &outcome.status {
            println_pad!(
                "{} {} {} {}",
                "✗".bright_red(),
                outcome.id.bright_white().bold(),
                format!("[{}]", state).dimmed(),
                error.bright_red()
            );
        }
        if let Some(report) = outcome.verification.as_ref().filter(|r| !r.is_clean()) {
            println_pad!(
                "{} {} {}",
                "!".bright_yellow(),
                outcome.id.bright_white().bold(),
                format!("{} unresolved reference(s)", report.findings()).bright_yellow()
            );
        }
    }

    println_pad!(
        "\n{} {}",
        "Output:".bright_green(),
        config.output_dir.as_str().bright_white().bold()
    );
    if let Some(error_log) = &config.error_log {
        println_pad!("{} {}", "Errors log:".bright_green(), error_log.as_str().bright_white());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_configured_values() {
        let mut config = MergeConfig {
            pack_paths: vec!["old.zip".into()],
            pack_labels: vec!["Old".to_string()],
            ..MergeConfig::default()
        };

        MergeOverrides {
            packs: vec!["a.zip".into(), "b.zip".into()],
            labels: vec!["A".to_string(), "B".to_string()],
            max_entries: Some(2),
            no_dedup: true,
            digest: Some(DigestArg::Sha256),
            keep_scratch: true,
            ..MergeOverrides::default()
        }
        .apply(&mut config);

        assert_eq!(config.pack_paths.len(), 2);
        assert_eq!(config.pack_labels, vec!["A", "B"]);
        assert_eq!(config.max_entries, 2);
        assert!(!config.dedup);
        assert_eq!(config.digest, DigestKind::Sha256);
        assert!(!config.cleanup_scratch);
        assert_eq!(config.output_dir, "merged");
    }

    #[test]
    fn empty_overrides_keep_config() {
        let mut config = MergeConfig {
            overwrite: true,
            ..MergeConfig::default()
        };
        MergeOverrides::default().apply(&mut config);
        assert!(config.overwrite);
        assert!(config.dedup);
    }
}
