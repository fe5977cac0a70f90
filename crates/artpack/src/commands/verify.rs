use crate::errors::CliError;
use crate::println_pad;
use artpack_merge::{MergeConfig, ReferenceVerifier};
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

/// Re-run reference verification over existing output archives.
pub fn verify_archives(config: &MergeConfig, archives: &[Utf8PathBuf]) -> Result<()> {
    let verifier = ReferenceVerifier::from_config(config).map_err(CliError::from)?;
    let mut findings = 0usize;

    for archive in archives {
        let id = archive.file_stem().unwrap_or(archive.as_str());
        let span = tracing::info_span!("entry", id = %id);
        let _guard = span.enter();

        let report = match verifier.verify_path(archive) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Could not verify {}: {}", archive, e);
                println_pad!("{} {} {}", "✗".bright_red(), archive.as_str().bold(), e.to_string().bright_red());
                findings += 1;
                continue;
            }
        };

        if report.is_clean() {
            println_pad!(
                "{} {} {}",
                "✓".bright_green(),
                archive.as_str().bold(),
                format!("({} references)", report.checked).dimmed()
            );
            continue;
        }

        findings += report.findings();
        println_pad!(
            "{} {} {}",
            "✗".bright_red(),
            archive.as_str().bold(),
            format!("({} of {} references unresolved)", report.findings(), report.checked).dimmed()
        );
        for repair in &report.repaired {
            println_pad!(
                "   {} {} {} {}",
                "~".bright_yellow(),
                repair.reference,
                "->".dimmed(),
                repair.candidate.bright_yellow()
            );
        }
        for missing in &report.missing {
            println_pad!("   {} {}", "-".bright_red(), missing.bright_red());
        }
    }

    if findings > 0 {
        return Err(CliError::VerificationFailed {
            findings,
            archives: archives.len(),
        }
        .into());
    }
    Ok(())
}
