use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(config::not_found),
        help("Run `artpack init` to create an artpack.toml, or pass --config <path>")
    )]
    ConfigNotFound { path: Utf8PathBuf },

    #[error("Configuration file error in {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check the file for TOML syntax errors and misspelled values")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
    },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(config::exists),
        help("Pass --force to overwrite it")
    )]
    ConfigExists { path: Utf8PathBuf },

    #[error("Invalid configuration")]
    #[diagnostic(
        code(config::invalid),
        help("Every pack needs exactly one unique, non-empty label, and every pack path must exist")
    )]
    InvalidConfig {
        #[source]
        source: artpack_merge::Error,
    },

    #[error("Merge failed")]
    #[diagnostic(code(merge::failed))]
    MergeFailed {
        #[source]
        source: artpack_merge::Error,
    },

    #[error("{failed} of {total} catalog entries failed")]
    #[diagnostic(
        code(merge::entries_failed),
        help("The errors log lists each failed entry and the step it failed in")
    )]
    EntriesFailed { failed: usize, total: usize },

    #[error("{findings} unresolved reference(s) across {archives} archive(s)")]
    #[diagnostic(
        code(verify::findings),
        help("Repairs are reported only; re-run the merge after fixing the source packs")
    )]
    VerificationFailed { findings: usize, archives: usize },

    #[error("Failed to open log file {path}")]
    #[diagnostic(
        code(log::open_failed),
        help("Check that the directory exists and is writable")
    )]
    LogFileFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { path }
    }

    pub fn config_parse_error(path: Utf8PathBuf, source: String, error: &toml::de::Error) -> Self {
        let message = error.message().to_string();
        Self::ConfigParseError {
            src: NamedSource::new(path.as_str(), source),
            span: error.span().map(SourceSpan::from),
            path,
            message,
        }
    }

    pub fn log_file_failed(path: Utf8PathBuf, source: std::io::Error) -> Self {
        Self::LogFileFailed { path, source }
    }
}

impl From<artpack_merge::Error> for CliError {
    fn from(source: artpack_merge::Error) -> Self {
        if source.is_config() {
            Self::InvalidConfig { source }
        } else {
            Self::MergeFailed { source }
        }
    }
}
