//! Compiler options and the `cminus.json` project file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Listing toggles. Unset fields are off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Echo every source line into the listing as it is read.
    pub echo_source: Option<bool>,
    /// One listing line per token.
    pub trace_scan: Option<bool>,
    /// The syntax tree listing.
    pub trace_parse: Option<bool>,
    /// The symbol table listing.
    pub trace_analyze: Option<bool>,
}

impl CompilerOptions {
    pub fn echo_source(&self) -> bool {
        self.echo_source.unwrap_or(false)
    }

    pub fn trace_scan(&self) -> bool {
        self.trace_scan.unwrap_or(false)
    }

    pub fn trace_parse(&self) -> bool {
        self.trace_parse.unwrap_or(false)
    }

    pub fn trace_analyze(&self) -> bool {
        self.trace_analyze.unwrap_or(false)
    }

    /// Apply every field set in `overrides` on top of `self`.
    pub fn merge(mut self, overrides: &CompilerOptions) -> CompilerOptions {
        self.echo_source = overrides.echo_source.or(self.echo_source);
        self.trace_scan = overrides.trace_scan.or(self.trace_scan);
        self.trace_parse = overrides.trace_parse.or(self.trace_parse);
        self.trace_analyze = overrides.trace_analyze.or(self.trace_analyze);
        self
    }
}

/// The `cminus.json` file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub compiler_options: Option<CompilerOptions>,
    /// Source files, relative to the project file.
    pub files: Option<Vec<String>>,
}

impl ProjectConfig {
    /// The listed files resolved against the directory holding `project`.
    pub fn resolved_files(&self, project: &Path) -> Vec<PathBuf> {
        let base = project.parent().unwrap_or_else(|| Path::new(""));
        self.files
            .iter()
            .flatten()
            .map(|file| base.join(file))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot read project file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse the contents of a project file.
pub fn parse_project(content: &str) -> Result<ProjectConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read and parse a project file from disk.
pub fn load_options(path: &Path) -> Result<ProjectConfig, OptionsError> {
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_project(&content).map_err(|source| OptionsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded project file {}", path.display());
    Ok(config)
}
