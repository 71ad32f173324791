pub mod check;
pub mod query;
pub mod tree;

#[cfg(test)]
mod check_tests;
#[cfg(test)]
mod input_tests;
#[cfg(test)]
mod query_tests;
#[cfg(test)]
mod tree_tests;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use zenscript_syntax::{ParseError, Parser, QueryError, Tree};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot use both inline text and a positional {0}")]
    Conflict(&'static str),

    #[error("{0} required (positional or inline flag)")]
    MissingInput(&'static str),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read stdin: {0}")]
    Stdin(#[source] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Text given either as a path (`-` for stdin) or inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    path: Option<PathBuf>,
    text: Option<String>,
}

impl Input {
    pub fn new(path: Option<PathBuf>, text: Option<String>) -> Self {
        Self { path, text }
    }

    /// Name shown in diagnostics.
    pub fn name(&self) -> String {
        match &self.path {
            Some(path) if path.as_os_str() == "-" => "<stdin>".to_string(),
            Some(path) => path.display().to_string(),
            None => "<inline>".to_string(),
        }
    }

    /// `what` names the input in error messages.
    pub fn read(&self, what: &'static str) -> Result<String, CliError> {
        match (&self.text, &self.path) {
            (Some(text), None) => Ok(text.clone()),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(CliError::Stdin)?;
                Ok(buf)
            }
            (None, Some(path)) => fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            }),
            (Some(_), Some(_)) => Err(CliError::Conflict(what)),
            (None, None) => Err(CliError::MissingInput(what)),
        }
    }
}

pub(crate) fn parse_source(text: &str, timeout_micros: u64) -> Result<Tree, CliError> {
    let mut parser = Parser::new();
    parser.set_timeout_micros(timeout_micros);
    let tree = parser.parse(text, None)?;
    tracing::debug!(
        bytes = text.len(),
        nodes = tree.root_node().descendant_count(),
        errors = tree.diagnostics().len(),
        "parsed source"
    );
    Ok(tree)
}
