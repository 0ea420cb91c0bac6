use crate::process::InvocationBuilderError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing required files/folders: {}", .missing.join(", "))]
    MissingPrerequisite { missing: Vec<String> },

    #[error("{0} not found")]
    MissingTool(String),

    #[error("failed to install {0}")]
    InstallFailed(String),

    #[error("`{program}` exited with {}", describe_code(.code))]
    SubprocessFailure {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to run `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{} was not generated", .0.display())]
    MissingFragment(PathBuf),

    #[error("PDF was not created, check {} for details", .log.display())]
    MissingArtifact { log: PathBuf },

    #[error(transparent)]
    Invocation(#[from] InvocationBuilderError),
}

/// Errors from the section generator.
#[derive(Debug, Error)]
pub enum SectionsError {
    #[error("'{}' folder not found!", .0.display())]
    MissingSnippetDir(PathBuf),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
