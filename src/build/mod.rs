//! The build pipeline: requirement check, section generation, typesetting, organization.
//!
//! The first three stages gate the next; the first failure ends the build. Organization is
//! best-effort and never fails it.

use crate::error::BuildError;
use crate::process::CommandRunner;
use crate::project::Project;
use std::fmt;
use thiserror::Error;

mod generate;
mod organize;
mod requirements;
mod typeset;

pub use generate::generate_sections;
pub use organize::{cleanup, organize, CleanupReport};
pub use requirements::check_requirements;
pub use typeset::typeset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Requirements,
    Generation,
    Typesetting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Requirements => write!(f, "Requirements not met"),
            Stage::Generation => write!(f, "Could not generate sections"),
            Stage::Typesetting => write!(f, "LaTeX compilation failed"),
        }
    }
}

/// A build that stopped at `stage`.
#[derive(Debug, Error)]
#[error("Build failed: {stage}")]
pub struct Failure {
    pub stage: Stage,
    #[source]
    pub error: BuildError,
}

fn at(stage: Stage) -> impl FnOnce(BuildError) -> Failure {
    move |error| Failure { stage, error }
}

/// Run the whole pipeline.
pub fn run(project: &Project, runner: &dyn CommandRunner) -> Result<CleanupReport, Failure> {
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("  {} - Build Script", project.config.title);
    println!("{rule}");

    check_requirements(project, runner).map_err(at(Stage::Requirements))?;
    generate_sections(project, runner).map_err(at(Stage::Generation))?;
    typeset(project, runner).map_err(at(Stage::Typesetting))?;
    let report = organize(project);

    println!("\n{rule}");
    println!("  {} Build completed successfully!", console::style("✓").green());
    println!("{rule}\n");

    Ok(report)
}
