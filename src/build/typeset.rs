use crate::error::BuildError;
use crate::process::{CommandRunner, InvocationBuilder};
use crate::project::Project;
use crate::sections::path_to_slashes;
use crate::status;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;

/// How much of a failing pass's error output is shown.
pub const ERROR_EXCERPT_CHARS: usize = 500;

/// Run the typesetter over the main document for the configured number of passes.
///
/// Passes always run in full and in order, since each one reads the auxiliary files written by
/// the previous. A pass exiting non-zero is only a warning; the build fails here only if a pass
/// can't be started or no artifact exists afterwards.
pub fn typeset(project: &Project, runner: &dyn CommandRunner) -> Result<PathBuf, BuildError> {
    status::step("Compiling LaTeX Document");

    let main_document = project.main_document();
    if !main_document.is_file() {
        status::fail(format!("{} not found!", main_document.display()));
        return Err(BuildError::MissingPrerequisite {
            missing: vec![project.config.paths.main_document.display().to_string()],
        });
    }

    let tools = &project.config.tools;
    let invocation = InvocationBuilder::default()
        .program(tools.typesetter.clone())
        .arg("-shell-escape")
        .arg("-interaction=nonstopmode")
        .arg(path_to_slashes(&project.config.paths.main_document))
        .cwd(project.template_dir())
        .build()?;

    let passes = tools.passes;
    let progress = pass_progress(passes);

    for pass in 1..=passes {
        let label = if pass == passes && passes > 2 {
            format!("Running {} pass {pass} of {passes} (for page count)...", tools.typesetter)
        } else {
            format!("Running {} pass {pass} of {passes}...", tools.typesetter)
        };
        progress.set_message(label.clone());
        progress.suspend(|| println!("{label}"));

        let output = match runner.run(&invocation) {
            Ok(output) => output,
            Err(source) => {
                progress.finish_and_clear();
                status::fail(format!("Could not run {}: {source}", tools.typesetter));
                return Err(BuildError::Spawn {
                    program: tools.typesetter.clone(),
                    source,
                });
            }
        };

        if !output.success() {
            let stderr = excerpt(&output.stderr, ERROR_EXCERPT_CHARS);
            progress.suspend(|| {
                status::warn(format!(
                    "Pass {pass} had errors (this may be normal on early passes)"
                ));
                if !stderr.trim().is_empty() {
                    println!("{stderr}");
                }
            });
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    match project.locate_artifact() {
        Some(artifact) => {
            status::ok(format!("PDF compiled successfully: {}", artifact.display()));
            Ok(artifact)
        }
        None => {
            let log = project.typesetter_log();
            status::fail(format!(
                "PDF was not created. Check {} for details.",
                log.display()
            ));
            Err(BuildError::MissingArtifact { log })
        }
    }
}

/// A bar counting typesetter passes, drawn on stdout next to the pass messages. Hidden when
/// stdout isn't a terminal.
fn pass_progress(passes: u32) -> ProgressBar {
    let progress =
        ProgressBar::with_draw_target(Some(passes as u64), ProgressDrawTarget::stdout());
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("can parse progress style")
            .progress_chars("#>-"),
    );
    progress
}

/// The first `limit` characters of `text`.
pub fn excerpt(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
