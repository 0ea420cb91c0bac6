use crate::error::BuildError;
use crate::process::{CommandRunner, InvocationBuilder};
use crate::project::Project;
use crate::status;

const TYPESETTER_INSTALL_HINTS: &[&str] = &[
    "macOS: brew install --cask mactex",
    "Linux: sudo apt-get install texlive-full",
    "Windows: Install MiKTeX from https://miktex.org/",
];

/// Verify required paths and external tools, installing the highlighter if it's missing.
pub fn check_requirements(
    project: &Project,
    runner: &dyn CommandRunner,
) -> Result<(), BuildError> {
    status::step("Checking Requirements");

    let template_dir = project.template_dir();
    if !template_dir.is_dir() {
        let name = project.config.paths.template_dir.display().to_string();
        status::fail(format!("'{name}' folder not found!"));
        return Err(BuildError::MissingPrerequisite {
            missing: vec![name],
        });
    }

    let missing: Vec<String> = project
        .required_paths()
        .into_iter()
        .filter(|(_, path)| !path.exists())
        .map(|(label, _)| label)
        .collect();
    if !missing.is_empty() {
        status::fail(format!(
            "Missing required files/folders: {}",
            missing.join(", ")
        ));
        return Err(BuildError::MissingPrerequisite { missing });
    }

    let tools = &project.config.tools;

    if !probe(runner, &tools.interpreter, &["--version"])? {
        status::fail(format!("{} not found", tools.interpreter));
        return Err(BuildError::MissingTool(tools.interpreter.clone()));
    }
    status::ok(format!("{} found", tools.interpreter));

    if !probe(runner, &tools.typesetter, &["--version"])? {
        status::fail(format!(
            "{} not found. Please install LaTeX distribution.",
            tools.typesetter
        ));
        for hint in TYPESETTER_INSTALL_HINTS {
            println!("  {hint}");
        }
        return Err(BuildError::MissingTool(tools.typesetter.clone()));
    }
    status::ok(format!("{} found", tools.typesetter));

    let module = &tools.highlighter_module;
    let import = format!("import {module}");
    if probe(runner, &tools.interpreter, &["-c", import.as_str()])? {
        status::ok(format!("{module} found"));
    } else {
        status::warn(format!("{module} not found. Installing..."));
        if !probe(runner, &tools.interpreter, &["-m", "pip", "install", module.as_str()])? {
            status::fail(format!("Failed to install {module}"));
            return Err(BuildError::InstallFailed(module.clone()));
        }
        status::ok(format!("{module} installed"));
    }

    status::ok("All requirements satisfied");
    Ok(())
}

/// Run a tool and report whether it exited successfully. A tool that can't be started counts
/// as a failure.
fn probe(runner: &dyn CommandRunner, program: &str, args: &[&str]) -> Result<bool, BuildError> {
    let mut builder = InvocationBuilder::default();
    builder.program(program);
    for arg in args {
        builder.arg(*arg);
    }
    let invocation = builder.build()?;

    match runner.run(&invocation) {
        Ok(output) => Ok(output.success()),
        Err(e) => {
            log::debug!("`{invocation}` could not be started: {e}");
            Ok(false)
        }
    }
}
