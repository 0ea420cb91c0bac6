use crate::error::BuildError;
use crate::process::{CommandRunner, InvocationBuilder};
use crate::project::Project;
use crate::sections::path_to_slashes;
use crate::status;

/// Run the section generator as a subprocess from inside the template directory.
pub fn generate_sections(
    project: &Project,
    runner: &dyn CommandRunner,
) -> Result<(), BuildError> {
    status::step("Generating Sections from Codes Folder");

    let snippets = &project.config.snippets;
    let include_path = project.include_path();
    let invocation = InvocationBuilder::default()
        .program(project.generator.clone())
        .arg("sections")
        .arg("--snippets")
        .arg(include_path.clone())
        .arg("--include-path")
        .arg(include_path)
        .arg("--output")
        .arg(path_to_slashes(&project.config.paths.fragment))
        .arg("--extension")
        .arg(snippets.extension.clone())
        .arg("--language")
        .arg(snippets.language.clone())
        .arg("--reserved-name")
        .arg(snippets.reserved_name.clone())
        .arg("--reserved-title")
        .arg(snippets.reserved_title.clone())
        .cwd(project.template_dir())
        .build()?;

    let output = runner
        .run(&invocation)
        .map_err(|source| BuildError::Spawn {
            program: invocation.program_name(),
            source,
        })?;

    if !output.success() {
        status::fail("Error generating sections:");
        println!("{}", output.stderr.trim_end());
        return Err(BuildError::SubprocessFailure {
            program: invocation.program_name(),
            code: output.code,
            stderr: output.stderr,
        });
    }

    println!("{}", output.stdout.trim_end());

    let fragment = project.fragment();
    if !fragment.is_file() {
        status::fail(format!("{} was not generated", fragment.display()));
        return Err(BuildError::MissingFragment(fragment));
    }

    status::ok("Sections generated successfully");
    Ok(())
}
