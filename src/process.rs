//! Synchronous external process invocation.
//!
//! Every tool the build touches (the interpreter, the typesetter, the package installer and the
//! section generator) is run through [`CommandRunner`], so the pipeline never calls
//! `std::process::Command` directly.

use derive_builder::Builder;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;

/// A single command line, optionally run from a specific directory.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct Invocation {
    pub program: PathBuf,
    #[builder(setter(each(name = "arg", into)), default)]
    pub args: Vec<String>,
    #[builder(setter(into, strip_option), default)]
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// The program name as it would be typed at a shell, for messages.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.args.iter() {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    /// Run `invocation` to completion, capturing both output streams.
    ///
    /// An `Err` means the process couldn't be started at all; a process that ran and failed is
    /// an `Ok` with a non-zero code.
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Runs commands on the host with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        match &invocation.cwd {
            Some(cwd) => log::debug!("running `{invocation}` in {}", cwd.display()),
            None => log::debug!("running `{invocation}`"),
        }

        let output = command.output()?;
        let output = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        log::trace!("`{}` finished with {:?}", invocation.program_name(), output.code);
        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_build_invocation() {
        let invocation = InvocationBuilder::default()
            .program("python3")
            .arg("-c")
            .arg("import pygments")
            .cwd("template")
            .build()
            .expect("can build invocation");

        assert_eq!(invocation.program, PathBuf::from("python3"));
        assert_eq!(invocation.args, vec!["-c", "import pygments"]);
        assert_eq!(invocation.cwd, Some(PathBuf::from("template")));
        assert!(invocation.has_arg("-c"));
        assert_eq!(invocation.to_string(), "python3 -c \"import pygments\"");
    }

    #[test]
    fn invocation_requires_program() {
        assert!(InvocationBuilder::default().arg("--version").build().is_err());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let invocation = InvocationBuilder::default()
            .program("notebook-build-definitely-not-installed")
            .arg("--version")
            .build()
            .expect("can build invocation");
        assert!(SystemRunner.run(&invocation).is_err());
    }
}
