//! Moving the finished notebook into place and clearing away everything the typesetter left.
//!
//! Nothing in here fails the build. Each file operation is attempted on its own, and anything
//! that goes wrong becomes a [`Warning`] in the [`CleanupReport`].

use crate::project::Project;
use crate::status;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of a single successful cleanup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    File(PathBuf),
    Directory(PathBuf),
    /// Nothing was there to begin with
    NotPresent(PathBuf),
}

impl Removed {
    pub fn removed_something(&self) -> bool {
        !matches!(self, Removed::NotPresent(_))
    }
}

/// A file operation that couldn't be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub action: &'static str,
    pub path: PathBuf,
    pub reason: String,
}

impl Warning {
    fn new<E: fmt::Display>(action: &'static str, path: &Path, error: E) -> Warning {
        Warning {
            action,
            path: path.to_path_buf(),
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not {} {}: {}",
            self.action,
            self.path.display(),
            self.reason
        )
    }
}

/// Everything the organization stage did, and everything it couldn't.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<Removed>,
    pub warnings: Vec<Warning>,
    /// Absolute location of the notebook, if it ended up in place
    pub artifact: Option<PathBuf>,
}

impl CleanupReport {
    pub fn record(&mut self, attempt: Result<Removed, Warning>) {
        match attempt {
            Ok(removed) => self.removed.push(removed),
            Err(warning) => self.warnings.push(warning),
        }
    }

    pub fn removed_count(&self) -> usize {
        self.removed.iter().filter(|r| r.removed_something()).count()
    }

    fn print_warnings(&self) {
        for warning in self.warnings.iter() {
            log::warn!("{warning}");
            status::warn(warning);
        }
    }
}

/// Remove a file or directory tree.
pub fn attempt(path: &Path) -> Result<Removed, Warning> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Removed::NotPresent(path.to_path_buf()))
        }
        Err(e) => return Err(Warning::new("remove", path, e)),
    };

    if metadata.is_dir() {
        std::fs::remove_dir_all(path)
            .map(|_| Removed::Directory(path.to_path_buf()))
            .map_err(|e| Warning::new("remove", path, e))
    } else {
        std::fs::remove_file(path)
            .map(|_| Removed::File(path.to_path_buf()))
            .map_err(|e| Warning::new("remove", path, e))
    }
}

/// Remove a previous notebook at `path`. Only a file is ever replaced; anything else is left
/// alone and reported.
fn remove_previous(path: &Path) -> Result<Removed, Warning> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            Err(Warning::new("replace", path, "it is a directory"))
        }
        Ok(_) => std::fs::remove_file(path)
            .map(|_| Removed::File(path.to_path_buf()))
            .map_err(|e| Warning::new("remove", path, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(Removed::NotPresent(path.to_path_buf()))
        }
        Err(e) => Err(Warning::new("remove", path, e)),
    }
}

/// Move `from` to `to`, copying when a rename isn't possible (e.g. across filesystems).
fn relocate(from: &Path, to: &Path) -> Result<(), Warning> {
    if let Err(e) = std::fs::rename(from, to) {
        log::debug!(
            "renaming {} to {} failed ({e}), copying instead",
            from.display(),
            to.display()
        );
        std::fs::copy(from, to).map_err(|e| Warning::new("move", from, e))?;
        std::fs::remove_file(from).map_err(|e| Warning::new("remove", from, e))?;
    }
    Ok(())
}

/// Put the typeset notebook at its canonical path, then clean up.
pub fn organize(project: &Project) -> CleanupReport {
    status::step("Organizing Output Files");

    let mut report = CleanupReport::default();
    let destination = project.artifact();
    let artifact_name = project.config.paths.artifact.display().to_string();

    match project.locate_artifact() {
        Some(source) => {
            if source.starts_with(project.output_dir()) {
                status::ok(format!(
                    "Found PDF in {} directory",
                    project.config.paths.output_dir.display()
                ));
            } else {
                status::ok("Found PDF in template directory");
            }

            match remove_previous(&destination) {
                Ok(previous) => {
                    if matches!(previous, Removed::File(_)) {
                        status::ok(format!("Removed existing {artifact_name}"));
                    }
                    report.removed.push(previous);
                    match relocate(&source, &destination) {
                        Ok(()) => status::ok(format!("Renamed and moved PDF to {artifact_name}")),
                        Err(warning) => report.warnings.push(warning),
                    }
                }
                Err(warning) => report.warnings.push(warning),
            }
        }
        None => status::warn(format!(
            "PDF not found in {} or template directory",
            project.config.paths.output_dir.display()
        )),
    }

    clean_into(project, &mut report);
    report.print_warnings();

    if destination.is_file() {
        let absolute = destination
            .canonicalize()
            .unwrap_or_else(|_| destination.clone());
        println!();
        status::ok(format!(
            "Build complete! PDF is available at: {}",
            absolute.display()
        ));
        report.artifact = Some(absolute);
    } else {
        println!();
        status::warn("PDF not found at expected location");
    }

    report
}

/// Remove the output directory and the auxiliary files, leaving any notebook alone.
pub fn cleanup(project: &Project) -> CleanupReport {
    status::step("Removing Auxiliary Files");

    let mut report = CleanupReport::default();
    clean_into(project, &mut report);
    report.print_warnings();
    if report.warnings.is_empty() {
        status::ok("Clean");
    }
    report
}

fn clean_into(project: &Project, report: &mut CleanupReport) {
    clean_output_dir(project, report);

    let before = report.removed_count();
    for auxiliary in project.auxiliary() {
        report.record(attempt(&auxiliary));
    }
    let removed = report.removed_count() - before;
    if removed > 0 {
        status::ok(format!(
            "Removed {removed} auxiliary file(s) from template directory"
        ));
    }
}

fn clean_output_dir(project: &Project, report: &mut CleanupReport) {
    let output_dir = project.output_dir();
    if !output_dir.is_dir() {
        return;
    }

    let entries = match std::fs::read_dir(&output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            report
                .warnings
                .push(Warning::new("clean", &output_dir, e));
            return;
        }
    };

    let before = report.removed_count();
    for entry in entries {
        match entry {
            Ok(entry) => report.record(attempt(&entry.path())),
            Err(e) => report
                .warnings
                .push(Warning::new("read an entry of", &output_dir, e)),
        }
    }
    let removed = report.removed_count() - before;

    match std::fs::remove_dir(&output_dir) {
        Ok(()) => {
            report.removed.push(Removed::Directory(output_dir));
            status::ok(format!(
                "Removed {removed} file(s) from {} and deleted directory",
                project.config.paths.output_dir.display()
            ));
        }
        Err(e) => report.warnings.push(Warning::new("remove", &output_dir, e)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn attempt_reports_what_was_removed() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let file = dir.path().join("main.aux");
        let minted = dir.path().join("_minted");
        std::fs::write(&file, "\\relax").expect("can write file");
        std::fs::create_dir_all(minted.join("cache")).expect("can create dir");
        std::fs::write(minted.join("cache/a.pygtex"), "").expect("can write file");

        assert_eq!(attempt(&file), Ok(Removed::File(file.clone())));
        assert_eq!(attempt(&minted), Ok(Removed::Directory(minted.clone())));
        assert_eq!(attempt(&file), Ok(Removed::NotPresent(file.clone())));
        assert!(!file.exists());
        assert!(!minted.exists());
    }

    #[test]
    fn cleanup_removes_output_dir_and_auxiliary_files() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let project = Project::new(root.path(), Configuration::default(), "notebook-build");
        let template = project.template_dir();
        std::fs::create_dir_all(template.join("_minted")).expect("can create dirs");
        for name in ["main.tex", "main.aux", "main.log", "sections.tex"] {
            std::fs::write(template.join(name), "").expect("can write file");
        }
        std::fs::create_dir_all(project.output_dir().join("nested")).expect("can create dirs");
        std::fs::write(project.output_dir().join("main.aux"), "").expect("can write file");

        let report = cleanup(&project);

        assert!(report.warnings.is_empty());
        assert!(!project.output_dir().exists());
        for auxiliary in project.auxiliary() {
            assert!(!auxiliary.exists(), "{} remains", auxiliary.display());
        }
        assert!(template.join("main.tex").exists());
        // main.aux, nested/, the output dir itself, then main.aux, main.log, sections.tex, _minted
        assert_eq!(report.removed_count(), 7);
    }

    #[test]
    fn organize_replaces_stale_artifact() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let project = Project::new(root.path(), Configuration::default(), "notebook-build");
        std::fs::create_dir_all(project.template_dir()).expect("can create template dir");
        std::fs::write(project.template_dir().join("main.pdf"), "fresh").expect("can write");
        std::fs::write(project.artifact(), "stale").expect("can write");

        let report = organize(&project);

        assert!(report.warnings.is_empty());
        assert_eq!(
            std::fs::read_to_string(project.artifact()).expect("artifact exists"),
            "fresh"
        );
        assert!(!project.template_dir().join("main.pdf").exists());
        assert!(report.artifact.is_some());
    }

    #[test]
    fn failed_removal_is_a_warning_and_cleanup_continues() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let mut config = Configuration::default();
        config.paths.auxiliary = ["main.aux", "blocker/child", "main.log"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let project = Project::new(root.path(), config, "notebook-build");
        let template = project.template_dir();
        std::fs::create_dir_all(&template).expect("can create template dir");
        for name in ["main.aux", "main.log", "blocker"] {
            std::fs::write(template.join(name), "").expect("can write file");
        }
        std::fs::write(template.join("main.pdf"), "fresh").expect("can write");

        let report = organize(&project);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, template.join("blocker/child"));
        assert!(!template.join("main.aux").exists());
        assert!(!template.join("main.log").exists());
        assert!(template.join("blocker").is_file());
        assert_eq!(
            std::fs::read_to_string(project.artifact()).expect("artifact exists"),
            "fresh"
        );
        assert!(report.artifact.is_some());
    }

    #[test]
    fn directory_at_artifact_path_is_left_alone() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let project = Project::new(root.path(), Configuration::default(), "notebook-build");
        std::fs::create_dir_all(project.template_dir()).expect("can create template dir");
        std::fs::write(project.template_dir().join("main.pdf"), "fresh").expect("can write");
        std::fs::create_dir_all(project.artifact()).expect("can create dir");
        std::fs::write(project.artifact().join("keep.txt"), "mine").expect("can write");

        let report = organize(&project);

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].action, "replace");
        assert_eq!(
            std::fs::read_to_string(project.artifact().join("keep.txt")).expect("still there"),
            "mine"
        );
        assert!(report.artifact.is_none());
    }

    #[test]
    fn organize_without_artifact_still_cleans() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let project = Project::new(root.path(), Configuration::default(), "notebook-build");
        std::fs::create_dir_all(project.template_dir()).expect("can create template dir");
        std::fs::write(project.template_dir().join("main.log"), "").expect("can write");

        let report = organize(&project);

        assert!(report.artifact.is_none());
        assert!(!project.template_dir().join("main.log").exists());
    }
}
