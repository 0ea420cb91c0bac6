use crate::config::Configuration;
use crate::sections::path_to_slashes;
use std::path::{Component, Path, PathBuf};

/// A configuration anchored at a project root, plus the command that regenerates sections.
///
/// Immutable once built; every build stage borrows it.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: Configuration,
    /// Executable providing the `sections` command, normally this binary
    pub generator: PathBuf,
}

impl Project {
    pub fn new<P: Into<PathBuf>, G: Into<PathBuf>>(
        root: P,
        config: Configuration,
        generator: G,
    ) -> Project {
        Project {
            root: root.into(),
            config,
            generator: generator.into(),
        }
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.template_dir)
    }

    pub fn snippet_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.snippet_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.output_dir)
    }

    pub fn main_document(&self) -> PathBuf {
        self.template_dir().join(&self.config.paths.main_document)
    }

    pub fn fragment(&self) -> PathBuf {
        self.template_dir().join(&self.config.paths.fragment)
    }

    /// Canonical path of the finished notebook.
    pub fn artifact(&self) -> PathBuf {
        self.root.join(&self.config.paths.artifact)
    }

    /// File name the typesetter gives its output (`main.tex` → `main.pdf`).
    pub fn produced_artifact_name(&self) -> PathBuf {
        let name = self
            .config
            .paths
            .main_document
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("main"));
        name.with_extension("pdf")
    }

    /// The typesetter's log for the main document.
    pub fn typesetter_log(&self) -> PathBuf {
        self.main_document().with_extension("log")
    }

    /// Where the freshly typeset artifact is, preferring the output directory.
    pub fn locate_artifact(&self) -> Option<PathBuf> {
        let name = self.produced_artifact_name();
        [self.output_dir().join(&name), self.template_dir().join(&name)]
            .into_iter()
            .find(|p| p.is_file())
    }

    /// Paths that must exist before a build starts, labelled the way they're configured.
    ///
    /// The snippet directory is checked at its real location under the root, the rest inside
    /// the template directory.
    pub fn required_paths(&self) -> Vec<(String, PathBuf)> {
        let mut required = vec![(
            self.config.paths.snippet_dir.display().to_string(),
            self.snippet_dir(),
        )];
        required.extend(
            self.config
                .paths
                .required_template_files
                .iter()
                .map(|f| (f.display().to_string(), self.template_dir().join(f))),
        );
        required
    }

    /// Auxiliary entries to delete from the template directory.
    pub fn auxiliary(&self) -> Vec<PathBuf> {
        let template = self.template_dir();
        self.config
            .paths
            .auxiliary
            .iter()
            .map(|a| template.join(a))
            .collect()
    }

    /// The snippet directory as referenced from inside the template directory.
    ///
    /// Falls back to the resolved snippet directory when either configured path is absolute or
    /// climbs out of the root, since a relative path can't be worked out from names alone.
    pub fn include_path(&self) -> String {
        fn escapes(p: &Path) -> bool {
            p.is_absolute() || p.components().any(|c| matches!(c, Component::ParentDir))
        }

        let paths = &self.config.paths;
        if escapes(&paths.snippet_dir) || escapes(&paths.template_dir) {
            return path_to_slashes(&self.snippet_dir());
        }
        path_to_slashes(&relative_path(&paths.template_dir, &paths.snippet_dir))
    }
}

/// Express `to` relative to `from`, where both are relative to the same base directory.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    fn normal(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }
    let from = normal(from);
    let to_components = normal(to);

    let common = from
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(test)]
mod test {
    use super::*;

    fn project() -> Project {
        Project::new("/work", Configuration::default(), "notebook-build")
    }

    #[test]
    fn can_resolve_default_layout() {
        let project = project();
        assert_eq!(project.main_document(), PathBuf::from("/work/template/main.tex"));
        assert_eq!(project.fragment(), PathBuf::from("/work/template/sections.tex"));
        assert_eq!(project.artifact(), PathBuf::from("/work/notebook.pdf"));
        assert_eq!(project.produced_artifact_name(), PathBuf::from("main.pdf"));
        assert_eq!(project.typesetter_log(), PathBuf::from("/work/template/main.log"));
        assert_eq!(project.include_path(), "../codes");
    }

    #[test]
    fn snippet_dir_is_checked_at_the_root() {
        let required = project().required_paths();
        assert_eq!(
            required[0],
            ("codes".to_string(), PathBuf::from("/work/codes"))
        );
        assert_eq!(
            required[1],
            ("main.tex".to_string(), PathBuf::from("/work/template/main.tex"))
        );
        assert_eq!(required.len(), 3);
    }

    #[test]
    fn can_compute_relative_paths() {
        assert_eq!(
            relative_path(Path::new("template"), Path::new("codes")),
            PathBuf::from("../codes")
        );
        assert_eq!(
            relative_path(Path::new("docs/template"), Path::new("docs/codes")),
            PathBuf::from("../codes")
        );
        assert_eq!(
            relative_path(Path::new("./template/tex"), Path::new("snippets/cpp")),
            PathBuf::from("../../snippets/cpp")
        );
        assert_eq!(
            relative_path(Path::new("template"), Path::new("template/codes")),
            PathBuf::from("codes")
        );
        assert_eq!(
            relative_path(Path::new("template"), Path::new("template")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn include_path_reaches_snippets_from_template_outside_root() {
        let base = tempfile::tempdir().expect("can create temp dir");
        let root = base.path().join("nb");
        std::fs::create_dir_all(root.join("codes")).expect("can create codes dir");
        std::fs::create_dir_all(base.path().join("template")).expect("can create template dir");

        let mut config = Configuration::default();
        config.paths.template_dir = PathBuf::from("../template");
        let project = Project::new(&root, config, "notebook-build");

        let include = project.include_path();
        assert!(
            project.template_dir().join(&include).is_dir(),
            "{include} does not resolve from the template dir"
        );
    }

    #[test]
    fn include_path_follows_snippets_outside_root() {
        let base = tempfile::tempdir().expect("can create temp dir");
        let root = base.path().join("nb");
        std::fs::create_dir_all(root.join("tex/template")).expect("can create template dir");
        std::fs::create_dir_all(base.path().join("shared")).expect("can create snippet dir");

        let mut config = Configuration::default();
        config.paths.template_dir = PathBuf::from("tex/template");
        config.paths.snippet_dir = PathBuf::from("../shared");
        let project = Project::new(&root, config, "notebook-build");

        let include = project.include_path();
        assert!(project.template_dir().join(&include).is_dir());
    }

    #[test]
    fn locates_artifact_in_output_dir_first() {
        let root = tempfile::tempdir().expect("can create temp dir");
        let project = Project::new(root.path(), Configuration::default(), "notebook-build");
        assert_eq!(project.locate_artifact(), None);

        std::fs::create_dir_all(project.template_dir()).expect("can create template dir");
        std::fs::write(project.template_dir().join("main.pdf"), "%PDF").expect("can write");
        assert_eq!(
            project.locate_artifact(),
            Some(project.template_dir().join("main.pdf"))
        );

        std::fs::create_dir_all(project.output_dir()).expect("can create output dir");
        std::fs::write(project.output_dir().join("main.pdf"), "%PDF").expect("can write");
        assert_eq!(
            project.locate_artifact(),
            Some(project.output_dir().join("main.pdf"))
        );
    }
}
