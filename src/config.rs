//! Project configuration, loaded from `notebook.toml`.
//!
//! Every field has a default matching the conventional notebook layout:
//!
//! ```text
//! codes/                 snippet directory
//! template/main.tex      document entry point
//! template/math_formulas.tex
//! notebook.pdf           final artifact
//! ```
//!
//! A missing configuration file is not an error; the defaults are used as-is.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "notebook.toml";
pub const DEFAULT_FRAGMENT: &str = "sections.tex";
pub const DEFAULT_EXTENSION: &str = "cpp";
pub const DEFAULT_LANGUAGE: &str = "cpp";
pub const DEFAULT_RESERVED_NAME: &str = "0custom";
pub const DEFAULT_RESERVED_TITLE: &str = "Custom Codes";

/// Complete configuration for a notebook project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Shown in the banner at the start of a build
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub snippets: Snippets,
    #[serde(default)]
    pub tools: Tools,
}

fn default_title() -> String {
    "Competitive Programming Notebook".to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            title: default_title(),
            paths: Paths::default(),
            snippets: Snippets::default(),
            tools: Tools::default(),
        }
    }
}

/// Filesystem layout.
///
/// `template_dir`, `snippet_dir`, `output_dir` and `artifact` are relative to the project root.
/// Everything else is relative to `template_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub snippet_dir: PathBuf,
    /// Document entry point handed to the typesetter
    pub main_document: PathBuf,
    /// Files that must exist before anything is run
    pub required_template_files: Vec<PathBuf>,
    /// Generated sections fragment, `\input` by the main document
    pub fragment: PathBuf,
    /// Where the typesetter may be configured to place its output
    pub output_dir: PathBuf,
    /// Canonical location of the finished notebook
    pub artifact: PathBuf,
    /// Intermediate files and directories removed after every build
    pub auxiliary: Vec<PathBuf>,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            template_dir: PathBuf::from("template"),
            snippet_dir: PathBuf::from("codes"),
            main_document: PathBuf::from("main.tex"),
            required_template_files: vec![
                PathBuf::from("main.tex"),
                PathBuf::from("math_formulas.tex"),
            ],
            fragment: PathBuf::from(DEFAULT_FRAGMENT),
            output_dir: PathBuf::from("build_output"),
            artifact: PathBuf::from("notebook.pdf"),
            auxiliary: [
                "main.aux",
                "main.log",
                "main.out",
                "main.toc",
                DEFAULT_FRAGMENT,
                "_minted",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
        }
    }
}

/// How snippet files are recognised and titled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snippets {
    /// File extension (without the dot) that marks a file as a snippet
    pub extension: String,
    /// Lexer name passed to `\inputminted`
    pub language: String,
    /// Base name that gets `reserved_title` instead of a derived title
    pub reserved_name: String,
    pub reserved_title: String,
}

impl Default for Snippets {
    fn default() -> Self {
        Snippets {
            extension: DEFAULT_EXTENSION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            reserved_name: DEFAULT_RESERVED_NAME.to_string(),
            reserved_title: DEFAULT_RESERVED_TITLE.to_string(),
        }
    }
}

/// External programs the build depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// Scripting runtime hosting the syntax highlighter
    pub interpreter: String,
    pub typesetter: String,
    /// Module imported through `interpreter` to verify the highlighter is installed
    pub highlighter_module: String,
    /// Number of typesetter runs; the last one lets the total page count settle
    pub passes: u32,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            interpreter: "python3".to_string(),
            typesetter: "pdflatex".to_string(),
            highlighter_module: "pygments".to_string(),
            passes: 3,
        }
    }
}

impl Configuration {
    /// Load the configuration at `path`, falling back to the defaults when it doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!(
                "no configuration at {}, using the default layout",
                path.display()
            );
            return Ok(Configuration::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        let config: Configuration = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tools.passes == 0 {
            return Err(anyhow!("tools.passes must be at least 1"));
        }
        if self.snippets.extension.trim().is_empty() {
            return Err(anyhow!("snippets.extension must not be empty"));
        }
        Ok(())
    }
}
