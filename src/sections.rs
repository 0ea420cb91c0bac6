//! Generation of the sections fragment from the snippet directory.
//!
//! Each snippet becomes one `\section` whose title is derived from its file name, followed by
//! an `\inputminted` directive pointing back at the snippet. The fragment is always rewritten
//! in full; nothing is carried over from a previous run.

use crate::cli::SectionsArgs;
use crate::config::Snippets;
use crate::error::SectionsError;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path};

/// Characters that have to be prefixed with a backslash inside a section title.
const RESERVED_CHARACTERS: &[char] = &['&', '%', '$', '#', '{', '}'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub filename: String,
    pub title: String,
}

/// The generated document fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub sections: Vec<Section>,
    /// `\inputminted` lexer name
    pub language: String,
    /// Snippet directory as seen from the document, using `/` separators
    pub include_path: String,
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let include_path = self.include_path.trim_end_matches('/');
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "\t\t\\section{{{}}}", section.title)?;
            if include_path.is_empty() {
                writeln!(f, "\t\t\\inputminted{{{}}}{{{}}}", self.language, section.filename)?;
            } else {
                writeln!(
                    f,
                    "\t\t\\inputminted{{{}}}{{{}/{}}}",
                    self.language, include_path, section.filename
                )?;
            }
        }
        Ok(())
    }
}

/// Derive the section title for a snippet file name.
pub fn section_title(filename: &str, rules: &Snippets) -> String {
    let suffix = format!(".{}", rules.extension);
    let name = filename.strip_suffix(&suffix).unwrap_or(filename);

    if name.eq_ignore_ascii_case(&rules.reserved_name) {
        return rules.reserved_title.clone();
    }

    let name = name.replace('_', " ");
    let name = escape_markup(&name);

    name.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED_CHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Uppercase the first character and lowercase the rest.
fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Order snippet file names case-insensitively, falling back to byte order so the result is
/// total and stable.
pub fn compare_filenames(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// List the snippet files directly inside `dir`, sorted.
pub fn list_snippets(dir: &Path, extension: &str) -> Result<Vec<String>, SectionsError> {
    if !dir.is_dir() {
        return Err(SectionsError::MissingSnippetDir(dir.to_path_buf()));
    }

    let read_error = |source: std::io::Error| SectionsError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let suffix = format!(".{extension}");

    let mut files: Vec<String> = Vec::default();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            log::warn!(
                "skipping {} as its name isn't valid UTF-8",
                entry.path().display()
            );
            continue;
        };
        if !name.ends_with(&suffix) || !entry.path().is_file() {
            continue;
        }
        files.push(name);
    }

    files.sort_by(|a, b| compare_filenames(a, b));
    Ok(files)
}

/// Build the fragment for every snippet in `dir`.
pub fn generate(dir: &Path, rules: &Snippets, include_path: &str) -> Result<Fragment, SectionsError> {
    let sections = list_snippets(dir, &rules.extension)?
        .into_iter()
        .map(|filename| Section {
            title: section_title(&filename, rules),
            filename,
        })
        .collect();

    Ok(Fragment {
        sections,
        language: rules.language.clone(),
        include_path: include_path.to_string(),
    })
}

/// Entry point of the `sections` command.
///
/// The fragment file is only written once the snippet directory has been read successfully,
/// so a missing directory leaves any existing fragment untouched.
pub fn run(args: &SectionsArgs) -> Result<()> {
    let rules = args.rules();
    let include_path = args
        .include_path
        .clone()
        .unwrap_or_else(|| path_to_slashes(&args.snippets));

    let fragment = generate(&args.snippets, &rules, &include_path)
        .with_context(|| "Failed to generate sections")?;

    std::fs::write(&args.output, fragment.to_string())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("{} {}", console::style("✓").green(), summary(&args.output, &fragment));
    Ok(())
}

fn summary(output: &Path, fragment: &Fragment) -> String {
    format!(
        "Generated {} with {} sections\n  Now typeset the main document with -shell-escape",
        output.display(),
        fragment.sections.len()
    )
}

/// Render a relative path with forward slashes, as the typesetter expects.
pub fn path_to_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
