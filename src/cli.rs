use crate::config::{
    Snippets, DEFAULT_CONFIG_FILE, DEFAULT_EXTENSION, DEFAULT_FRAGMENT, DEFAULT_LANGUAGE,
    DEFAULT_RESERVED_NAME, DEFAULT_RESERVED_TITLE,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Checks requirements, generates sections, typesets the notebook and cleans up (the default)
    Build,
    /// Generates the sections fragment from the snippet directory
    Sections(SectionsArgs),
    /// Removes auxiliary files and the output directory left behind by the typesetter
    Clean,
    /// Writes a notebook.toml containing the default configuration
    Init,
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file, relative to the current directory
    #[clap(long, global = true, env = "NOTEBOOK_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log more detail to stderr (repeat for more)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct SectionsArgs {
    /// Directory containing the snippet files
    #[clap(long, default_value = "../codes")]
    pub snippets: PathBuf,
    /// Fragment file to write
    #[clap(long, default_value = DEFAULT_FRAGMENT)]
    pub output: PathBuf,
    /// Extension (without the dot) of snippet files
    #[clap(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,
    /// Lexer name used for syntax highlighting
    #[clap(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,
    /// Path used in the include directives, defaults to --snippets
    #[clap(long)]
    pub include_path: Option<String>,
    #[clap(long, default_value = DEFAULT_RESERVED_NAME)]
    pub reserved_name: String,
    #[clap(long, default_value = DEFAULT_RESERVED_TITLE)]
    pub reserved_title: String,
}

impl SectionsArgs {
    pub fn rules(&self) -> Snippets {
        Snippets {
            extension: self.extension.clone(),
            language: self.language.clone(),
            reserved_name: self.reserved_name.clone(),
            reserved_title: self.reserved_title.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn no_subcommand_means_build() {
        let cli = Cli::try_parse_from(["notebook-build"]).expect("can parse empty command line");
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn can_parse_sections_arguments() {
        let cli = Cli::try_parse_from([
            "notebook-build",
            "sections",
            "--snippets",
            "../snippets",
            "--extension",
            "py",
            "--language",
            "python",
        ])
        .expect("can parse sections command");

        let Some(Commands::Sections(args)) = cli.command else {
            panic!("expected the sections command");
        };
        assert_eq!(args.snippets, PathBuf::from("../snippets"));
        assert_eq!(args.output, PathBuf::from(DEFAULT_FRAGMENT));
        assert_eq!(args.rules().language, "python");
        assert_eq!(args.rules().reserved_title, DEFAULT_RESERVED_TITLE);
    }
}
