use anyhow::{Context, Result};
use cli::{Cli, Commands};
use config::Configuration;
use process::SystemRunner;
use project::Project;
use std::path::Path;
use std::process::ExitCode;

mod build;
mod cli;
mod config;
mod error;
mod init;
mod process;
mod project;
mod sections;
mod status;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.clone().unwrap_or(Commands::Build) {
        Commands::Build => {
            let project = load_project(&cli.config)?;
            build::run(&project, &SystemRunner)?;
            Ok(())
        }
        Commands::Sections(args) => sections::run(&args),
        Commands::Clean => {
            let project = load_project(&cli.config)?;
            build::cleanup(&project);
            Ok(())
        }
        Commands::Init => init::run(&cli.config),
    }
}

/// Anchor the configuration at the current directory.
fn load_project(config_path: &Path) -> Result<Project> {
    let root = std::env::current_dir().with_context(|| "Failed to get current directory")?;
    let config = Configuration::load(root.join(config_path))?;
    let generator = std::env::current_exe()
        .with_context(|| "Failed to locate the running executable")?;
    Ok(Project::new(root, config, generator))
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => "notebook_build=warn",
        1 => "notebook_build=debug",
        _ => "notebook_build=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // the `log` records emitted throughout the crate are bridged into this subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
