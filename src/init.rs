//! The `init` command: write out the default configuration so it can be edited.

use crate::config::Configuration;
use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    let config = toml::to_string_pretty(&Configuration::default())
        .with_context(|| "Failed to convert configuration to TOML")?;

    if path.exists()
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "{} already exists, do you want to override it?",
                path.display()
            ))
            .default(false)
            .interact()?
    {
        println!("Configuration:");
        println!("{}", config);
    } else {
        std::fs::write(path, config).with_context(|| "Failed to write configuration file")?;
        println!("{} written!", path.display());
    }

    Ok(())
}
