use anyhow::Result;
use std::path::Path;
use vidsnag_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("vidsnag configuration\n");
    print!("{}", config.to_toml()?);

    // Show config file locations
    println!("\nConfig sources (later entries override earlier ones):");
    println!("  1. Built-in defaults");
    if let Some(p) = Config::default_file() {
        let state = if p.exists() { "" } else { " (not present)" };
        println!("  2. {}{}", p.display(), state);
    }
    if let Some(p) = config_path {
        println!("  3. {} (specified)", p.display());
    }
    println!("  4. Environment variables (VIDSNAG_*, nested keys joined by __)");

    Ok(())
}
