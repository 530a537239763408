//! Configuration view and validation commands for `policy-reviewers config`.

use anyhow::Result;

use crate::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use policy_reviewers::config::{ReviewersConfig, ReviewersToml, config_path};

    let config_path = config_path(project_dir);

    match command {
        None | Some(ConfigCommands::Show) => {
            // Show current configuration
            println!();
            println!("Reviewer Selection Configuration");
            println!("================================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                ReviewersToml::load(&config_path)?
            } else {
                println!("No reviewers.toml found at {}", config_path.display());
                println!("Using default configuration:");
                ReviewersToml::default()
            };
            println!();

            println!("[github]");
            println!("  api_url = \"{}\"", toml.github.api_url);
            println!("  token_env = \"{}\"", toml.github.token_env);
            println!("  user_agent = \"{}\"", toml.github.user_agent);
            println!();

            println!("[selection]");
            match toml.selection.seed {
                Some(seed) => println!("  seed = {}", seed),
                None => println!("  seed = (entropy)"),
            }
            println!();

            println!("[logging]");
            println!("  level = \"{}\"", toml.logging.level);
            println!("  format = \"{}\"", toml.logging.format);
            println!();

            println!("Effective values (with env overrides):");
            let config = ReviewersConfig::new(project_dir.to_path_buf(), None)?;
            println!("  api_url = \"{}\"", config.api_url);
            println!(
                "  token = {}",
                if config.token.is_some() { "set" } else { "not set" }
            );
            match config.seed {
                Some(seed) => println!("  seed = {}", seed),
                None => println!("  seed = (entropy)"),
            }
            println!();

            if !config_path.exists() {
                println!("Run 'policy-reviewers config init' to create a reviewers.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            // Validate configuration
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No reviewers.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = ReviewersToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            // Initialize default reviewers.toml
            if config_path.exists() {
                println!("reviewers.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            std::fs::create_dir_all(project_dir)?;
            ReviewersToml::default().save(&config_path)?;

            println!("Created reviewers.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [github] api_url, token_env, user_agent");
            println!("  - [selection] seed for reproducible picks");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
