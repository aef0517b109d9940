//! `autotune config` — Configuration management commands.

use autotune_config::AppConfig;

use super::CommandResult;

pub fn validate() -> CommandResult {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            for (what, path) in [
                ("Extra rules file", &config.catalog.rules),
                ("Extra workflows file", &config.catalog.workflows),
            ] {
                if let Some(path) = path {
                    if !path.exists() {
                        warnings.push(format!("{what} not found: {}", path.display()));
                    }
                }
            }
            let settings_path = config.settings_path();
            if !settings_path.exists() {
                warnings.push(format!(
                    "Editor settings not found at {} (apply will create it)",
                    settings_path.display()
                ));
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Rules file:    {}", config.paths.rules_file);
            println!("   Workflows dir: {}", config.paths.workflows_dir);
            println!("   Settings:      {}", settings_path.display());
            println!("   Key prefix:    {}", config.output.settings_prefix);
            println!("   Log level:     {}", config.logging.level);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show() -> CommandResult {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path() -> CommandResult {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

pub fn init() -> CommandResult {
    let path = AppConfig::config_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}
