use crate::cli::GenerateArgs;
use anyhow::{Context, Result};
use nodegen::GeneratorConfig;
use std::path::{Path, PathBuf};

/// Get the default generator config path
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("spiceweasel").join("config.toml"))
}

/// Load the generator config.
///
/// An explicit path must exist; the default path falls back to defaults.
pub fn load(path: Option<&Path>) -> Result<GeneratorConfig> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (config_path()?, false),
    };

    if !explicit && !path.exists() {
        log::debug!("Config file {} does not exist, using defaults", path.display());
        return Ok(GeneratorConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Could not read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid TOML format in {}", path.display()))?;

    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load the config file and layer the command line flags on top
pub fn resolve(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = load(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut GeneratorConfig, args: &GenerateArgs) {
    if args.novalidation {
        config.validate = false;
    }
    config.chef_client |= args.chefclient;
    config.bulk_delete |= args.bulkdelete;
    config.parallel |= args.parallel;

    if let Some(knife_config) = &args.knifeconfig {
        config.knife_options.push_str(&format!(" -c {knife_config}"));
    }
    if let Some(url) = &args.serverurl {
        config.knife_options.push_str(&format!(" --server-url {url}"));
    }
    if let Some(attribute) = &args.attribute {
        config.attribute = Some(attribute.clone());
    }
}
