//! Run configuration assembled from a JSON file and environment overrides.

use anyhow::{Context, Result};
use std::path::Path;
use vivarium_core::SimulationConfig;

pub const CONFIG_ENV: &str = "VIVARIUM_CONFIG";
pub const TICKS_ENV: &str = "VIVARIUM_TICKS";
pub const SEED_ENV: &str = "VIVARIUM_SEED";

/// Ticks to run when neither the file nor the environment says otherwise
pub const DEFAULT_TICKS: u64 = 1000;

pub fn load() -> Result<SimulationConfig> {
    let base = match std::env::var_os(CONFIG_ENV) {
        Some(path) => from_file(Path::new(&path))?,
        None => SimulationConfig::new(DEFAULT_TICKS, 0),
    };
    let config = apply_overrides(
        base,
        std::env::var(TICKS_ENV).ok().as_deref(),
        std::env::var(SEED_ENV).ok().as_deref(),
    )?;
    config.validate().context("invalid simulation configuration")?;
    Ok(config)
}

fn from_file(path: &Path) -> Result<SimulationConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut config: SimulationConfig = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    if config.num_ticks == 0 {
        config.num_ticks = DEFAULT_TICKS;
    }
    Ok(config)
}

pub fn apply_overrides(
    mut config: SimulationConfig,
    ticks: Option<&str>,
    seed: Option<&str>,
) -> Result<SimulationConfig> {
    if let Some(ticks) = ticks {
        config.num_ticks = ticks
            .trim()
            .parse()
            .with_context(|| format!("{TICKS_ENV} must be a tick count, got {ticks:?}"))?;
    }
    if let Some(seed) = seed {
        config.seed = seed
            .trim()
            .parse()
            .with_context(|| format!("{SEED_ENV} must be an unsigned integer, got {seed:?}"))?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let config = apply_overrides(SimulationConfig::new(10, 1), Some("250"), Some(" 77 ")).unwrap();
        assert_eq!(config.num_ticks, 250);
        assert_eq!(config.seed, 77);
    }

    #[test]
    fn test_missing_overrides_keep_base() {
        let config = apply_overrides(SimulationConfig::new(10, 1), None, None).unwrap();
        assert_eq!(config.num_ticks, 10);
        assert_eq!(config.seed, 1);
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let err = apply_overrides(SimulationConfig::default(), Some("many"), None).unwrap_err();
        assert!(err.to_string().contains(TICKS_ENV));
    }

    #[test]
    fn test_config_file() {
        let path = std::env::temp_dir().join(format!("vivarium-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"seed": 9, "world": {"soil_quality": 80}}"#).unwrap();
        let config = from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.seed, 9);
        assert_eq!(config.num_ticks, DEFAULT_TICKS);
        assert_eq!(config.world.soil_quality, 80);
        assert_eq!(config.world.width, 20);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = from_file(Path::new("/nonexistent/vivarium.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vivarium.json"));
    }
}
