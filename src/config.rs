use anyhow::ensure;
use protection::{calibration, CalibrationConfig};
use sensors::ADC_MAX;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calibration: CalibrationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSection {
    pub light_threshold: u16,
    pub wind_factor: f32,
    pub wind_max: f32,
    pub travel_duration_ms: u64,
    pub settle_duration_ms: u64,
    pub cycle_interval_ms: u64,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        CalibrationSection {
            light_threshold: calibration::LIGHT_THRESHOLD,
            wind_factor: calibration::WIND_FACTOR,
            wind_max: calibration::WIND_MAX,
            travel_duration_ms: calibration::TRAVEL_DURATION.as_millis() as u64,
            settle_duration_ms: calibration::SETTLE_DURATION.as_millis() as u64,
            cycle_interval_ms: calibration::CYCLE_INTERVAL.as_millis() as u64,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // Try external file first
        if Path::new(CONFIG_PATH).exists() {
            let config_content = fs::read_to_string(CONFIG_PATH)?;
            let config = Config::from_toml(&config_content)?;
            log::info!("Loaded configuration from {}", CONFIG_PATH);
            Ok(config)
        } else {
            // Fallback to embedded defaults
            let config = Config::from_toml(include_str!("../config.toml.example"))?;
            log::warn!("Using embedded default configuration");
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let c = &self.calibration;
        ensure!(
            c.light_threshold <= ADC_MAX,
            "light_threshold {} above ADC range 0-{}",
            c.light_threshold,
            ADC_MAX
        );
        ensure!(
            c.wind_factor.is_finite() && c.wind_factor > 0.0,
            "wind_factor must be a positive number"
        );
        ensure!(
            c.wind_max.is_finite() && c.wind_max >= 0.0,
            "wind_max must be a non-negative number"
        );
        ensure!(c.travel_duration_ms > 0, "travel_duration_ms must be non-zero");
        ensure!(c.cycle_interval_ms > 0, "cycle_interval_ms must be non-zero");
        Ok(())
    }

    pub fn calibration(&self) -> CalibrationConfig {
        let c = &self.calibration;
        CalibrationConfig {
            light_threshold: c.light_threshold,
            wind_factor: c.wind_factor,
            wind_max: c.wind_max,
            travel_duration: Duration::from_millis(c.travel_duration_ms),
            settle_duration: Duration::from_millis(c.settle_duration_ms),
            cycle_interval: Duration::from_millis(c.cycle_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_example_matches_built_in_calibration() {
        let config = Config::from_toml(include_str!("../config.toml.example")).unwrap();
        assert_eq!(config.calibration(), CalibrationConfig::default());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_toml("[calibration]\nwind_max = 25.0\n").unwrap();
        let calibration = config.calibration();

        assert_eq!(calibration.wind_max, 25.0);
        assert_eq!(calibration.light_threshold, 400);
        assert_eq!(calibration.travel_duration, Duration::from_secs(5));
    }

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.calibration(), CalibrationConfig::default());
    }

    #[test]
    fn threshold_outside_adc_range_is_rejected() {
        assert!(Config::from_toml("[calibration]\nlight_threshold = 2048\n").is_err());
    }

    #[test]
    fn zero_travel_is_rejected() {
        assert!(Config::from_toml("[calibration]\ntravel_duration_ms = 0\n").is_err());
    }

    #[test]
    fn non_finite_wind_settings_are_rejected() {
        assert!(Config::from_toml("[calibration]\nwind_max = inf\n").is_err());
        assert!(Config::from_toml("[calibration]\nwind_max = nan\n").is_err());
        assert!(Config::from_toml("[calibration]\nwind_factor = inf\n").is_err());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(Config::from_toml("[calibration]\nwind_max = \"strong\"\n").is_err());
    }
}
