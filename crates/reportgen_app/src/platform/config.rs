use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use reportgen_engine::{ClientSettings, EngineSettings, PacingSettings};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

const CONFIG_FILENAME: &str = "reportgen.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub stage_interval_ms: u64,
    pub reveal_delay_ms: u64,
    pub max_response_bytes: u64,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let pacing = PacingSettings::default();
        Self {
            endpoint: client.endpoint,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            stage_interval_ms: duration_ms(pacing.stage_interval),
            reveal_delay_ms: duration_ms(pacing.reveal_delay),
            max_response_bytes: client.max_response_bytes,
            output_dir: PathBuf::from("reports"),
            log_destination: LogDestination::default(),
        }
    }
}

impl ClientConfig {
    pub fn client_settings(&self, endpoint_override: Option<&str>) -> ClientSettings {
        ClientSettings {
            endpoint: endpoint_override.unwrap_or(&self.endpoint).to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_response_bytes: self.max_response_bytes,
        }
    }

    pub fn engine_settings(&self, endpoint_override: Option<&str>) -> EngineSettings {
        EngineSettings {
            client: self.client_settings(endpoint_override),
            pacing: PacingSettings {
                stage_interval: Duration::from_millis(self.stage_interval_ms),
                reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            },
        }
    }
}

/// Config plus a problem worth logging once the logger is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ClientConfig,
    pub warning: Option<String>,
}

/// Load the config from `explicit` or `./reportgen.ron`.
///
/// An explicit path must be readable. A missing default file means defaults.
/// A file that does not parse falls back to defaults with a warning.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<LoadedConfig> {
    let content = match explicit {
        Some(path) => Some((
            path.to_path_buf(),
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
        )),
        None => {
            let path = PathBuf::from(CONFIG_FILENAME);
            match fs::read_to_string(&path) {
                Ok(text) => Some((path, text)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => {
                    return Ok(LoadedConfig {
                        config: ClientConfig::default(),
                        warning: Some(format!("Failed to read config from {:?}: {}", path, err)),
                    });
                }
            }
        }
    };

    let Some((path, text)) = content else {
        return Ok(LoadedConfig {
            config: ClientConfig::default(),
            warning: None,
        });
    };

    Ok(match parse(&text) {
        Ok(config) => LoadedConfig {
            config,
            warning: None,
        },
        Err(err) => LoadedConfig {
            config: ClientConfig::default(),
            warning: Some(format!("Failed to parse config from {:?}: {}", path, err)),
        },
    })
}

pub fn parse(text: &str) -> Result<ClientConfig, ron::error::SpannedError> {
    ron::from_str(text)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults_for_missing_fields() {
        let config = parse(
            r#"(
                endpoint: "http://pipeline.internal:4000/process",
                stage_interval_ms: 250,
                log_destination: Both,
            )"#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://pipeline.internal:4000/process");
        assert_eq!(config.stage_interval_ms, 250);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.reveal_delay_ms, 500);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn endpoint_override_wins() {
        let config = ClientConfig::default();
        let settings = config.engine_settings(Some("http://other:9000/process"));
        assert_eq!(settings.client.endpoint, "http://other:9000/process");
        assert_eq!(settings.pacing.reveal_delay, Duration::from_millis(500));
    }

    #[test]
    fn invalid_file_falls_back_with_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reportgen.ron");
        fs::write(&path, "(endpoint: 42)").unwrap();

        let loaded = load(Some(&path)).unwrap();

        assert_eq!(loaded.config, ClientConfig::default());
        assert!(loaded.warning.unwrap().contains("Failed to parse config"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.ron"))).is_err());
    }
}
