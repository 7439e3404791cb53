use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REGION: &str = "us-west-2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ses {
        #[serde(default = "default_region")]
        region: String,
    },
    Smtp {
        relay: String,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn parse_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

fn load_from_env<F>(var: F) -> Result<Config, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match var("EMAIL_RELAY_PORT") {
        Some(port) => port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse EMAIL_RELAY_PORT: {e}"))?,
        None => DEFAULT_PORT,
    };

    let kind = var("EMAIL_RELAY_PROVIDER").unwrap_or_else(|| "ses".to_string());

    let provider = match kind.as_str() {
        "ses" => ProviderConfig::Ses {
            region: var("AWS_REGION").unwrap_or_else(default_region),
        },
        "smtp" => ProviderConfig::Smtp {
            relay: var("SMTP_RELAY").ok_or("SMTP_RELAY environment variable is required")?,
            port: var("SMTP_PORT")
                .map(|p| p.parse::<u16>())
                .transpose()
                .map_err(|e| format!("Failed to parse SMTP_PORT: {e}"))?,
            username: var("SMTP_USERNAME"),
            password: var("SMTP_PASSWORD"),
        },
        other => return Err(format!("Unknown EMAIL_RELAY_PROVIDER '{other}'").into()),
    };

    Ok(Config { port, provider })
}

const FALLBACK_PATHS: [&str; 2] = ["config.yaml", EXAMPLE_PATH];
const EXAMPLE_PATH: &str = "config.example.yaml";

// Explicit path first (if any), then the fallbacks, without repeats
fn candidate_paths(explicit: Option<String>) -> Vec<String> {
    let mut paths: Vec<String> = explicit.into_iter().collect();
    for fallback in FALLBACK_PATHS {
        if !paths.iter().any(|p| p == fallback) {
            paths.push(fallback.to_string());
        }
    }
    paths
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let candidates = candidate_paths(env::var("EMAIL_RELAY_CONFIG").ok());

    for (i, path) in candidates.iter().enumerate() {
        if !Path::new(path).exists() {
            continue;
        }

        if i > 0 {
            tracing::warn!(
                "Config file '{}' not found, falling back to '{}'",
                candidates[..i].join("', '"),
                path
            );
        }

        if path == EXAMPLE_PATH {
            tracing::warn!("This file should not be used and should be replaced with actual data");
        }

        return parse_file(path);
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env(|key| env::var(key).ok()).map_err(|e| {
        format!(
            "Config file not found and environment variables are incomplete. \
             Tried: '{}' and environment variables. \
             Error: {e}",
            candidates.join("', '")
        )
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn ses_region_defaults_to_us_west_2() {
        let cfg: Config = serde_yaml::from_str("provider:\n  kind: ses\n").unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.provider,
            ProviderConfig::Ses {
                region: "us-west-2".to_string()
            }
        );
    }

    #[test]
    fn smtp_provider_parses_from_yaml() {
        let yaml = "port: 9000\nprovider:\n  kind: smtp\n  relay: smtp.example.com\n  port: 587\n  username: user\n  password: secret\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.port, 9000);
        assert_eq!(
            cfg.provider,
            ProviderConfig::Smtp {
                relay: "smtp.example.com".to_string(),
                port: Some(587),
                username: Some("user".to_string()),
                password: Some("secret".to_string()),
            }
        );
    }

    #[test]
    fn unknown_provider_kind_is_rejected() {
        let result = serde_yaml::from_str::<Config>("provider:\n  kind: carrier-pigeon\n");
        assert!(result.is_err());
    }

    #[test]
    fn config_yaml_is_tried_once_without_explicit_path() {
        assert_eq!(
            candidate_paths(None),
            vec!["config.yaml".to_string(), "config.example.yaml".to_string()]
        );
    }

    #[test]
    fn explicit_path_comes_before_fallbacks() {
        assert_eq!(
            candidate_paths(Some("/etc/relay.yaml".to_string())),
            vec![
                "/etc/relay.yaml".to_string(),
                "config.yaml".to_string(),
                "config.example.yaml".to_string()
            ]
        );
    }

    #[test]
    fn explicit_config_yaml_is_not_repeated() {
        assert_eq!(
            candidate_paths(Some("config.yaml".to_string())),
            vec!["config.yaml".to_string(), "config.example.yaml".to_string()]
        );
    }

    #[test]
    fn env_defaults_to_ses() {
        let cfg = load_from_env(env_of(&[("AWS_REGION", "eu-central-1")])).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.provider,
            ProviderConfig::Ses {
                region: "eu-central-1".to_string()
            }
        );
    }

    #[test]
    fn env_smtp_requires_relay() {
        let err = load_from_env(env_of(&[("EMAIL_RELAY_PROVIDER", "smtp")])).unwrap_err();
        assert!(err.to_string().contains("SMTP_RELAY"));
    }

    #[test]
    fn env_rejects_bad_port() {
        let err = load_from_env(env_of(&[("EMAIL_RELAY_PORT", "not-a-port")])).unwrap_err();
        assert!(err.to_string().contains("EMAIL_RELAY_PORT"));
    }
}
