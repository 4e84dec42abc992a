use std::path::PathBuf;

use crate::RepositoryError;
use secrecy::SecretString;

pub const DEFAULT_DATA_PATH: &str = "gaintrack_workouts.json";
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Where session history is read from.
#[derive(Clone, Debug)]
pub enum Backend {
    /// JSON document exported from on-device storage.
    Local { data_path: PathBuf },
    /// GainTrack REST API.
    Remote {
        base_url: String,
        api_token: SecretString,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: Backend,
    /// Most recent workouts to consider per request.
    pub history_limit: u32,
    pub max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, RepositoryError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, RepositoryError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let backend_kind = get("GAINTRACK_BACKEND").unwrap_or_else(|| "local".into());
        let backend = match backend_kind.trim().to_ascii_lowercase().as_str() {
            "local" => Backend::Local {
                data_path: get("GAINTRACK_DATA_PATH")
                    .unwrap_or_else(|| DEFAULT_DATA_PATH.into())
                    .into(),
            },
            "remote" => {
                let base_url = get("GAINTRACK_API_URL").ok_or_else(|| {
                    RepositoryError::Config("GAINTRACK_API_URL missing".into())
                })?;
                let token = get("GAINTRACK_API_TOKEN").ok_or_else(|| {
                    RepositoryError::Config("GAINTRACK_API_TOKEN missing".into())
                })?;
                Backend::Remote {
                    base_url,
                    api_token: SecretString::new(token.into()),
                }
            }
            other => {
                return Err(RepositoryError::Config(format!(
                    "unknown GAINTRACK_BACKEND: {other}"
                )));
            }
        };

        let history_limit = parse_u32(&mut get, "GAINTRACK_HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        if history_limit == 0 {
            return Err(RepositoryError::Config(
                "GAINTRACK_HISTORY_LIMIT must be positive".into(),
            ));
        }
        let max_retries = parse_u32(&mut get, "GAINTRACK_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

        Ok(Self {
            backend,
            history_limit,
            max_retries,
        })
    }
}

fn parse_u32<F>(get: &mut F, key: &str, default: u32) -> Result<u32, RepositoryError>
where
    F: FnMut(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RepositoryError::Config(format!("{key} must be an integer, got {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults_to_local_store() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        match cfg.backend {
            Backend::Local { data_path } => {
                assert_eq!(data_path, PathBuf::from(DEFAULT_DATA_PATH))
            }
            Backend::Remote { .. } => panic!("expected local backend"),
        }
        assert_eq!(cfg.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(cfg.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn from_env_remote_requires_token() {
        let get = |k: &str| match k {
            "GAINTRACK_BACKEND" => Some("remote".into()),
            "GAINTRACK_API_URL" => Some("http://localhost".into()),
            _ => None,
        };
        let res = Config::from_env_with(get);
        assert!(matches!(res, Err(RepositoryError::Config(_))));
    }

    #[test]
    fn from_env_reads_remote_values() {
        let get = |k: &str| match k {
            "GAINTRACK_BACKEND" => Some("Remote".into()),
            "GAINTRACK_API_URL" => Some("http://localhost".into()),
            "GAINTRACK_API_TOKEN" => Some("sekrit".into()),
            "GAINTRACK_HISTORY_LIMIT" => Some("20".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.history_limit, 20);
        match cfg.backend {
            Backend::Remote { base_url, .. } => assert_eq!(base_url, "http://localhost"),
            Backend::Local { .. } => panic!("expected remote backend"),
        }
    }

    #[test]
    fn from_env_rejects_bad_numbers_and_backends() {
        let bad_limit = |k: &str| match k {
            "GAINTRACK_HISTORY_LIMIT" => Some("lots".into()),
            _ => None,
        };
        assert!(Config::from_env_with(bad_limit).is_err());

        let zero_limit = |k: &str| match k {
            "GAINTRACK_HISTORY_LIMIT" => Some("0".into()),
            _ => None,
        };
        assert!(Config::from_env_with(zero_limit).is_err());

        let bad_backend = |k: &str| match k {
            "GAINTRACK_BACKEND" => Some("cloud".into()),
            _ => None,
        };
        assert!(Config::from_env_with(bad_backend).is_err());
    }
}
