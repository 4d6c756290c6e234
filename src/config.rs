use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got `{value}`")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub upload_folder: PathBuf,
    /// Where a trained model would be loaded from. Only reported at startup
    /// while the mock predictor is in use.
    pub model_path: PathBuf,
    pub predictor_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: None,
            upload_folder: PathBuf::from("uploads"),
            model_path: PathBuf::from("model/adhesion_detector_model.h5"),
            predictor_seed: None,
        }
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Invalid {
            key,
            expected,
            value,
        }),
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(v) => parse("PORT", "a port number", v)?,
            None => defaults.port,
        };
        let workers = match lookup("WORKERS") {
            Some(v) => Some(parse("WORKERS", "a worker count", v)?),
            None => defaults.workers,
        };
        let predictor_seed = match lookup("PREDICTOR_SEED") {
            Some(v) => Some(parse("PREDICTOR_SEED", "an unsigned integer", v)?),
            None => defaults.predictor_seed,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            workers,
            upload_folder: lookup("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_folder),
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            predictor_seed,
        })
    }

    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Creates the upload folder if it is missing. Uploads are processed in memory,
/// nothing is stored here today.
pub fn ensure_upload_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
