use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Total bytes the slot store may hold across all slots.
    #[serde(default = "default_store_capacity")]
    pub store_capacity: u64,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_cover_url")]
    pub cover_url: String,
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default = "default_cors_proxy_url")]
    pub cors_proxy_url: String,
    /// Seconds before a single page fetch attempt is abandoned.
    #[serde(default = "default_page_timeout")]
    pub page_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: yomu_home().join("config.yml"),
            port: default_port(),
            data_path: default_data_path(),
            store_capacity: default_store_capacity(),
            api_url: default_api_url(),
            cover_url: default_cover_url(),
            relay_url: default_relay_url(),
            cors_proxy_url: default_cors_proxy_url(),
            page_timeout: default_page_timeout(),
        }
    }
}

fn yomu_home() -> PathBuf {
    match std::env::var("YOMU_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir().expect("should have home").join(".yomu"),
    }
}

fn default_port() -> u16 {
    3001
}

fn default_data_path() -> String {
    let path = yomu_home().join("data");
    if !path.exists() {
        let _ = std::fs::create_dir_all(&path);
    }
    path.display().to_string()
}

fn default_store_capacity() -> u64 {
    5 * 1024 * 1024
}

fn default_api_url() -> String {
    "https://api.mangadex.org".to_string()
}

fn default_cover_url() -> String {
    "https://uploads.mangadex.org/covers".to_string()
}

fn default_relay_url() -> String {
    format!("http://localhost:{}", default_port())
}

fn default_cors_proxy_url() -> String {
    "https://corsproxy.io/?".to_string()
}

fn default_page_timeout() -> u64 {
    10
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => yomu_home().join("config.yml"),
        };

        match std::fs::File::open(config_path.clone()) {
            Ok(file) => {
                info!("open config from {config_path:?}");
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }
}
