use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    15
}

fn default_interval_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Root of the local media library; device commands refuse to run
    /// without it.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub allow_delete: bool,
    /// Platform URI schemes stripped when mapping a server-reported
    /// `device_uri` to a deletable asset identifier.
    #[serde(default = "default_uri_prefixes")]
    pub uri_prefixes: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            root: None,
            page_size: default_page_size(),
            allow_delete: false,
            uri_prefixes: default_uri_prefixes(),
        }
    }
}

fn default_page_size() -> usize {
    50
}

fn default_uri_prefixes() -> Vec<String> {
    vec![
        "ph://".to_string(),
        "content://".to_string(),
        "file://".to_string(),
    ]
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
