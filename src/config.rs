use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Pexels API key; listing calls that need the provider fail without it
    #[serde(default)]
    pub pexels_api_key: Option<String>,

    /// Pexels API base URL
    #[serde(default = "default_pexels_api_url")]
    pub pexels_api_url: String,

    /// OpenAI API key; keyword synthesis falls back to fixed keywords without it
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Optional OpenAI organization id
    #[serde(default)]
    pub openai_org_id: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Model used for style keyword synthesis
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Model used for stylist chat replies
    #[serde(default = "default_openai_chat_model")]
    pub openai_chat_model: String,

    /// Directory holding the local photo catalog
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Optional gender classification rules document
    #[serde(default = "default_classification_rules")]
    pub classification_rules: PathBuf,

    /// Per-call timeout for outbound requests, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_pexels_api_url() -> String {
    "https://api.pexels.com".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_chat_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_classification_rules() -> PathBuf {
    PathBuf::from("images/classification.json")
}

fn default_upstream_timeout_secs() -> u64 {
    12
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
