use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub yookassa: YookassaConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-pro".to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YookassaConfig {
    #[serde(default)]
    pub shop_id: String,
    #[serde(default)]
    pub secret_key: String,
    pub api_url: String,
}

impl Default for YookassaConfig {
    fn default() -> Self {
        Self {
            shop_id: String::new(),
            secret_key: String::new(),
            api_url: "https://api.yookassa.ru/v3/payments".to_string(),
        }
    }
}

impl YookassaConfig {
    pub fn is_configured(&self) -> bool {
        !self.shop_id.is_empty() && !self.secret_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            profiles_table: default_profiles_table(),
        }
    }
}

fn default_profiles_table() -> String {
    "profiles".to_string()
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.service_key.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty()
    }
}

impl Config {
    /// Loads `config.toml` (path overridable via `CONFIG_PATH`) when present,
    /// then applies environment-variable overrides. A missing file is fine;
    /// the secrets normally arrive through the environment. Missing secrets do
    /// not abort startup, the dependent routes answer with a configuration
    /// error instead.
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        use std::io::ErrorKind;

        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("Failed to parse {config_path}: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(format!("Failed to read {config_path}: {e}").into());
            }
        };

        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("GEMINI_API_KEY") {
            config.gemini.api_key = v;
        }
        if let Ok(v) = env::var("GEMINI_BASE_URL") {
            config.gemini.base_url = v;
        }
        if let Ok(v) = env::var("GEMINI_MODEL") {
            config.gemini.model = v;
        }
        if let Ok(v) = env::var("YOOKASSA_SHOP_ID") {
            config.yookassa.shop_id = v;
        }
        if let Ok(v) = env::var("YOOKASSA_SECRET_KEY") {
            config.yookassa.secret_key = v;
        }
        if let Ok(v) = env::var("YOOKASSA_API_URL") {
            config.yookassa.api_url = v;
        }
        if let Ok(v) = env::var("SUPABASE_URL") {
            config.supabase.url = v;
        }
        if let Ok(v) = env::var("SUPABASE_SERVICE_KEY") {
            config.supabase.service_key = v;
        }
        if let Ok(v) = env::var("SUPABASE_PROFILES_TABLE") {
            config.supabase.profiles_table = v;
        }
        if let Ok(v) = env::var("BOT_TOKEN") {
            config.telegram.bot_token = v;
        }
        if let Ok(v) = env::var("TELEGRAM_API_URL") {
            config.telegram.api_url = v;
        }

        if !config.gemini.is_configured()
            || !config.yookassa.is_configured()
            || !config.supabase.is_configured()
            || !config.telegram.is_configured()
        {
            log::warn!(
                "One or more integration secrets are missing; the affected routes will answer with a configuration error"
            );
        }

        Ok(config)
    }
}
