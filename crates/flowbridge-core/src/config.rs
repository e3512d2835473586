use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3978; // Bot Framework convention
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_CONFIG_PATH: &str = "flowbridge.toml";

/// Environment variable names used by earlier deployments of the bot, mapped
/// onto config keys. They override both the TOML file and `FLOWBRIDGE_*`.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("MICROSOFT_APP_ID", "teams.app_id"),
    ("MICROSOFT_APP_PASSWORD", "teams.app_password"),
    ("MICROSOFT_APP_TYPE", "teams.app_type"),
    ("TEAMS_APP_TENANT_ID", "teams.tenant_id"),
    ("BOT_FLOWISE_API_ENDPOINT", "flowise.endpoint"),
    ("BOT_FLOWISE_CHATFLOW_ID", "flowise.chatflow_id"),
    ("BOT_FLOWISE_API_KEY", "flowise.api_key"),
    ("PORT", "gateway.port"),
];

/// Top-level config (flowbridge.toml + FLOWBRIDGE_* + legacy env overrides).
///
/// Loaded once at startup and handed to the clients by reference; nothing
/// reads the environment after that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
    #[serde(default)]
    pub flowise: FlowiseConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Bot identity registered with the Bot Framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsConfig {
    /// Microsoft App ID. When absent, outbound activities are sent without
    /// an Authorization header (local emulator).
    pub app_id: Option<String>,
    pub app_password: Option<String>,
    #[serde(default)]
    pub app_type: AppType,
    /// Only consulted for `single-tenant` apps.
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AppType {
    #[default]
    #[serde(alias = "MultiTenant")]
    MultiTenant,
    #[serde(alias = "SingleTenant")]
    SingleTenant,
}

impl TeamsConfig {
    /// Tenant segment of the token authority URL.
    pub fn authority_tenant(&self) -> &str {
        match self.app_type {
            AppType::MultiTenant => "botframework.com",
            AppType::SingleTenant => self
                .tenant_id
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("botframework.com"),
        }
    }
}

/// Remote Flowise chatflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowiseConfig {
    /// Base URL of the Flowise server, e.g. `https://flowise.example.com/`.
    pub endpoint: Option<String>,
    pub chatflow_id: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout. Unset keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl FlowiseConfig {
    /// `{endpoint}/api/v1/prediction/{chatflow_id}` with any trailing slash
    /// removed from the endpoint.
    ///
    /// Missing values are not rejected here: the URL is built from empty
    /// strings and the request fails at call time.
    pub fn prediction_url(&self) -> String {
        let base = self
            .endpoint
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/');
        let flow = self.chatflow_id.as_deref().unwrap_or_default();
        format!("{base}/api/v1/prediction/{flow}")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Leave fenced code bodies untouched by the header/list/emphasis passes.
    #[serde(default)]
    pub fence_aware: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl BridgeConfig {
    /// Load config from a TOML file, then `FLOWBRIDGE_*` env vars (nested
    /// with `__`, e.g. `FLOWBRIDGE_FLOWISE__API_KEY`), then the legacy
    /// variable names.
    ///
    /// A missing file is not an error; every value has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);

        let config: BridgeConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("FLOWBRIDGE_").split("__"))
            .merge(legacy_env())
            .extract()
            .map_err(|e| crate::error::BridgeError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Names of required settings that are absent or empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let checks = [
            ("flowise.endpoint", &self.flowise.endpoint),
            ("flowise.chatflow_id", &self.flowise.chatflow_id),
            ("flowise.api_key", &self.flowise.api_key),
            ("teams.app_id", &self.teams.app_id),
            ("teams.app_password", &self.teams.app_password),
        ];
        checks
            .into_iter()
            .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name)
            .collect()
    }

    /// Log the resolved settings without secrets and warn about gaps.
    pub fn log_summary(&self) {
        info!(
            endpoint = %self.flowise.prediction_url(),
            api_key = presence(&self.flowise.api_key),
            app_id = self.teams.app_id.as_deref().unwrap_or("-"),
            app_password = presence(&self.teams.app_password),
            app_type = ?self.teams.app_type,
            fence_aware = self.markup.fence_aware,
            "configuration loaded"
        );
        for name in self.missing_required() {
            warn!(setting = name, "required setting is missing");
        }
    }

    /// Copy of the config with secrets masked, for `--check-config`.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.flowise.api_key = copy.flowise.api_key.as_ref().map(|_| "***".to_string());
        copy.teams.app_password = copy.teams.app_password.as_ref().map(|_| "***".to_string());
        copy
    }
}

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => "present",
        _ => "missing",
    }
}

fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).into())
    })
}
