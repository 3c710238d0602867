use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const DEFAULT_HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_CLICKUP_BASE_URL: &str = "https://api.clickup.com/api/v2";
pub const DEFAULT_TASK_NAME_TEMPLATE: &str = "{email}";

/// Placeholders understood by `sync.task_name_template`.
pub const TASK_NAME_PLACEHOLDERS: [&str; 3] = ["{email}", "{firstname}", "{lastname}"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub hubspot: HubSpotConfig,
    #[serde(default)]
    pub clickup: ClickUpConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: None,
            port: None,
            user: None,
            password: None,
            name: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// CRM (HubSpot) credentials and endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HubSpotConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_hubspot_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self { api_key: String::new(), base_url: default_hubspot_base_url(), timeout_secs: default_request_timeout() }
    }
}

/// Task board (ClickUp) credentials, target list and endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickUpConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub list_id: String,
    #[serde(default = "default_clickup_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClickUpConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            list_id: String::new(),
            base_url: default_clickup_base_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Rule mapping a contact to its task-board task name.
    #[serde(default = "default_task_name_template")]
    pub task_name_template: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { task_name_template: default_task_name_template() }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_request_timeout() -> u64 { 10 }
fn default_hubspot_base_url() -> String { DEFAULT_HUBSPOT_BASE_URL.to_string() }
fn default_clickup_base_url() -> String { DEFAULT_CLICKUP_BASE_URL.to_string() }
fn default_task_name_template() -> String { DEFAULT_TASK_NAME_TEMPLATE.to_string() }

/// Parse a set variable; unset yields `None`, unparsable is an error naming the variable.
fn parse_env<T, F>(get: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{key}={raw:?} is not valid: {e}")),
    }
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (optional), overlay the process environment, then validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup. Set, non-empty variables win over the file.
    /// A numeric variable that does not parse is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SERVER_HOST") { self.server.host = v; }
        if let Some(p) = parse_env::<u16, _>(&get, "SERVER_PORT")? { self.server.port = p; }
        if let Some(w) = parse_env::<usize, _>(&get, "TOKIO_WORKER_THREADS")? {
            self.server.worker_threads = Some(w);
        }

        if let Some(v) = get("HUBSPOT_API_KEY") { self.hubspot.api_key = v; }
        if let Some(v) = get("HUBSPOT_BASE_URL") { self.hubspot.base_url = v; }
        if let Some(v) = get("CLICKUP_API_KEY") { self.clickup.api_key = v; }
        if let Some(v) = get("CLICKUP_LIST_ID") { self.clickup.list_id = v; }
        if let Some(v) = get("CLICKUP_BASE_URL") { self.clickup.base_url = v; }
        if let Some(t) = parse_env::<u64, _>(&get, "HTTP_TIMEOUT_SECS")? {
            self.hubspot.timeout_secs = t;
            self.clickup.timeout_secs = t;
        }

        if let Some(v) = get("TASK_NAME_TEMPLATE") { self.sync.task_name_template = v; }

        self.database.normalize_from_env(&get)?;
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        self.hubspot.validate()?;
        self.clickup.validate()?;
        self.sync.validate()?;
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl HubSpotConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("hubspot.api_key is empty; set it in config.toml or HUBSPOT_API_KEY"));
        }
        validate_base_url("hubspot.base_url", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(anyhow!("hubspot.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl ClickUpConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("clickup.api_key is empty; set it in config.toml or CLICKUP_API_KEY"));
        }
        if self.list_id.trim().is_empty() {
            return Err(anyhow!("clickup.list_id is empty; set it in config.toml or CLICKUP_LIST_ID"));
        }
        validate_base_url("clickup.base_url", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(anyhow!("clickup.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl SyncConfig {
    fn validate(&self) -> Result<()> {
        if !TASK_NAME_PLACEHOLDERS.iter().any(|p| self.task_name_template.contains(p)) {
            return Err(anyhow!(
                "sync.task_name_template must reference at least one of {}",
                TASK_NAME_PLACEHOLDERS.join(", ")
            ));
        }
        Ok(())
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<()> {
    let lower = url.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(anyhow!("{field} must start with http:// or https://"));
    }
    Ok(())
}

impl DatabaseConfig {
    /// Fill the URL from `DATABASE_URL`, or compose it from the `DB_*` parts.
    pub fn normalize_from_env<F>(&mut self, get: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("DB_HOST") { self.host = Some(v); }
        if let Some(p) = parse_env::<u16, _>(get, "DB_PORT")? { self.port = Some(p); }
        if let Some(v) = get("DB_USER") { self.user = Some(v); }
        if let Some(v) = get("DB_PASS") { self.password = Some(v); }
        if let Some(v) = get("DB_NAME") { self.name = Some(v); }

        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        if self.url.trim().is_empty() {
            if let Some(url) = get("DATABASE_URL") {
                self.url = url;
            } else if let Some(url) = self.compose_url() {
                self.url = url;
            }
        }
        Ok(())
    }

    fn compose_url(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        let name = self.name.as_deref()?;
        let port = self.port.unwrap_or(5432);
        // userinfo must be percent-encoded
        let auth = match (self.user.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => format!("{}:{}@", urlencoding::encode(u), urlencoding::encode(p)),
            (Some(u), None) => format!("{}@", urlencoding::encode(u)),
            _ => String::new(),
        };
        Some(format!("postgres://{auth}{host}:{port}/{name}"))
    }

    /// Call-log persistence is optional; an empty URL disables it.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_configured() {
            return Ok(());
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive numbers of seconds"));
        }
        Ok(())
    }
}
