use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Hosted receipts store (PostgREST endpoint of the Supabase project)
#[derive(Debug, Deserialize, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
}

/// Push updates through Postgres LISTEN/NOTIFY
#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Create the notify trigger on startup
    #[serde(default)]
    pub install_trigger: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_top_users_limit")]
    pub top_users_limit: usize,
    #[serde(default = "default_export_filename")]
    pub export_filename: String,
}

fn default_port() -> u16 {
    3000
}

fn default_table() -> String {
    "moneyreciept".to_string()
}

fn default_date_column() -> String {
    "rcdt".to_string()
}

fn default_channel() -> String {
    "moneyreciept_changes".to_string()
}

fn default_top_users_limit() -> usize {
    contracts::dashboards::d402_receipt_analytics::DEFAULT_TOP_USERS
}

fn default_export_filename() -> String {
    contracts::dashboards::d402_receipt_analytics::DEFAULT_EXPORT_FILENAME.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: None,
            channel: default_channel(),
            install_trigger: false,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_users_limit: default_top_users_limit(),
            export_filename: default_export_filename(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[supabase]
url = "http://127.0.0.1:54321"
anon_key = ""
table = "moneyreciept"
date_column = "rcdt"

[realtime]
enabled = false
channel = "moneyreciept_changes"

[dashboard]
top_users_limit = 10
export_filename = "analytics-export"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.realtime.enabled && config.realtime.database_url.is_none() {
        anyhow::bail!("[realtime] enabled = true requires database_url");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.supabase.table, "moneyreciept");
        assert_eq!(config.supabase.date_column, "rcdt");
        assert!(!config.realtime.enabled);
        assert_eq!(config.dashboard.top_users_limit, 10);
        assert_eq!(config.dashboard.export_filename, "analytics-export");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
            [supabase]
            url = "https://example.supabase.co"
            anon_key = "key"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.supabase.table, "moneyreciept");
        assert_eq!(config.realtime.channel, "moneyreciept_changes");
        assert!(!config.realtime.install_trigger);
    }

    #[test]
    fn test_realtime_requires_database_url() {
        let result = parse_config(
            r#"
            [supabase]
            url = "https://example.supabase.co"
            anon_key = "key"

            [realtime]
            enabled = true
            "#,
        );
        assert!(result.is_err());
    }
}
