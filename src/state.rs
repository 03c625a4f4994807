use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alerts::{AlertEngine, AlertStateStore, RuleEvaluator};
use crate::enrichment::{
    AdsbDbClient, DetailStore, EnrichmentCache, NullStore, SqliteDetailStore,
};
use crate::error::ConfigError;
use crate::geo::Geofence;
use crate::notification::Dispatcher;
use crate::types::Config;
use crate::watchlist::WatchlistSet;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ADSB_ALERTER_CONFIG";
/// Overrides `notifications.discordWebhookUrl`.
pub const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";
/// Overrides `enrichment.databasePath`.
pub const DATABASE_ENV: &str = "ADSB_ALERTER_DB";

/// Shared state for every background task.
pub struct AppState {
    pub config: Config,
    /// Shared client; carries the per-request timeout.
    pub http: reqwest::Client,
    pub watchlist: Arc<WatchlistSet>,
    pub engine: AlertEngine,
}

impl AppState {
    /// Wire the pipeline from a validated config. Opens the enrichment cache
    /// database if one is configured.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("adsb-alerter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let store: Arc<dyn DetailStore> = match config.enrichment.database_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                let store = SqliteDetailStore::open_at(path)?;
                log::info!("Enrichment: caching details in {}", path);
                Arc::new(store)
            }
            _ => {
                log::info!("Enrichment: no database configured, cache disabled");
                Arc::new(NullStore)
            }
        };
        let lookup = Arc::new(AdsbDbClient::new(http.clone(), &config.enrichment.url));
        let enrichment = Arc::new(EnrichmentCache::new(lookup, store));

        let evaluator = RuleEvaluator::new(
            Geofence::new(config.home, config.proximity),
            enrichment,
        );
        let watchlist = Arc::new(WatchlistSet::new());
        let engine = AlertEngine::new(
            evaluator,
            watchlist.clone(),
            Arc::new(AlertStateStore::new()),
            Dispatcher::from_config(&config.notifications, http.clone()),
            config.state_ttl(),
        );

        Ok(Self {
            config,
            http,
            watchlist,
            engine,
        })
    }
}

/// Get the config file path: `$ADSB_ALERTER_CONFIG`, else
/// `~/.adsb-alerter/config.json`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".adsb-alerter").join("config.json"))
}

/// Load configuration from the default location, then apply environment
/// overrides. A missing file is not an error.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = match config_path() {
        Some(path) => load_config_from(&path)?,
        None => {
            log::warn!("Config: no home directory, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Read and parse a config file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::info!("Config: {} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_json::from_str(&content)?;
    log::info!("Config: loaded {}", path.display());
    Ok(config)
}

/// Apply `DISCORD_WEBHOOK_URL` and `ADSB_ALERTER_DB`. Empty values are
/// ignored.
pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(url) = var(WEBHOOK_ENV).filter(|v| !v.trim().is_empty()) {
        config.notifications.discord_webhook_url = Some(url);
    }
    if let Some(path) = var(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
        config.enrichment.database_path = Some(path);
    }
}
