pub mod credentials;
pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, parse_config};
pub use schema::{
    AckConfig, Config, DiscordConfig, FilterPreset, FiltersConfig, MarkerConfig, PhraseConfig,
    ScanConfig,
};

// Env vars are process-global; tests that read or write them hold this lock.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
