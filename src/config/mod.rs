#[cfg(feature = "cli")]
pub mod cli;
pub mod store;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, ListingKind, LogFormat};
pub use store::StoreSettings;
pub use toml_config::{AppConfig, SiteConfig};
