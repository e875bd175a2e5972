pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{MemoryStore, SanityStore};
pub use config::{AppConfig, StoreSettings};
pub use core::{ContentClient, ContentService, PageLimits};
pub use domain::ports::ContentStore;
pub use utils::error::{ContentError, Result};
