pub mod client;
pub mod content;
pub mod filters;
pub mod query;
pub mod shaping;

pub use crate::domain::ports::ContentStore;
pub use crate::utils::error::Result;
pub use client::ContentClient;
pub use content::{ContentService, PageLimits};
pub use filters::{PersonFilters, ProjectFilters, PublicationFilters, UrlFilters};
pub use query::{Criteria, Query};
