//! Vitrine Streaming Catalog Client
//!
//! Client library for a streaming catalog served by a headless content
//! management service: typed REST wrappers, envelope normalization into flat
//! view models, a token-holding session store, a device-local watch-progress
//! store and a navigation guard.
//!
//! # Overview
//!
//! - **Configuration**: [`Config`] reads the required service base address
//!   from the environment and fails fast when it is missing.
//! - **Session**: [`SessionStore`] holds the bearer token in memory and in
//!   injected key-value storage; token presence is the only authentication
//!   signal the client trusts.
//! - **Catalog access**: [`CmsClient`] wraps the content service's REST
//!   endpoints and returns flattened view models.
//! - **Local progress**: [`LocalProgressStore`] persists per-item watch
//!   positions and notifies subscribers on every save.
//! - **Navigation**: [`RouteGuard`] redirects unauthenticated access to
//!   flagged routes, preserving the original destination.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vitrine_client::{CmsClient, Config, FileStorage, SessionStore};
//!
//! let config = Config::from_env()?;
//! let storage = Arc::new(FileStorage::open_default());
//! let session = SessionStore::open(storage);
//! let client = CmsClient::new(&config, session.clone())?;
//!
//! let login = client.login("name@example.com", "secret").await?;
//! session.set_token(&login.jwt);
//! let titles = client.fetch_titles().await?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod nav;
pub mod services;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    AuthUser, ContinueEntry, Episode, FavoriteItem, LoginResponse, ProgressMap, ProgressRecord,
    RemoteProgress, SaveProgressRequest, Season, TitleCard, TitleDetail, TitleKind, WatchTarget,
};
pub use nav::{NavDecision, Route, RouteGuard};
pub use services::cms::CmsClient;
pub use services::progress::{LocalProgressStore, ProgressTarget};
pub use services::session::SessionStore;
pub use services::storage::{FileStorage, KeyValueStorage, MemoryStorage};
