//! Content Service Integration
//!
//! Typed access to the headless CMS serving the streaming catalog.
//!
//! # Overview
//!
//! The content service wraps every record in an entity/attribute envelope
//! and represents relations as nested envelopes. This module provides:
//!
//! - **Client**: URL building, bearer-token headers and typed endpoint calls
//! - **Wire types**: the envelope shapes requests and responses travel in
//! - **Normalization**: pure mapping from envelopes to flat view models
//!
//! # Usage
//!
//! ```rust,ignore
//! use vitrine_client::services::cms::CmsClient;
//!
//! let client = CmsClient::new(&config, session.clone())?;
//! let titles = client.fetch_titles().await?;
//! let detail = client.fetch_title(titles[0].id).await?;
//! ```

pub mod client;
pub mod normalize;
pub mod types;

// Re-exports for convenience
pub use client::CmsClient;
pub use normalize::{
    map_continue_entry, map_favorite, map_remote_progress, map_title_card, map_title_detail,
    resolve_media_url,
};
pub use types::{Entity, Envelope, Relation, RelationList};
