//! Client services
//!
//! Session and watch-progress stores over injected key-value storage, plus
//! the typed content-service client.

pub mod cms;
pub mod progress;
pub mod session;
pub mod storage;

// Re-export commonly used items
pub use cms::CmsClient;
pub use progress::{LocalProgressStore, ProgressTarget};
pub use session::SessionStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
