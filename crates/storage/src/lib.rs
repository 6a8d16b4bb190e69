//! Session configuration storage for the tutor backend.
//!
//! Every chat request carries the provider settings the user entered in the
//! browser. This crate keeps the latest settings per session so the rest of
//! the backend can look them up by id.
//!
//! # Overview
//!
//! - [`SessionStore`] — concurrent in-memory map from [`SessionId`] to
//!   [`SessionConfig`]. No expiry: entries stay until deleted or the process
//!   exits.
//! - [`SessionConfig`] — provider family, API key, model and optional base
//!   URL, with the checks a provider client needs before it can be built.
//! - [`Provider`] — the supported provider families and their defaults.
//!
//! # Example
//!
//! ```
//! use storage::{Provider, SessionConfig, SessionId, SessionStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = SessionStore::new();
//! let id = SessionId::from("browser-tab-1");
//!
//! store
//!     .put(id.clone(), SessionConfig::new(Provider::OpenAi, "sk-...", "gpt-4"))
//!     .await;
//! assert_eq!(store.get(&id).await.unwrap().model, "gpt-4");
//!
//! store.delete(&id).await;
//! assert!(store.get(&id).await.is_none());
//! # }
//! ```

mod config;
mod error;
mod store;

pub use config::{Provider, SessionConfig, SessionId};
pub use error::{Error, Result};
pub use store::SessionStore;
