//! Password gate guarding a persisted selection of content sources.
//!
//! ```no_run
//! use std::sync::Arc;
//! use passgate::{Algorithm, MemoryStorage, Verifier};
//!
//! # async fn example() -> passgate::Result<()> {
//! let hash = passgate::digest_hex("testpass", Algorithm::Sha256);
//! let verifier = Verifier::new(
//!     Arc::new(MemoryStorage::new()),
//!     Algorithm::Sha256,
//!     Some(&hash),
//!     chrono::Duration::days(90),
//! );
//! assert!(verifier.verify("testpass").await?);
//! assert!(verifier.is_verified());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod gui;
pub mod hashers;
pub mod models;
pub mod selection;
pub mod storage;
pub mod utils;
pub mod verifier;

pub use config::GateConfig;
pub use error::{GateError, Result};
pub use gate::Gate;
pub use hashers::digest_hex;
pub use models::{Algorithm, GateStatus, PasswordVerified, SourceEntry, UnverifiedReason, VerificationRecord};
pub use selection::SelectionStore;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use verifier::Verifier;
