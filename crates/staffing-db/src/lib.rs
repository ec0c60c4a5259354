//! # staffing-db
//!
//! Persistence for the teaching-contract engine.
//!
//! - Connection pool management and migrations
//! - [`TeachingContractStore`]: contract header + line items, with the
//!   signature guard and draft-only delete done under a row lock
//! - Read-only directories over tables owned by other subsystems
//!   (lecturers, hiring candidates)
//! - In-memory implementations of every trait for tests
//!
//! ## Example
//!
//! ```ignore
//! use staffing_db::{Database, DatabaseConfig, PgContractStore};
//!
//! let db = Database::connect(&DatabaseConfig::with_url(url)).await?;
//! db.migrate().await?;
//! let store = PgContractStore::new(db.pool().clone());
//! let contract = store.find(1).await?;
//! ```

pub mod directory;
pub mod memory;
pub mod pool;
pub mod repository;
pub mod teaching_contracts;

pub use directory::PgDirectory;
pub use memory::{MemoryCandidateDirectory, MemoryContractStore};
pub use pool::{Database, DatabaseConfig};
pub use repository::{
    CandidateDirectory, LecturerDirectory, RepositoryError, RepositoryResult, SignatureOutcome,
    TeachingContractStore,
};
pub use teaching_contracts::PgContractStore;
