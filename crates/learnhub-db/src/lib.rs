//! # LearnHub DB
//!
//! Database pool, migrations and storage implementations for the LearnHub API.
//!
//! Application services talk to storage through the async traits in
//! [`store`]. Two implementations are provided:
//!
//! - [`PgStore`]: PostgreSQL via SQLx, used by the server and the CLI
//! - [`MemoryStore`]: in-process tables, used by tests
//!
//! # Example
//!
//! ```ignore
//! use learnhub_db::{PgStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&config.database).await?;
//! run_migrations(&pool).await?;
//! let store = PgStore::new(pool);
//! ```

pub mod error;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pool::{init_db_pool, run_migrations};
pub use postgres::PgStore;
pub use store::{RefreshTokenStore, RoleStore, Store, UserStore};

// Re-export PgPool for convenience
pub use sqlx::PgPool;
