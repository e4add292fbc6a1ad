//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool, no shared connection behind a mutex
//! - List operations use JOINs and `COUNT(*) OVER()`, no N+1 queries
//! - Rely on DB constraints (unique, foreign key) and translate violations
//! - Transactions for check-then-write on ownership

pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options, migrate, MIGRATOR};
pub use repos::*;
