// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for the clan battle tracker.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a single-writer
//! concurrency model via `tokio-rusqlite`, plus a volatile in-memory store.
//! Both implement [`clanbattle_core::ClanStore`].

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

use std::sync::Arc;

use clanbattle_config::model::{StorageBackend, StorageConfig};
use clanbattle_core::{ClanError, ClanStore};

pub use adapter::SqliteStore;
pub use database::Database;
pub use memory::MemoryStore;

/// Open the store selected by `config.backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ClanStore>, ClanError> {
    Ok(match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(config).await?),
    })
}
