// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the battle engine.
//!
//! Persistence, outbound messaging, name lookup and the clock are external to
//! the core. Each is an `#[async_trait]` object so the engine can hold them as
//! `Arc<dyn Trait + Send + Sync>`.

pub mod clock;
pub mod directory;
pub mod notifier;
pub mod store;

pub use clock::{GameClock, SystemClock};
pub use directory::Directory;
pub use notifier::Notifier;
pub use store::ClanStore;
