// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.
//!
//! Each module pairs a flat `*Record` (plain SQL column values) with the
//! conversions to and from the domain types. Conversions that can fail on
//! domain grounds run outside the connection thread, so closures passed to
//! `call()` only ever fail with `rusqlite::Error`.

pub mod backups;
pub mod challenges;
pub mod groups;
pub mod members;
