// SPDX-FileCopyrightText: 2026 Clanbattle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Member name lookup.

use async_trait::async_trait;

use crate::error::ClanError;
use crate::types::MemberId;

/// Resolves display names for members.
///
/// Backed by a chat platform or a nickname cache; lookups may be slow or fail,
/// and callers fall back to the numeric id.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn display_name(&self, member: MemberId) -> Result<Option<String>, ClanError>;
}
