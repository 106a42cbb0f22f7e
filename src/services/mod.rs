// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, API access and cache synchronization.

pub mod api;
pub mod identity;
pub mod sync;

pub use api::ApiClient;
pub use identity::{AuthState, Identity, IdentityResolver, IdentitySource};
pub use sync::{SyncSnapshot, TaskSynchronizer};
