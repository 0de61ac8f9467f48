//! Client for the Vault backing store.
//!
//! The backing store is the single source of truth for who may read what:
//! it mints bearer tokens scoped by policy and lease, stores one secret
//! record per token in a cubbyhole path, and makes both irretrievable once
//! the lease expires. This module only speaks the store's HTTP API; it
//! implements no access control of its own.
//!
//! ## Session model
//!
//! Every operation runs inside a [`VaultSession`] bound to exactly one
//! token, acquired immediately before use and released when it goes out of
//! scope, on success and failure alike. Sessions are never cached or shared
//! across requests.

pub mod client;

pub use client::{HealthResponse, MintedToken, VaultClient, VaultError, VaultSession};
