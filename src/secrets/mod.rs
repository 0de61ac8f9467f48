//! The secret issuance and redemption lifecycle.
//!
//! A secret is never exposed directly: the [`Issuer`] wraps it behind a
//! freshly minted, single-policy, week-long token and stashes the payload
//! where only that token can reach it. The token string is the whole
//! capability; whoever holds it can redeem it through the [`Redeemer`]
//! until the lease runs out. There is no access-control list here and none
//! may be added; the backing store is the single authority on who may read
//! what.

pub mod issuer;
pub mod redeemer;
pub mod validate;

pub use issuer::{IssueError, IssuedSecret, Issuer};
pub use redeemer::{Redeemer, Redemption};
pub use validate::{validate_secret, ValidationError};
