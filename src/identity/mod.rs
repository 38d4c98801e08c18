//! Identity
//!
//! Boundary to the hosted identity provider. The provider owns accounts and
//! sessions; this crate only consumes identity snapshots and forwards sign-in
//! and sign-out requests.

mod errors;
mod models;
mod provider;

pub use errors::*;
pub use models::*;
pub use provider::*;
