//! Printworks
//!
//! Print cost estimation, cart ledger and session core for a 3D-printing storefront.

pub mod cart;
pub mod config;
pub mod fixtures;
pub mod identity;
pub mod imports;
pub mod materials;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod session;
