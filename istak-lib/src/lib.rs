//! Resource table controller for the inventory and borrowing tracker
//!
//! Loads items, borrowers and transactions from the REST backend, maps
//! inconsistent payloads onto canonical records, and derives filtered,
//! sorted, paginated table views with ID-keyed selection. Mutations go
//! through a gateway and are followed by a full reload.

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod table;
pub mod view;

mod client;

pub use client::*;
