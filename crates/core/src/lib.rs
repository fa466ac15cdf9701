//! Shopfront Core - Shared domain library.
//!
//! This crate provides the types and state logic used across all Shopfront
//! components:
//! - `storefront` - Public catalog, cart and admin panel
//! - `cli` - Command-line tools for admin credentials and catalog inspection
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure state transitions - no
//! HTTP clients and no knowledge of the hosted database. Persistence is
//! abstracted behind [`KeyValueStore`], so the same [`ShopState`] logic runs
//! against a cookie session in the server and an in-memory map in tests.
//!
//! # Modules
//!
//! - [`types`] - Catalog items, item drafts, customers and IDs
//! - [`cart`] - Quantity map and line-item reconciliation
//! - [`storage`] - Key-value persistence and the per-visitor [`ShopState`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;

pub use cart::{Cart, LineItem, reconcile};
pub use storage::{KeyValueStore, MemoryStore, ShopState};
pub use types::*;
