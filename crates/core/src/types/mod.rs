//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the catalog and shopper records.

pub mod customer;
pub mod id;
pub mod item;

pub use customer::{Customer, CustomerError};
pub use id::ItemId;
pub use item::{Item, ItemDraft, ItemError, normalize_sizes};
