//! Session-backed models for the storefront.

pub mod session;

pub use session::{SessionStore, keys as session_keys, set_flash, take_flash};
