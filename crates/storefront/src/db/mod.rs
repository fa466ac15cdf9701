//! Typed repositories over the hosted database.
//!
//! # Tables
//!
//! - `items` - Sellable catalog items (`id`, `name`, `description`, `image`, `sizes`)
//! - `admins` - Admin credentials (`username`, `password`)
//!
//! Both tables are owned by the hosted project; this crate never creates or
//! migrates them. Each repository borrows the shared [`SupabaseClient`] and
//! only fixes the table name and row types.
//!
//! [`SupabaseClient`]: crate::supabase::SupabaseClient

pub mod admins;
pub mod items;

pub use admins::AdminRepository;
pub use items::CatalogRepository;
