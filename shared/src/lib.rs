//! Foodgram Shared Library
//!
//! This crate contains the API types, domain enums and pure helpers shared
//! by the backend binaries and any Rust client of the API.

pub mod errors;
pub mod models;
pub mod shopping;
pub mod shortlink;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{MembershipSet, Role};
pub use shopping::{CartLine, ShoppingList, ShoppingListItem};
pub use shortlink::ShortUrlCodec;
pub use types::*;
