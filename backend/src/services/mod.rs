//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories; they take the pool explicitly and return [`ApiError`].
//!
//! [`ApiError`]: crate::error::ApiError

pub mod catalog;
pub mod follow;
pub mod membership;
pub mod recipe;
pub mod short_link;
pub mod shopping_list;
pub mod user;

pub use catalog::CatalogService;
pub use follow::FollowService;
pub use membership::MembershipService;
pub use recipe::{RecipeDraft, RecipeService};
pub use short_link::ShortLinkService;
pub use shopping_list::{ShoppingListFormat, ShoppingListService};
pub use user::UserService;
