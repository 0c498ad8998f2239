//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod catalog;
pub mod follow;
pub mod membership;
pub mod recipe;
pub mod short_link;
pub mod user;

pub use catalog::{IngredientRecord, IngredientRepository, TagRecord, TagRepository};
pub use follow::{FollowRepository, FollowingRow};
pub use membership::MembershipRepository;
pub use recipe::{
    RecipeFilter, RecipeIngredientRow, RecipeRepository, RecipeRow, RecipeSummaryRow,
    RecipeTagRow, SaveRecipe,
};
pub use short_link::{ShortLinkRecord, ShortLinkRepository};
pub use user::{CreateUser, UserRecord, UserRepository, UserView};
