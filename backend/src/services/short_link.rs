//! Short links for recipes
//!
//! A recipe's canonical URL is encoded from its id with [`ShortUrlCodec`].
//! Each URL is stored once; when the derived hash already belongs to a
//! different URL, the codec input is salted above bit 32 and retried.

use crate::error::ApiError;
use crate::repositories::{RecipeRepository, ShortLinkRepository};
use anyhow::anyhow;
use foodgram_shared::types::ShortLinkResponse;
use foodgram_shared::ShortUrlCodec;
use sqlx::PgPool;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u64 = 16;

/// Canonical URL of a recipe page
pub fn recipe_url(base_url: &str, recipe_id: i64) -> String {
    format!("{}/recipes/{}", base_url, recipe_id)
}

/// Public short URL for a hash
pub fn short_url(base_url: &str, hash: &str) -> String {
    format!("{}/s/{}", base_url, hash)
}

/// Short link service
pub struct ShortLinkService;

impl ShortLinkService {
    /// Return the hash stored for `url`, creating one derived from `recipe_id`
    pub async fn resolve_or_create(
        pool: &PgPool,
        codec: &ShortUrlCodec,
        url: &str,
        recipe_id: i64,
    ) -> Result<String, ApiError> {
        if let Some(link) = ShortLinkRepository::find_by_url(pool, url)
            .await
            .map_err(ApiError::Internal)?
        {
            return Ok(link.hash);
        }

        let id = u64::try_from(recipe_id)
            .map_err(|_| ApiError::validation("Recipe id must not be negative"))?;

        for attempt in 0..MAX_ATTEMPTS {
            let hash = codec.encode(id + (attempt << 32));
            let inserted = ShortLinkRepository::try_insert(pool, &hash, url)
                .await
                .map_err(ApiError::Internal)?;
            if let Some(link) = inserted {
                debug!(recipe_id, hash = %link.hash, "Short link created");
                return Ok(link.hash);
            }

            // Either another request stored this url first or the hash is taken.
            if let Some(link) = ShortLinkRepository::find_by_url(pool, url)
                .await
                .map_err(ApiError::Internal)?
            {
                return Ok(link.hash);
            }
            warn!(recipe_id, attempt, hash = %hash, "Short link hash taken, salting");
        }

        Err(ApiError::Internal(anyhow!(
            "No free short link hash for {} after {} attempts",
            url,
            MAX_ATTEMPTS
        )))
    }

    /// Short link for a recipe's page
    pub async fn recipe_link(
        pool: &PgPool,
        codec: &ShortUrlCodec,
        base_url: &str,
        recipe_id: i64,
    ) -> Result<ShortLinkResponse, ApiError> {
        if !RecipeRepository::exists(pool, recipe_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }

        let url = recipe_url(base_url, recipe_id);
        let hash = Self::resolve_or_create(pool, codec, &url, recipe_id).await?;

        Ok(ShortLinkResponse {
            short_link: short_url(base_url, &hash),
        })
    }

    /// Target URL of a short link
    pub async fn redirect(pool: &PgPool, hash: &str) -> Result<String, ApiError> {
        ShortLinkRepository::find_by_hash(pool, hash)
            .await
            .map_err(ApiError::Internal)?
            .map(|link| link.url)
            .ok_or_else(|| ApiError::NotFound("Short link not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            recipe_url("https://foodgram.example", 42),
            "https://foodgram.example/recipes/42"
        );
        assert_eq!(
            short_url("https://foodgram.example", "mmmmm"),
            "https://foodgram.example/s/mmmmm"
        );
    }

    proptest! {
        #[test]
        fn salted_hashes_differ_but_keep_the_recipe_id(id in 0u64..(1 << 32), attempt in 1u64..MAX_ATTEMPTS) {
            let codec = ShortUrlCodec::default();
            let plain = codec.encode(id);
            let salted = codec.encode(id + (attempt << 32));

            prop_assert_ne!(&plain, &salted);
            let decoded = codec.decode(&salted).unwrap();
            prop_assert_eq!(decoded & 0xFFFF_FFFF, id);
        }
    }
}
