//! Tags and ingredients
//!
//! Read-only lookups for the API plus the CSV parsing used by the seed tool.

use crate::error::ApiError;
use crate::repositories::{IngredientRecord, IngredientRepository, TagRecord, TagRepository};
use anyhow::{Context, Result};
use foodgram_shared::types::{IngredientResponse, TagResponse};
use serde::Deserialize;
use sqlx::PgPool;
use std::io::Read;

impl From<TagRecord> for TagResponse {
    fn from(tag: TagRecord) -> Self {
        TagResponse {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

impl From<IngredientRecord> for IngredientResponse {
    fn from(ingredient: IngredientRecord) -> Self {
        IngredientResponse {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Catalog service for tags and ingredients
pub struct CatalogService;

impl CatalogService {
    pub async fn list_tags(pool: &PgPool) -> Result<Vec<TagResponse>, ApiError> {
        let tags = TagRepository::list(pool).await.map_err(ApiError::Internal)?;
        Ok(tags.into_iter().map(TagResponse::from).collect())
    }

    pub async fn get_tag(pool: &PgPool, id: i64) -> Result<TagResponse, ApiError> {
        TagRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .map(TagResponse::from)
            .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))
    }

    /// Ingredients whose name starts with `prefix`, ignoring case
    pub async fn search_ingredients(
        pool: &PgPool,
        prefix: Option<&str>,
    ) -> Result<Vec<IngredientResponse>, ApiError> {
        let prefix = prefix.map(str::trim).filter(|p| !p.is_empty());
        let ingredients = IngredientRepository::search(pool, prefix)
            .await
            .map_err(ApiError::Internal)?;
        Ok(ingredients.into_iter().map(IngredientResponse::from).collect())
    }

    pub async fn get_ingredient(pool: &PgPool, id: i64) -> Result<IngredientResponse, ApiError> {
        IngredientRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .map(IngredientResponse::from)
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct IngredientCsvRow {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagCsvRow {
    name: String,
    slug: String,
}

/// Parse `name,measurement_unit` rows (no header) into (name, unit) pairs
pub fn parse_ingredients_csv<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    read_pairs::<IngredientCsvRow, _>(reader, |row| (row.name, row.measurement_unit))
}

/// Parse `name,slug` rows (no header) into (name, slug) pairs
pub fn parse_tags_csv<R: Read>(reader: R) -> Result<Vec<(String, String)>> {
    read_pairs::<TagCsvRow, _>(reader, |row| (row.name, row.slug))
}

fn read_pairs<T, R>(reader: R, split: fn(T) -> (String, String)) -> Result<Vec<(String, String)>>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut pairs = Vec::new();
    for (line, record) in csv_reader.deserialize::<T>().enumerate() {
        let (first, second) = split(record.with_context(|| format!("Invalid CSV row {}", line + 1))?);
        if first.is_empty() || second.is_empty() {
            continue;
        }
        pairs.push((first, second));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredients() {
        let data = "абрикосовое варенье,г\nсоль, г\n\"мука, пшеничная\",кг\n";
        let pairs = parse_ingredients_csv(data.as_bytes()).unwrap();

        assert_eq!(
            pairs,
            vec![
                ("абрикосовое варенье".to_string(), "г".to_string()),
                ("соль".to_string(), "г".to_string()),
                ("мука, пшеничная".to_string(), "кг".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_tags_skips_blank_fields() {
        let data = "Завтрак,breakfast\n,lunch\nУжин,dinner\n";
        let pairs = parse_tags_csv(data.as_bytes()).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("Ужин".to_string(), "dinner".to_string()));
    }

    #[test]
    fn test_parse_rejects_short_rows() {
        assert!(parse_tags_csv("breakfast\n".as_bytes()).is_err());
    }
}
