//! Shopping list built from the recipes in a user's cart

use crate::error::ApiError;
use crate::repositories::MembershipRepository;
use anyhow::Context;
use foodgram_shared::ShoppingList;
use sqlx::PgPool;
use uuid::Uuid;

/// Download format of the shopping list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShoppingListFormat {
    #[default]
    Text,
    Csv,
}

impl ShoppingListFormat {
    /// Parse the `format` query parameter; absent means text
    pub fn from_query(format: Option<&str>) -> Result<Self, ApiError> {
        match format.map(str::to_ascii_lowercase).as_deref() {
            None | Some("txt") | Some("text") => Ok(Self::Text),
            Some("csv") => Ok(Self::Csv),
            Some(other) => Err(ApiError::BadRequest(format!(
                "Unsupported shopping list format: {}",
                other
            ))),
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            Self::Text => "shoppingcart.txt",
            Self::Csv => "shoppingcart.csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Shopping list service
pub struct ShoppingListService;

impl ShoppingListService {
    /// Sum every ingredient across the user's cart, one entry per (name, unit)
    pub async fn build(pool: &PgPool, user_id: Uuid) -> Result<ShoppingList, ApiError> {
        let lines = MembershipRepository::cart_totals(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(ShoppingList::consolidate(lines))
    }

    pub fn render(list: &ShoppingList, format: ShoppingListFormat) -> Result<String, ApiError> {
        match format {
            ShoppingListFormat::Text => Ok(list.render_text()),
            ShoppingListFormat::Csv => render_csv(list).map_err(ApiError::Internal),
        }
    }
}

fn render_csv(list: &ShoppingList) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["ingredient", "measurement_unit", "amount"])?;
    for item in list.items() {
        let amount = item.total_amount.to_string();
        writer.write_record([
            item.name.as_str(),
            item.measurement_unit.as_str(),
            amount.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
