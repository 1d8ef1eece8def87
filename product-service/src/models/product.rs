use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product as persisted in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creation timestamp at the store's millisecond precision, so what a
    /// create returns matches what a later list reads back.
    pub fn timestamp_now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// A validated, normalized create request. Only the validation pipeline
/// builds one, so every value reaching a store is already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub(crate) name: String,
    pub(crate) price: Decimal,
}

impl NewProduct {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Stamps identity and creation time; called by a store at write time.
    pub fn into_product(self, created_at: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::now_v7().to_string(),
            name: self.name,
            price: self.price,
            created_at,
        }
    }
}
