//! Catalog entities.
//!
//! The catalog hierarchy (category → subcategory → product) is read-only
//! from the workflow engine's perspective; content authoring happens
//! elsewhere.

use common::{CategoryId, ProductId, SubCategoryId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A top-level catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A subcategory; has exactly one parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub name: String,
}

/// A product; belongs to exactly one subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub subcategory_id: SubCategoryId,
    pub name: String,
    /// Non-negative unit price.
    pub price: Money,
    pub description: Option<String>,
    /// Opaque reference to a product image; storage is out of scope.
    pub photo: Option<String>,
}

impl Product {
    /// Returns true if the product detail screen should render as a photo
    /// message (caption edits) rather than a text message.
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_photo_flag() {
        let mut product = Product {
            id: ProductId::new(1),
            subcategory_id: SubCategoryId::new(1),
            name: "Widget".to_string(),
            price: Money::from_cents(999),
            description: None,
            photo: None,
        };
        assert!(!product.has_photo());
        product.photo = Some("products/widget.png".to_string());
        assert!(product.has_photo());
    }
}
