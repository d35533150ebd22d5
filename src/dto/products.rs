use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, RecipeIngredient};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientInput {
    pub inventory_item_id: Uuid,
    pub quantity_needed: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub current_stock: i32,
    pub low_stock_threshold: Option<i32>,
    #[serde(default)]
    pub recipe_locked: bool,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub current_stock: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    /// Locks the recipe. A locked recipe cannot be unlocked.
    pub recipe_locked: Option<bool>,
    /// Replaces the whole recipe. Refused once the recipe is locked.
    pub ingredients: Option<Vec<IngredientInput>>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}
