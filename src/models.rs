use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories, inventory_items, order_items, orders, products, users,
};

/// Public view of an account; never carries the password hash or tokens.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub email_verified: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_entity(model: users::Model, role: String) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            status: model.status,
            email_verified: model.email_verified,
            role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Prices are in minor units (centavos).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub current_stock: i32,
    pub low_stock_threshold: i32,
    pub recipe_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            description: model.description,
            price: model.price,
            image_url: model.image_url,
            current_stock: model.current_stock,
            low_stock_threshold: model.low_stock_threshold,
            recipe_locked: model.recipe_locked,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredient {
    pub inventory_item_id: Uuid,
    pub inventory_item_name: String,
    pub quantity_needed: Decimal,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub unit_id: Uuid,
    pub current_stock: Decimal,
    pub cost_per_unit: i64,
    pub low_stock_threshold: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl From<inventory_items::Model> for InventoryItem {
    fn from(model: inventory_items::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_id: model.category_id,
            unit_id: model.unit_id,
            current_stock: model.current_stock,
            cost_per_unit: model.cost_per_unit,
            low_stock_threshold: model.low_stock_threshold,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_address: Option<String>,
    pub shipping_email: Option<String>,
    pub shipping_phone: Option<String>,
    pub total_amount: i64,
    pub order_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            status: model.status,
            payment_method: model.payment_method,
            payment_status: model.payment_status,
            transaction_id: model.transaction_id,
            shipping_first_name: model.shipping_first_name,
            shipping_last_name: model.shipping_last_name,
            shipping_address: model.shipping_address,
            shipping_email: model.shipping_email,
            shipping_phone: model.shipping_phone,
            total_amount: model.total_amount,
            order_date: model.order_date.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
        }
    }
}
