use serde::Serialize;
use utoipa::ToSchema;

use crate::models::InventoryItem;

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryList {
    pub items: Vec<InventoryItem>,
}
