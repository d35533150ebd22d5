use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    dto::inventory::InventoryList,
    entity::{InventoryItems, inventory_items::Column},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_permission},
    models::InventoryItem,
    permissions::Permission,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_permission(user, Permission::ViewInventory)?;
    let items = InventoryItems::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(InventoryItem::from)
        .collect();
    Ok(ApiResponse::success(
        "Inventory",
        InventoryList { items },
        Some(Meta::empty()),
    ))
}

/// Items at or below their threshold. Items without a threshold never show up.
pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_permission(user, Permission::ViewInventory)?;
    let items = InventoryItems::find()
        .filter(Column::LowStockThreshold.is_not_null())
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|item| is_low(item.current_stock, item.low_stock_threshold))
        .map(InventoryItem::from)
        .collect();
    Ok(ApiResponse::success(
        "Low stock",
        InventoryList { items },
        Some(Meta::empty()),
    ))
}

fn is_low(stock: rust_decimal::Decimal, threshold: Option<rust_decimal::Decimal>) -> bool {
    threshold.is_some_and(|t| stock <= t)
}

#[cfg(test)]
mod tests {
    use super::is_low;
    use rust_decimal::Decimal;

    #[test]
    fn at_threshold_counts_as_low() {
        assert!(is_low(Decimal::new(5, 0), Some(Decimal::new(5, 0))));
        assert!(!is_low(Decimal::new(51, 1), Some(Decimal::new(5, 0))));
        assert!(!is_low(Decimal::ZERO, None));
    }
}
