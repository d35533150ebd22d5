use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        OrderItems, Orders, Users,
        order_items::Column as OrderItemCol,
        orders::{ActiveModel as OrderActive, Column as OrderCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_permission},
    models::{Order, OrderItem},
    order_status::{is_valid_status, payment_status_for, status_label},
    permissions::Permission,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_permission(user, Permission::ViewOrders)?;

    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.to_uppercase()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::OrderDate),
        SortOrder::Desc => finder.order_by_desc(OrderCol::OrderDate),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_permission(user, Permission::ViewOrders)?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Moves an order to a new status and emails the customer.
///
/// The email goes to the shipping address on the order, falling back to the
/// account email. No recipient means no email; the update still succeeds.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_permission(user, Permission::EditOrders)?;

    let status = payload.status.trim().to_uppercase();
    if !is_valid_status(&status) {
        return Err(AppError::BadRequest(format!(
            "Unknown order status '{}'",
            payload.status
        )));
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = order.status.clone();

    let payment_status = payment_status_for(&status, &order.payment_method);

    let mut active: OrderActive = order.into();
    active.status = Set(status.clone());
    if let Some(payment_status) = payment_status {
        active.payment_status = Set(payment_status.to_string());
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    let recipient = match order
        .shipping_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        Some(email) => Some(email.to_string()),
        None => Users::find_by_id(order.user_id)
            .one(&state.orm)
            .await?
            .and_then(|u| u.email),
    };

    match recipient {
        Some(to) => {
            let subject = format!("Your order is now: {}", status_label(&status));
            let mut body = format!(
                "Hi {}, your order status changed from {} to {}.",
                order.shipping_first_name,
                status_label(&previous),
                status_label(&status)
            );
            if let Some(message) = payload.message.as_deref().filter(|m| !m.trim().is_empty()) {
                body.push_str("\n\n");
                body.push_str(message.trim());
            }
            state
                .notifier
                .send_order_status_update(&to, order.id, &subject, &body);
        }
        None => tracing::debug!(order_id = %order.id, "no recipient for status email"),
    }

    audit::record(
        &state.orm,
        user.user_id,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}
