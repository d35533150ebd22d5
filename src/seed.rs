//! Startup seeding.
//!
//! [`run`] brings a store into the baseline state the storefront expects:
//! the owner and customer roles, an administrator, a demo customer, a demo
//! catalog and a handful of demo orders. Each step checks the store first,
//! so running it on every boot never duplicates records. The only repair it
//! performs is topping up permissions missing from the owner role.
//!
//! Errors are returned to the caller and are meant to abort startup.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::AdminSeed,
    crypto::hash_password,
    entity::{
        InventoryItems, Orders, RolePermissions, Roles, Users, categories, inventory_categories,
        inventory_items, order_items, orders, products, recipe_ingredients, role_permissions,
        roles, units_of_measure, users,
    },
    order_status::{
        PAYMENT_FOR_VERIFICATION, PAYMENT_METHOD_COD, PAYMENT_METHOD_GCASH, PAYMENT_PAID,
        STATUS_DELIVERED, STATUS_PENDING_VERIFICATION,
    },
    permissions::{ROLE_CUSTOMER, ROLE_OWNER, missing_permissions},
    services::product_service::find_product_by_name,
};

pub const USER_STATUS_ACTIVE: &str = "ACTIVE";

pub const DEMO_CUSTOMER_USERNAME: &str = "testcustomer";
const DEMO_CUSTOMER_PASSWORD: &str = "password123";

pub const SPECIAL_PRODUCT_NAME: &str = "Special Toasted Siopao";
pub const DRINKS_PRODUCT_NAME: &str = "Coke Mismo";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error while seeding: {0}")]
    Db(#[from] DbErr),

    #[error("failed to hash password for '{username}': {reason}")]
    PasswordHash { username: String, reason: String },
}

/// What a seeding pass changed. All zero/false on a fully seeded store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub owner_role_created: bool,
    pub permissions_added: usize,
    pub customer_role_created: bool,
    pub admin_created: bool,
    pub demo_customer_created: bool,
    pub catalog_seeded: bool,
    pub orders_seeded: usize,
}

struct DemoProducts {
    special: Option<products::Model>,
    drinks: Option<products::Model>,
}

struct DemoOrder<'a> {
    placed_at: DateTime<Utc>,
    status: &'static str,
    payment_method: &'static str,
    payment_status: &'static str,
    transaction_id: Option<&'static str>,
    shipping_address: Option<&'static str>,
    lines: Vec<(&'a products::Model, i32)>,
}

pub async fn run(db: &DatabaseConnection, admin: &AdminSeed) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    let owner_role = ensure_owner_role(db, &mut report).await?;
    let (customer_role, created) = find_or_create_role(db, ROLE_CUSTOMER).await?;
    report.customer_role_created = created;

    ensure_admin(db, admin, owner_role.id, &mut report).await?;
    let customer = ensure_demo_customer(db, customer_role.id, &mut report).await?;

    let demo_products = ensure_demo_catalog(db, &mut report).await?;
    ensure_demo_orders(db, &customer, demo_products, &mut report).await?;

    tracing::info!(?report, "seeding finished");
    Ok(report)
}

/// Sum of quantity × unit price over order lines, in minor units.
pub fn order_total(lines: &[(i32, i64)]) -> i64 {
    lines
        .iter()
        .map(|(quantity, unit_price)| i64::from(*quantity) * unit_price)
        .sum()
}

async fn find_or_create_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<(roles::Model, bool), DbErr> {
    if let Some(role) = Roles::find()
        .filter(roles::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok((role, false));
    }

    tracing::info!(role = name, "creating role");
    let role = roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok((role, true))
}

async fn ensure_owner_role<C: ConnectionTrait>(
    db: &C,
    report: &mut SeedReport,
) -> Result<roles::Model, SeedError> {
    let (role, created) = find_or_create_role(db, ROLE_OWNER).await?;
    report.owner_role_created = created;

    let granted: BTreeSet<String> = RolePermissions::find()
        .filter(role_permissions::Column::RoleId.eq(role.id))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.permission)
        .collect();

    let missing = missing_permissions(&granted);
    if missing.is_empty() {
        return Ok(role);
    }

    if !created {
        tracing::warn!(
            role = ROLE_OWNER,
            missing = missing.len(),
            "role is missing permissions, adding them"
        );
    }
    let rows = missing.iter().map(|permission| role_permissions::ActiveModel {
        role_id: Set(role.id),
        permission: Set(permission.clone()),
    });
    RolePermissions::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    report.permissions_added = missing.len();

    Ok(role)
}

async fn ensure_admin<C: ConnectionTrait>(
    db: &C,
    admin: &AdminSeed,
    owner_role_id: Uuid,
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    let existing = Users::find()
        .filter(users::Column::Username.eq(admin.username.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        tracing::debug!(username = %admin.username, "admin user already present");
        return Ok(());
    }

    tracing::info!(username = %admin.username, "creating admin user");
    insert_user(
        db,
        NewUser {
            username: &admin.username,
            password: &admin.password,
            role_id: owner_role_id,
            first_name: "Admin",
            last_name: "User",
            email: None,
            phone: None,
        },
    )
    .await?;
    report.admin_created = true;
    Ok(())
}

async fn ensure_demo_customer<C: ConnectionTrait>(
    db: &C,
    customer_role_id: Uuid,
    report: &mut SeedReport,
) -> Result<users::Model, SeedError> {
    if let Some(user) = Users::find()
        .filter(users::Column::Username.eq(DEMO_CUSTOMER_USERNAME))
        .one(db)
        .await?
    {
        return Ok(user);
    }

    tracing::info!(username = DEMO_CUSTOMER_USERNAME, "creating demo customer");
    let user = insert_user(
        db,
        NewUser {
            username: DEMO_CUSTOMER_USERNAME,
            password: DEMO_CUSTOMER_PASSWORD,
            role_id: customer_role_id,
            first_name: "Test",
            last_name: "Customer",
            email: Some("test@example.com"),
            phone: Some("09123456789"),
        },
    )
    .await?;
    report.demo_customer_created = true;
    Ok(user)
}

struct NewUser<'a> {
    username: &'a str,
    password: &'a str,
    role_id: Uuid,
    first_name: &'a str,
    last_name: &'a str,
    email: Option<&'a str>,
    phone: Option<&'a str>,
}

async fn insert_user<C: ConnectionTrait>(
    db: &C,
    user: NewUser<'_>,
) -> Result<users::Model, SeedError> {
    let password_hash =
        hash_password(user.password).map_err(|err| SeedError::PasswordHash {
            username: user.username.to_string(),
            reason: err.to_string(),
        })?;

    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(user.username.to_string()),
        password_hash: Set(password_hash),
        role_id: Set(user.role_id),
        first_name: Set(user.first_name.to_string()),
        last_name: Set(user.last_name.to_string()),
        email: Set(user.email.map(str::to_string)),
        phone: Set(user.phone.map(str::to_string)),
        status: Set(USER_STATUS_ACTIVE.to_string()),
        email_verified: Set(user.email.is_some()),
        verification_token: Set(None),
        reset_token: Set(None),
        reset_token_expires_at: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(model)
}

async fn ensure_demo_catalog(
    db: &DatabaseConnection,
    report: &mut SeedReport,
) -> Result<DemoProducts, SeedError> {
    if InventoryItems::find().count(db).await? > 0 {
        return Ok(DemoProducts {
            special: find_product_by_name(db, SPECIAL_PRODUCT_NAME).await?,
            drinks: find_product_by_name(db, DRINKS_PRODUCT_NAME).await?,
        });
    }

    tracing::info!("seeding demo inventory and products");
    let txn = db.begin().await?;
    let demo_products = seed_catalog(&txn).await?;
    txn.commit().await?;
    report.catalog_seeded = true;
    tracing::info!("demo inventory and products seeded");

    Ok(demo_products)
}

async fn seed_catalog<C: ConnectionTrait>(db: &C) -> Result<DemoProducts, DbErr> {
    let raw = insert_inventory_category(db, "Raw Ingredients").await?;
    insert_inventory_category(db, "Packaging").await?;

    let kg = insert_unit(db, "Kilogram", "kg").await?;
    let pcs = insert_unit(db, "Pieces", "pcs").await?;
    insert_unit(db, "Pack", "pck").await?;

    let flour = insert_inventory_item(
        db,
        NewInventoryItem {
            name: "All-Purpose Flour",
            category_id: raw.id,
            unit_id: kg.id,
            current_stock: Decimal::new(5000, 2),
            cost_per_unit: 4500,
            low_stock_threshold: Some(Decimal::new(1000, 2)),
        },
    )
    .await?;
    let pork = insert_inventory_item(
        db,
        NewInventoryItem {
            name: "Ground Pork",
            category_id: raw.id,
            unit_id: kg.id,
            current_stock: Decimal::new(2000, 2),
            cost_per_unit: 30000,
            low_stock_threshold: Some(Decimal::new(500, 2)),
        },
    )
    .await?;
    let egg = insert_inventory_item(
        db,
        NewInventoryItem {
            name: "Eggs (Large)",
            category_id: raw.id,
            unit_id: pcs.id,
            current_stock: Decimal::new(10000, 2),
            cost_per_unit: 1000,
            low_stock_threshold: None,
        },
    )
    .await?;

    let siopao = insert_category(db, "Siopao").await?;
    let drinks = insert_category(db, "Drinks").await?;
    insert_category(db, "Combos").await?;

    let special = insert_product(
        db,
        NewProduct {
            name: SPECIAL_PRODUCT_NAME,
            category_id: siopao.id,
            price: 1500,
            description: Some("Our classic toasted siopao with pork and egg filling."),
            current_stock: 20,
            low_stock_threshold: 10,
            recipe_locked: true,
        },
        &[
            (flour.id, Decimal::new(5, 2)),
            (pork.id, Decimal::new(5, 2)),
            (egg.id, Decimal::new(125, 3)),
        ],
    )
    .await?;

    insert_product(
        db,
        NewProduct {
            name: "Bola-Bola Siopao",
            category_id: siopao.id,
            price: 2000,
            description: Some("Premium meatball filling with salted egg."),
            current_stock: 15,
            low_stock_threshold: 0,
            recipe_locked: false,
        },
        &[(flour.id, Decimal::new(6, 2)), (pork.id, Decimal::new(8, 2))],
    )
    .await?;

    let coke = insert_product(
        db,
        NewProduct {
            name: DRINKS_PRODUCT_NAME,
            category_id: drinks.id,
            price: 2500,
            description: None,
            current_stock: 50,
            low_stock_threshold: 0,
            recipe_locked: false,
        },
        &[],
    )
    .await?;

    Ok(DemoProducts {
        special: Some(special),
        drinks: Some(coke),
    })
}

async fn insert_inventory_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<inventory_categories::Model, DbErr> {
    inventory_categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
    }
    .insert(db)
    .await
}

async fn insert_unit<C: ConnectionTrait>(
    db: &C,
    name: &str,
    abbreviation: &str,
) -> Result<units_of_measure::Model, DbErr> {
    units_of_measure::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        abbreviation: Set(abbreviation.to_string()),
    }
    .insert(db)
    .await
}

struct NewInventoryItem<'a> {
    name: &'a str,
    category_id: Uuid,
    unit_id: Uuid,
    current_stock: Decimal,
    cost_per_unit: i64,
    low_stock_threshold: Option<Decimal>,
}

async fn insert_inventory_item<C: ConnectionTrait>(
    db: &C,
    item: NewInventoryItem<'_>,
) -> Result<inventory_items::Model, DbErr> {
    inventory_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(item.name.to_string()),
        category_id: Set(item.category_id),
        unit_id: Set(item.unit_id),
        current_stock: Set(item.current_stock),
        cost_per_unit: Set(item.cost_per_unit),
        low_stock_threshold: Set(item.low_stock_threshold),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
}

async fn insert_category<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<categories::Model, DbErr> {
    categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
    }
    .insert(db)
    .await
}

struct NewProduct<'a> {
    name: &'a str,
    category_id: Uuid,
    price: i64,
    description: Option<&'a str>,
    current_stock: i32,
    low_stock_threshold: i32,
    recipe_locked: bool,
}

async fn insert_product<C: ConnectionTrait>(
    db: &C,
    product: NewProduct<'_>,
    ingredients: &[(Uuid, Decimal)],
) -> Result<products::Model, DbErr> {
    let now = Utc::now();
    let model = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(product.category_id),
        name: Set(product.name.to_string()),
        description: Set(product.description.map(str::to_string)),
        price: Set(product.price),
        image_url: Set(None),
        current_stock: Set(product.current_stock),
        low_stock_threshold: Set(product.low_stock_threshold),
        recipe_locked: Set(product.recipe_locked),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    for (inventory_item_id, quantity_needed) in ingredients {
        recipe_ingredients::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(model.id),
            inventory_item_id: Set(*inventory_item_id),
            quantity_needed: Set(*quantity_needed),
        }
        .insert(db)
        .await?;
    }

    Ok(model)
}

async fn ensure_demo_orders(
    db: &DatabaseConnection,
    customer: &users::Model,
    demo_products: DemoProducts,
    report: &mut SeedReport,
) -> Result<(), SeedError> {
    if Orders::find().count(db).await? > 0 {
        return Ok(());
    }

    // Both products are required; a partial demo history is not seeded.
    let (Some(special), Some(drinks)) = (demo_products.special, demo_products.drinks) else {
        tracing::warn!("demo products not found, skipping demo orders");
        return Ok(());
    };

    tracing::info!("seeding demo orders");
    let now = Utc::now();
    let demo_orders = [
        DemoOrder {
            placed_at: now - Duration::days(7),
            status: STATUS_DELIVERED,
            payment_method: PAYMENT_METHOD_COD,
            payment_status: PAYMENT_PAID,
            transaction_id: None,
            shipping_address: Some("Demo Street"),
            lines: vec![(&special, 2), (&drinks, 1)],
        },
        DemoOrder {
            placed_at: now - Duration::days(1),
            status: STATUS_DELIVERED,
            payment_method: PAYMENT_METHOD_GCASH,
            payment_status: PAYMENT_PAID,
            transaction_id: Some("1234567890123"),
            shipping_address: None,
            lines: vec![(&special, 10)],
        },
        DemoOrder {
            placed_at: now,
            status: STATUS_PENDING_VERIFICATION,
            payment_method: PAYMENT_METHOD_GCASH,
            payment_status: PAYMENT_FOR_VERIFICATION,
            transaction_id: Some("9876543210987"),
            shipping_address: None,
            lines: vec![(&drinks, 5)],
        },
    ];

    let txn = db.begin().await?;
    for demo in &demo_orders {
        insert_demo_order(&txn, customer, demo).await?;
    }
    txn.commit().await?;

    report.orders_seeded = demo_orders.len();
    tracing::info!(count = demo_orders.len(), "demo orders seeded");
    Ok(())
}

async fn insert_demo_order<C: ConnectionTrait>(
    db: &C,
    customer: &users::Model,
    demo: &DemoOrder<'_>,
) -> Result<orders::Model, DbErr> {
    // Unit prices are snapshotted from the product at order time.
    let lines: Vec<(i32, i64)> = demo
        .lines
        .iter()
        .map(|(product, quantity)| (*quantity, product.price))
        .collect();

    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(customer.id),
        status: Set(demo.status.to_string()),
        payment_method: Set(demo.payment_method.to_string()),
        payment_status: Set(demo.payment_status.to_string()),
        transaction_id: Set(demo.transaction_id.map(str::to_string)),
        shipping_first_name: Set(customer.first_name.clone()),
        shipping_last_name: Set(customer.last_name.clone()),
        shipping_address: Set(demo.shipping_address.map(str::to_string)),
        shipping_email: Set(None),
        shipping_phone: Set(None),
        total_amount: Set(order_total(&lines)),
        order_date: Set(demo.placed_at.into()),
        updated_at: Set(demo.placed_at.into()),
    }
    .insert(db)
    .await?;

    for (product, quantity) in &demo.lines {
        order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(*quantity),
            price: Set(product.price),
        }
        .insert(db)
        .await?;
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_total_sums_quantity_times_unit_price() {
        assert_eq!(order_total(&[(2, 1500), (1, 2500)]), 5500);
        assert_eq!(order_total(&[(10, 1500)]), 15000);
        assert_eq!(order_total(&[(5, 2500)]), 12500);
        assert_eq!(order_total(&[]), 0);
    }
}
