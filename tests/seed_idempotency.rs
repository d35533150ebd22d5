mod common;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, Set,
};
use siopao_storefront::{
    crypto::verify_password,
    entity::{
        InventoryItems, OrderItems, Orders, Products, RolePermissions, Roles, Users, products,
        role_permissions, roles, users,
    },
    permissions::{Permission, ROLE_CUSTOMER, ROLE_OWNER},
    seed::{self, DEMO_CUSTOMER_USERNAME, SPECIAL_PRODUCT_NAME},
};

use common::{admin_seed, setup_test_db};

#[tokio::test]
async fn seeding_twice_creates_nothing_new() -> anyhow::Result<()> {
    let db = setup_test_db().await;

    let first = seed::run(&db, &admin_seed()).await?;
    assert!(first.owner_role_created);
    assert_eq!(first.permissions_added, Permission::ALL.len());
    assert!(first.admin_created);
    assert!(first.demo_customer_created);
    assert!(first.catalog_seeded);
    assert_eq!(first.orders_seeded, 3);

    let second = seed::run(&db, &admin_seed()).await?;
    assert_eq!(second, seed::SeedReport::default());

    assert_eq!(Roles::find().count(&db).await?, 2);
    assert_eq!(
        Users::find()
            .filter(users::Column::Username.eq("admin"))
            .count(&db)
            .await?,
        1
    );
    assert_eq!(
        Users::find()
            .filter(users::Column::Username.eq(DEMO_CUSTOMER_USERNAME))
            .count(&db)
            .await?,
        1
    );
    assert_eq!(InventoryItems::find().count(&db).await?, 3);
    assert_eq!(Products::find().count(&db).await?, 3);
    assert_eq!(Orders::find().count(&db).await?, 3);
    assert_eq!(
        RolePermissions::find().count(&db).await?,
        Permission::ALL.len() as u64
    );
    Ok(())
}

#[tokio::test]
async fn owner_role_missing_permissions_is_topped_up() -> anyhow::Result<()> {
    let db = setup_test_db().await;

    let role = roles::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        name: Set(ROLE_OWNER.to_string()),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(&db)
    .await?;
    for permission in [Permission::ViewOrders, Permission::EditOrders] {
        role_permissions::ActiveModel {
            role_id: Set(role.id),
            permission: Set(permission.as_str().to_string()),
        }
        .insert(&db)
        .await?;
    }

    let report = seed::run(&db, &admin_seed()).await?;
    assert!(!report.owner_role_created);
    assert_eq!(report.permissions_added, Permission::ALL.len() - 2);

    let owners = Roles::find()
        .filter(roles::Column::Name.eq(ROLE_OWNER))
        .all(&db)
        .await?;
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].id, role.id);

    let granted = RolePermissions::find()
        .filter(role_permissions::Column::RoleId.eq(role.id))
        .count(&db)
        .await?;
    assert_eq!(granted, Permission::ALL.len() as u64);
    Ok(())
}

#[tokio::test]
async fn existing_admin_is_left_untouched() -> anyhow::Result<()> {
    let db = setup_test_db().await;
    seed::run(&db, &admin_seed()).await?;

    let before = Users::find()
        .filter(users::Column::Username.eq("admin"))
        .one(&db)
        .await?
        .expect("admin seeded");
    assert!(verify_password("admin-password", &before.password_hash));

    let mut changed = admin_seed();
    changed.password = "a-different-password".to_string();
    let report = seed::run(&db, &changed).await?;
    assert!(!report.admin_created);

    let after = Users::find_by_id(before.id)
        .one(&db)
        .await?
        .expect("admin still present");
    assert_eq!(after.password_hash, before.password_hash);
    Ok(())
}

#[tokio::test]
async fn customer_role_is_created_with_the_owner_role() -> anyhow::Result<()> {
    let db = setup_test_db().await;
    let report = seed::run(&db, &admin_seed()).await?;
    assert!(report.customer_role_created);

    let customer_role = Roles::find()
        .filter(roles::Column::Name.eq(ROLE_CUSTOMER))
        .one(&db)
        .await?
        .expect("customer role");
    let customer = Users::find()
        .filter(users::Column::Username.eq(DEMO_CUSTOMER_USERNAME))
        .one(&db)
        .await?
        .expect("demo customer");
    assert_eq!(customer.role_id, customer_role.id);
    assert!(!customer.password_hash.contains("password123"));
    Ok(())
}

#[tokio::test]
async fn demo_order_totals_match_their_lines() -> anyhow::Result<()> {
    let db = setup_test_db().await;
    seed::run(&db, &admin_seed()).await?;

    let mut totals = Vec::new();
    for order in Orders::find().all(&db).await? {
        let items = OrderItems::find()
            .filter(siopao_storefront::entity::order_items::Column::OrderId.eq(order.id))
            .all(&db)
            .await?;
        assert!(!items.is_empty());
        let lines: Vec<(i32, i64)> = items.iter().map(|i| (i.quantity, i.price)).collect();
        assert_eq!(order.total_amount, seed::order_total(&lines));
        totals.push(order.total_amount);
    }

    totals.sort_unstable();
    assert_eq!(totals, vec![5500, 12500, 15000]);
    Ok(())
}

#[tokio::test]
async fn renamed_demo_product_skips_demo_orders() -> anyhow::Result<()> {
    let db = setup_test_db().await;
    seed::run(&db, &admin_seed()).await?;

    OrderItems::delete_many().exec(&db).await?;
    Orders::delete_many().exec(&db).await?;

    let special = Products::find()
        .filter(products::Column::Name.eq(SPECIAL_PRODUCT_NAME))
        .one(&db)
        .await?
        .expect("special product");
    let mut active = special.into_active_model();
    active.name = Set("Renamed Siopao".to_string());
    active.update(&db).await?;

    let report = seed::run(&db, &admin_seed()).await?;
    assert!(!report.catalog_seeded);
    assert_eq!(report.orders_seeded, 0);
    assert_eq!(Orders::find().count(&db).await?, 0);
    Ok(())
}

#[tokio::test]
async fn product_lookup_ignores_case() -> anyhow::Result<()> {
    let db = setup_test_db().await;
    seed::run(&db, &admin_seed()).await?;

    OrderItems::delete_many().exec(&db).await?;
    Orders::delete_many().exec(&db).await?;

    let special = Products::find()
        .filter(products::Column::Name.eq(SPECIAL_PRODUCT_NAME))
        .one(&db)
        .await?
        .expect("special product");
    let mut active = special.into_active_model();
    active.name = Set(SPECIAL_PRODUCT_NAME.to_uppercase());
    active.update(&db).await?;

    let report = seed::run(&db, &admin_seed()).await?;
    assert_eq!(report.orders_seeded, 3);
    Ok(())
}
