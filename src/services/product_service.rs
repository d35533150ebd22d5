use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        media::ImageUploaded,
        products::{
            CategoryList, CreateProductRequest, IngredientInput, ProductDetail, ProductList,
            UpdateProductRequest,
        },
    },
    entity::{
        Categories, InventoryItems, OrderItems, Products, RecipeIngredients, categories,
        order_items,
        products::{ActiveModel, Column, Model as ProductModel},
        recipe_ingredients,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_permission},
    models::{Category, Product, RecipeIngredient},
    permissions::Permission,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Case-insensitive lookup by product name.
pub async fn find_product_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<ProductModel>, DbErr> {
    Products::find()
        .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).eq(name.to_lowercase()))
        .one(db)
        .await
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(Column::Description))).like(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::Name);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = load_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_permission(user, Permission::AddProducts)?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be blank".into()));
    }
    validate_amounts(Some(payload.price), Some(payload.current_stock))?;
    ensure_category_exists(state, payload.category_id).await?;
    if find_product_by_name(&state.orm, &name).await?.is_some() {
        return Err(AppError::BadRequest(format!("Product '{name}' already exists")));
    }
    validate_ingredients(state, &payload.ingredients).await?;

    let now = Utc::now();
    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name: Set(name),
        description: Set(payload.description),
        price: Set(payload.price),
        image_url: Set(None),
        current_stock: Set(payload.current_stock),
        low_stock_threshold: Set(payload.low_stock_threshold.unwrap_or(0)),
        recipe_locked: Set(payload.recipe_locked),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;
    insert_ingredients(&txn, product.id, &payload.ingredients).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let detail = load_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Product created", detail, Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_permission(user, Permission::EditProducts)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if existing.recipe_locked
        && (payload.ingredients.is_some() || payload.recipe_locked == Some(false))
    {
        return Err(AppError::BadRequest(
            "Recipe is locked and cannot be edited".into(),
        ));
    }
    validate_amounts(payload.price, payload.current_stock)?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }
    if let Some(ingredients) = &payload.ingredients {
        validate_ingredients(state, ingredients).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be blank".into()));
        }
        if let Some(other) = find_product_by_name(&state.orm, &name).await? {
            if other.id != id {
                return Err(AppError::BadRequest(format!("Product '{name}' already exists")));
            }
        }
        active.name = Set(name);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.current_stock {
        active.current_stock = Set(stock);
    }
    if let Some(threshold) = payload.low_stock_threshold {
        active.low_stock_threshold = Set(threshold);
    }
    if let Some(locked) = payload.recipe_locked {
        active.recipe_locked = Set(locked);
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.orm.begin().await?;
    let product = active.update(&txn).await?;
    if let Some(ingredients) = &payload.ingredients {
        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        insert_ingredients(&txn, product.id, ingredients).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let detail = load_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Permission::DeleteProducts)?;
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let ordered = OrderItems::find()
        .filter(order_items::Column::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(
            "Product appears in orders and cannot be deleted".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    RecipeIngredients::delete_many()
        .filter(recipe_ingredients::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(image_url) = product.image_url.as_deref() {
        state.storage.delete(image_url).await;
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::ack("Deleted"))
}

/// Stores a new product image and drops the previous one from the host.
pub async fn upload_product_image(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    file: &[u8],
) -> AppResult<ApiResponse<ImageUploaded>> {
    ensure_permission(user, Permission::EditProducts)?;
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let image_url = state.storage.store(file).await?;
    let previous = product.image_url.clone();

    let mut active: ActiveModel = product.into();
    active.image_url = Set(Some(image_url.clone()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Some(previous) = previous.as_deref() {
        state.storage.delete(previous).await;
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_image_upload",
        "products",
        serde_json::json!({ "product_id": id, "image_url": image_url }),
    )
    .await;

    Ok(ApiResponse::success(
        "Image uploaded",
        ImageUploaded { image_url },
        Some(Meta::empty()),
    ))
}

async fn load_detail<C: ConnectionTrait>(
    db: &C,
    product: ProductModel,
) -> Result<ProductDetail, DbErr> {
    let ingredients = RecipeIngredients::find()
        .filter(recipe_ingredients::Column::ProductId.eq(product.id))
        .find_also_related(InventoryItems)
        .all(db)
        .await?
        .into_iter()
        .map(|(ingredient, item)| RecipeIngredient {
            inventory_item_id: ingredient.inventory_item_id,
            inventory_item_name: item.map(|i| i.name).unwrap_or_default(),
            quantity_needed: ingredient.quantity_needed,
        })
        .collect();

    Ok(ProductDetail {
        product: Product::from(product),
        ingredients,
    })
}

async fn insert_ingredients<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    ingredients: &[IngredientInput],
) -> Result<(), DbErr> {
    for ingredient in ingredients {
        recipe_ingredients::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            inventory_item_id: Set(ingredient.inventory_item_id),
            quantity_needed: Set(ingredient.quantity_needed),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

fn validate_amounts(price: Option<i64>, stock: Option<i32>) -> AppResult<()> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }
    Ok(())
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest("Unknown category".into()))
}

async fn validate_ingredients(state: &AppState, ingredients: &[IngredientInput]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if ingredient.quantity_needed <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "ingredient quantity must be positive".into(),
            ));
        }
        if !seen.insert(ingredient.inventory_item_id) {
            return Err(AppError::BadRequest("duplicate ingredient".into()));
        }
    }
    if seen.is_empty() {
        return Ok(());
    }

    let found = InventoryItems::find()
        .filter(crate::entity::inventory_items::Column::Id.is_in(seen.iter().copied()))
        .count(&state.orm)
        .await?;
    if found as usize != seen.len() {
        return Err(AppError::BadRequest("Unknown inventory item".into()));
    }
    Ok(())
}
