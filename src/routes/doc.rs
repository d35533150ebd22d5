use utoipa::{
    Modify, OpenApi,
    openapi::{
        self, OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            ResetPasswordRequest,
        },
        inventory::InventoryList,
        media::{ImageUpload, ImageUploaded},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{
            CategoryList, CreateProductRequest, IngredientInput, ProductDetail, ProductList,
            UpdateProductRequest,
        },
    },
    models::{Category, InventoryItem, Order, OrderItem, Product, RecipeIngredient, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, media, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::verify,
        auth::forgot_password,
        auth::reset_password,
        products::list_products,
        products::get_product,
        products::list_categories,
        media::load_media,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::upload_product_image,
        admin::list_inventory,
        admin::list_low_stock,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            RecipeIngredient,
            InventoryItem,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            IngredientInput,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductDetail,
            CategoryList,
            InventoryList,
            ImageUpload,
            ImageUploaded,
            OrderList,
            OrderWithItems,
            UpdateOrderStatusRequest,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<InventoryList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password recovery"),
        (name = "Products", description = "Public catalog"),
        (name = "Media", description = "Hosted product images"),
        (name = "Admin", description = "Permission-gated store management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
