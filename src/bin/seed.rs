//! Applies migrations and runs the startup seeder once, without serving.

use siopao_storefront::{
    config::AdminSeed,
    db::{create_orm_conn, run_migrations},
    seed,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,siopao_storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
    // Cloudinary and JWT settings are irrelevant here; only the admin seed is read.
    let admin = AdminSeed::from_env()?;

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let report = seed::run(&orm, &admin).await?;
    tracing::info!(
        owner_role_created = report.owner_role_created,
        permissions_added = report.permissions_added,
        customer_role_created = report.customer_role_created,
        admin_created = report.admin_created,
        demo_customer_created = report.demo_customer_created,
        catalog_seeded = report.catalog_seeded,
        orders_seeded = report.orders_seeded,
        "seed completed"
    );
    Ok(())
}
