use food_order_api::{
    config::AppConfig,
    db::{create_orm_conn, pool_of},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool_of(&orm)).await?;
    println!("Migrations applied");
    Ok(())
}
