use food_order_api::{
    config::AppConfig,
    db::{create_orm_conn, pool_of},
    models::{ROLE_ADMIN, ROLE_STAFF, ROLE_USER},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    let pool = pool_of(&orm);
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin12345", "Admin", ROLE_ADMIN).await?;
    ensure_user(&pool, "kitchen@example.com", "kitchen12345", "Kitchen", ROLE_STAFF).await?;
    let user_id = ensure_user(&pool, "user@example.com", "user12345", "Demo User", ROLE_USER).await?;
    seed_menu_items(&pool).await?;
    seed_recipes(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_menu_items(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // Prices are in cents.
    let items = vec![
        ("Margherita Pizza", "Tomato, mozzarella, basil", "pizza", 1150, 40),
        ("Pepperoni Pizza", "Spicy pepperoni and mozzarella", "pizza", 1350, 35),
        ("Caesar Salad", "Romaine, parmesan, croutons", "salad", 850, 25),
        ("Beef Burger", "Cheddar, pickles, house sauce", "burger", 1250, 30),
        ("Fries", "Hand cut, sea salt", "sides", 400, 80),
        ("Lemonade", "Freshly squeezed", "drinks", 350, 6),
    ];

    for (name, desc, category, price, stock) in items {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, description, category, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(category)
        .bind(price as i64)
        .bind(stock as i32)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu items");
    Ok(())
}

async fn seed_recipes(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Recipes already present, skipping");
        return Ok(());
    }

    let recipes = vec![
        (
            "Classic Pancakes",
            "Fluffy weekend pancakes",
            vec!["flour", "milk", "eggs", "butter", "sugar"],
            "Whisk, rest ten minutes, fry in butter.",
            "breakfast",
            20,
        ),
        (
            "Tomato Soup",
            "Roasted tomato soup with basil",
            vec!["tomatoes", "onion", "garlic", "stock", "basil"],
            "Roast the vegetables, simmer with stock, blend.",
            "soup",
            45,
        ),
        (
            "Guacamole",
            "Chunky guacamole",
            vec!["avocado", "lime", "onion", "cilantro", "salt"],
            "Mash the avocado and fold in the rest.",
            "snack",
            10,
        ),
    ];

    for (title, desc, ingredients, instructions, category, prep_minutes) in recipes {
        sqlx::query(
            r#"
            INSERT INTO recipes (id, title, description, ingredients, instructions, category, prep_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(desc)
        .bind(serde_json::json!(ingredients))
        .bind(instructions)
        .bind(category)
        .bind(prep_minutes as i32)
        .execute(pool)
        .await?;
    }

    println!("Seeded recipes");
    Ok(())
}
