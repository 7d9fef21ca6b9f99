mod models;

pub use models::*;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(db_url: &str) -> Result<DbPool> {
    info!("Initializing database at {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    execute_sql(&pool, include_str!("../../migrations/001_initial.sql")).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub async fn find_admin_by_email(
    pool: &DbPool,
    email: &str,
) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM admins WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Seed the single admin identity if none exists yet.
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count.0 > 0 {
        return Ok(());
    }

    let password_hash = crate::api::auth::hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;

    sqlx::query("INSERT INTO admins (email, password_hash) VALUES (?, ?)")
        .bind(email)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    info!("Seeded admin user {}", email);
    Ok(())
}

// ---------------------------------------------------------------------------
// Product store
// ---------------------------------------------------------------------------

/// Newest first, so freshly created products appear at the top of the list.
pub async fn list_products(pool: &DbPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn get_product(pool: &DbPool, id: &str) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_product(pool: &DbPool, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, price, discount, sale_end, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.discount)
    .bind(&product.sale_end)
    .bind(&product.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Write back a merged product row. Concurrent updates to the same id
/// race and the last write wins; acceptable for a single admin.
pub async fn update_product(pool: &DbPool, product: &Product) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET name = ?, price = ?, discount = ?, sale_end = ? WHERE id = ?",
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.discount)
    .bind(&product.sale_end)
    .bind(&product.id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_product(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
