//! Database query functions for the `customers` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Customer;

/// Insert a new customer.
pub async fn insert_customer(pool: &PgPool, name: &str, phone: Option<&str>) -> Result<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (name, phone) VALUES ($1, $2) RETURNING *",
    )
    .bind(name)
    .bind(phone)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert customer {name:?}"))?;

    Ok(customer)
}

/// Fetch a customer by its ID.
pub async fn get_customer(pool: &PgPool, id: Uuid) -> Result<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch customer")?;

    Ok(customer)
}

/// Fetch every customer whose ID is in `ids`. Missing IDs are skipped.
pub async fn get_customers(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Customer>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch customers by id")?;

    Ok(customers)
}

/// List all customers, oldest first.
pub async fn list_customers(pool: &PgPool) -> Result<Vec<Customer>> {
    let customers =
        sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY created_at, id")
            .fetch_all(pool)
            .await
            .context("failed to list customers")?;

    Ok(customers)
}
