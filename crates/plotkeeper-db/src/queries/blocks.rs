//! Database query functions for the `blocks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Block;

/// Insert a new block. Block names are unique; a duplicate is rejected by
/// the `blocks_name_key` constraint.
pub async fn insert_block(pool: &PgPool, name: &str) -> Result<Block> {
    let block = sqlx::query_as::<_, Block>(
        "INSERT INTO blocks (name) VALUES ($1) RETURNING *",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert block {name:?}"))?;

    Ok(block)
}

/// Fetch a block by its ID.
pub async fn get_block(pool: &PgPool, id: Uuid) -> Result<Option<Block>> {
    let block = sqlx::query_as::<_, Block>("SELECT * FROM blocks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch block")?;

    Ok(block)
}

/// Fetch every block whose ID is in `ids`. Missing IDs are skipped.
pub async fn get_blocks(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Block>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let blocks = sqlx::query_as::<_, Block>("SELECT * FROM blocks WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch blocks by id")?;

    Ok(blocks)
}

/// List all blocks, ordered by name.
pub async fn list_blocks(pool: &PgPool) -> Result<Vec<Block>> {
    let blocks = sqlx::query_as::<_, Block>("SELECT * FROM blocks ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list blocks")?;

    Ok(blocks)
}
