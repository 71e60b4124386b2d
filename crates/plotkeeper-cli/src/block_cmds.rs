//! CLI handlers for `plotkeeper block` subcommands.
//!
//! Implements:
//! - `plotkeeper block add`   -- create a new block
//! - `plotkeeper block list`  -- list all blocks in table format

use anyhow::{Context, Result};
use sqlx::PgPool;

use plotkeeper_db::queries::blocks;

use crate::BlockCommands;

/// Dispatch a `BlockCommands` variant to the appropriate handler.
pub async fn run_block_command(command: BlockCommands, pool: &PgPool) -> Result<()> {
    match command {
        BlockCommands::Add { name } => cmd_add(pool, &name).await,
        BlockCommands::List => cmd_list(pool).await,
    }
}

async fn cmd_add(pool: &PgPool, name: &str) -> Result<()> {
    let block = blocks::insert_block(pool, name)
        .await
        .with_context(|| format!("failed to add block {name:?} (is the name already taken?)"))?;

    println!("Block created:");
    println!("  ID:   {}", block.id);
    println!("  Name: {}", block.name);

    Ok(())
}

async fn cmd_list(pool: &PgPool) -> Result<()> {
    let all = blocks::list_blocks(pool).await?;

    if all.is_empty() {
        println!("No blocks found. Use `plotkeeper block add` to create one.");
        return Ok(());
    }

    let name_w = all.iter().map(|b| b.name.len()).max().unwrap_or(4).max(4);

    println!("{:<name_w$}  {:<36}  CREATED", "NAME", "ID");
    for block in &all {
        println!(
            "{:<name_w$}  {:<36}  {}",
            block.name,
            block.id,
            block.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}
