//! CLI handlers for `plotkeeper customer` subcommands.

use anyhow::{Context, Result};
use sqlx::PgPool;

use plotkeeper_db::queries::customers;

use crate::CustomerCommands;

/// Dispatch a `CustomerCommands` variant to the appropriate handler.
pub async fn run_customer_command(command: CustomerCommands, pool: &PgPool) -> Result<()> {
    match command {
        CustomerCommands::Add { name, phone } => cmd_add(pool, &name, phone.as_deref()).await,
        CustomerCommands::List => cmd_list(pool).await,
    }
}

async fn cmd_add(pool: &PgPool, name: &str, phone: Option<&str>) -> Result<()> {
    let customer = customers::insert_customer(pool, name, phone)
        .await
        .with_context(|| format!("failed to add customer {name:?}"))?;

    println!("Customer created:");
    println!("  ID:    {}", customer.id);
    println!("  Name:  {}", customer.name);
    if let Some(phone) = &customer.phone {
        println!("  Phone: {phone}");
    }

    Ok(())
}

async fn cmd_list(pool: &PgPool) -> Result<()> {
    let all = customers::list_customers(pool).await?;

    if all.is_empty() {
        println!("No customers found. Use `plotkeeper customer add` to create one.");
        return Ok(());
    }

    let name_w = all.iter().map(|c| c.name.len()).max().unwrap_or(4).max(4);

    println!("{:<name_w$}  {:<36}  PHONE", "NAME", "ID");
    for customer in &all {
        println!(
            "{:<name_w$}  {:<36}  {}",
            customer.name,
            customer.id,
            customer.phone.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
