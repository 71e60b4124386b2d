//! Database query functions for the `plots` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AreaUnit, Plot, PlotCategory, PlotType};

/// Unique constraint on `plots.plot_number`.
pub const PLOT_NUMBER_KEY: &str = "plots_plot_number_key";
/// Foreign key from `plots.block_id` to `blocks.id`.
pub const BLOCK_FKEY: &str = "plots_block_id_fkey";
/// Foreign key from `plots.customer_id` to `customers.id`.
pub const CUSTOMER_FKEY: &str = "plots_customer_id_fkey";

/// Every mutable column of a plot. Used both to insert a new row and to
/// replace an existing one wholesale.
#[derive(Debug, Clone)]
pub struct PlotValues<'a> {
    pub block_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub plot_number: &'a str,
    pub plot_type: PlotType,
    pub area_unit: AreaUnit,
    pub area: f64,
    pub category: PlotCategory,
    pub is_cornered: Option<bool>,
}

/// Insert a new plot. Returns the inserted row with server-generated
/// defaults (id, timestamps).
///
/// A taken `plot_number` violates [`PLOT_NUMBER_KEY`]; an unknown block
/// violates [`BLOCK_FKEY`].
pub async fn insert_plot(pool: &PgPool, values: &PlotValues<'_>) -> Result<Plot> {
    let plot = sqlx::query_as::<_, Plot>(
        "INSERT INTO plots (block_id, customer_id, plot_number, plot_type, \
         area_unit, area, category, is_cornered) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING *",
    )
    .bind(values.block_id)
    .bind(values.customer_id)
    .bind(values.plot_number)
    .bind(values.plot_type)
    .bind(values.area_unit)
    .bind(values.area)
    .bind(values.category)
    .bind(values.is_cornered)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert plot {:?}", values.plot_number))?;

    Ok(plot)
}

/// Fetch a plot by its ID.
pub async fn get_plot(pool: &PgPool, id: Uuid) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>("SELECT * FROM plots WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plot")?;

    Ok(plot)
}

/// List all plots in insertion order (`seq` is an identity column).
pub async fn list_plots(pool: &PgPool) -> Result<Vec<Plot>> {
    let plots = sqlx::query_as::<_, Plot>("SELECT * FROM plots ORDER BY seq")
        .fetch_all(pool)
        .await
        .context("failed to list plots")?;

    Ok(plots)
}

/// Find the plot holding `plot_number`, ignoring the plot `excluding` when
/// given (so a plot never conflicts with itself on update).
pub async fn find_by_plot_number(
    pool: &PgPool,
    plot_number: &str,
    excluding: Option<Uuid>,
) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>(
        "SELECT * FROM plots \
         WHERE plot_number = $1 \
           AND ($2::uuid IS NULL OR id <> $2)",
    )
    .bind(plot_number)
    .bind(excluding)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to look up plot number {plot_number:?}"))?;

    Ok(plot)
}

/// Replace every mutable column of a plot and bump `updated_at`.
///
/// Returns `None` when no plot has `id`.
pub async fn replace_plot(pool: &PgPool, id: Uuid, values: &PlotValues<'_>) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>(
        "UPDATE plots \
         SET block_id = $2, customer_id = $3, plot_number = $4, plot_type = $5, \
             area_unit = $6, area = $7, category = $8, is_cornered = $9, \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(values.block_id)
    .bind(values.customer_id)
    .bind(values.plot_number)
    .bind(values.plot_type)
    .bind(values.area_unit)
    .bind(values.area)
    .bind(values.category)
    .bind(values.is_cornered)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update plot {id}"))?;

    Ok(plot)
}

/// Delete a plot, returning the removed row (`None` if it did not exist).
pub async fn delete_plot(pool: &PgPool, id: Uuid) -> Result<Option<Plot>> {
    let plot = sqlx::query_as::<_, Plot>("DELETE FROM plots WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("failed to delete plot {id}"))?;

    Ok(plot)
}
