//! Plot service layer.
//!
//! The five plot operations. Each one validates its input, checks that
//! referenced blocks and customers exist and that the plot number is free,
//! then performs a single write. The pre-write checks produce the friendly
//! error; the unique index and foreign keys on `plots` remain authoritative
//! when two writers race past them.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use plotkeeper_db::models::{Block, Customer, Plot, PopulatedPlot};
use plotkeeper_db::queries::{self as queries, blocks, customers, plots};

use super::input::{self, ALL_FIELDS_REQUIRED, PlotInput, ValidPlot};
use super::{Envelope, PlotError};

pub const NO_PLOT_FOUND: &str = "No plot found";
pub const PROVIDE_PLOT_ID: &str = "Please provide plot id";
pub const BLOCK_NOT_FOUND: &str = "Block not found!";
pub const CUSTOMER_NOT_FOUND: &str = "Customer not found!";
pub const DUPLICATE_PLOT_NUMBER: &str = "Duplicate plot number";
pub const INVALID_PLOT_DATA: &str = "Invalid plot data received!";
pub const UPDATE_TARGET_MISSING: &str = "No plot found!";
pub const PLOT_ID_REQUIRED: &str = "Plot ID Required";
pub const DELETE_TARGET_MISSING: &str = "Plot not found!";

/// Every plot with its block and customer populated, in insertion order.
///
/// An empty collection is reported as `NotFound`.
pub async fn list_all(pool: &PgPool) -> Result<Envelope<Vec<PopulatedPlot>>, PlotError> {
    let rows = plots::list_plots(pool).await?;
    if rows.is_empty() {
        return Err(PlotError::not_found(NO_PLOT_FOUND));
    }

    let populated = populate(pool, rows).await?;
    Ok(Envelope::new("List of found plots", populated))
}

/// One plot, populated. `id` is the raw path segment.
pub async fn get_by_id(pool: &PgPool, id: &str) -> Result<Envelope<PopulatedPlot>, PlotError> {
    let raw = Value::String(id.trim().to_owned());
    let id = input::parse_plot_id(Some(&raw), PROVIDE_PLOT_ID)?;

    let plot = plots::get_plot(pool, id)
        .await?
        .ok_or_else(|| PlotError::not_found(NO_PLOT_FOUND))?;

    let populated = populate(pool, vec![plot]).await?;
    let plot = populated
        .into_iter()
        .next()
        .ok_or_else(|| PlotError::not_found(NO_PLOT_FOUND))?;
    Ok(Envelope::new("Found plot", plot))
}

/// Create a plot from a request body.
pub async fn create(pool: &PgPool, body: &PlotInput) -> Result<Envelope<Plot>, PlotError> {
    if body.missing_required() {
        return Err(PlotError::bad_request(ALL_FIELDS_REQUIRED));
    }
    let valid = body.validate()?;

    check_references(pool, &valid).await?;

    if plots::find_by_plot_number(pool, &valid.plot_number, None)
        .await?
        .is_some()
    {
        debug!(plot_number = %valid.plot_number, "rejecting duplicate plot number");
        return Err(PlotError::conflict(DUPLICATE_PLOT_NUMBER));
    }

    let plot = plots::insert_plot(pool, &valid.values())
        .await
        .map_err(classify_write_error)?;

    info!(plot_id = %plot.id, plot_number = %plot.plot_number, "plot created");
    let message = format!("New Plot with {} created", plot.plot_number);
    Ok(Envelope::new(message, plot))
}

/// Replace every mutable field of the plot named by the body's `_id`.
pub async fn update(pool: &PgPool, body: &PlotInput) -> Result<Envelope<Plot>, PlotError> {
    if !input::is_truthy(body.plot_id()) || body.missing_required() {
        return Err(PlotError::bad_request(ALL_FIELDS_REQUIRED));
    }
    let id = input::parse_plot_id(body.plot_id(), ALL_FIELDS_REQUIRED)?;

    if plots::get_plot(pool, id).await?.is_none() {
        return Err(PlotError::bad_request(UPDATE_TARGET_MISSING));
    }

    let valid = body.validate()?;

    check_references(pool, &valid).await?;

    if plots::find_by_plot_number(pool, &valid.plot_number, Some(id))
        .await?
        .is_some()
    {
        debug!(plot_id = %id, plot_number = %valid.plot_number, "rejecting duplicate plot number");
        return Err(PlotError::conflict(DUPLICATE_PLOT_NUMBER));
    }

    let plot = plots::replace_plot(pool, id, &valid.values())
        .await
        .map_err(classify_write_error)?
        .ok_or_else(|| PlotError::bad_request(UPDATE_TARGET_MISSING))?;

    info!(plot_id = %plot.id, plot_number = %plot.plot_number, "plot updated");
    let message = format!("{} updated!", plot.plot_number);
    Ok(Envelope::new(message, plot))
}

/// Permanently remove the plot named by `id`.
///
/// The removed row is not echoed back; the message names it.
pub async fn delete(pool: &PgPool, id: Option<&Value>) -> Result<Envelope<Plot>, PlotError> {
    let id = input::parse_plot_id(id, PLOT_ID_REQUIRED)?;

    let plot = plots::delete_plot(pool, id)
        .await?
        .ok_or_else(|| PlotError::bad_request(DELETE_TARGET_MISSING))?;

    info!(plot_id = %plot.id, plot_number = %plot.plot_number, "plot deleted");
    Ok(Envelope::message_only(format!(
        "Plot {} with ID {} deleted",
        plot.plot_number, plot.id
    )))
}

/// The referenced block must exist, and so must the customer when one is
/// given.
async fn check_references(pool: &PgPool, valid: &ValidPlot) -> Result<(), PlotError> {
    if blocks::get_block(pool, valid.block_id).await?.is_none() {
        debug!(block_id = %valid.block_id, "rejecting unknown block");
        return Err(PlotError::conflict(BLOCK_NOT_FOUND));
    }

    if let Some(customer_id) = valid.customer_id {
        if customers::get_customer(pool, customer_id).await?.is_none() {
            debug!(customer_id = %customer_id, "rejecting unknown customer");
            return Err(PlotError::conflict(CUSTOMER_NOT_FOUND));
        }
    }

    Ok(())
}

/// Map a failed insert/update to the caller-facing error.
///
/// Constraint violations are the store's word on uniqueness and references;
/// any other database rejection means the data itself was unacceptable.
/// Everything else is a store fault.
fn classify_write_error(err: anyhow::Error) -> PlotError {
    match queries::violated_constraint(&err).as_deref() {
        Some(plots::PLOT_NUMBER_KEY) => PlotError::conflict(DUPLICATE_PLOT_NUMBER),
        Some(plots::BLOCK_FKEY) => PlotError::conflict(BLOCK_NOT_FOUND),
        Some(plots::CUSTOMER_FKEY) => PlotError::conflict(CUSTOMER_NOT_FOUND),
        _ if queries::is_rejected_by_database(&err) => {
            debug!(error = %format!("{err:#}"), "plot write rejected by database");
            PlotError::bad_request(INVALID_PLOT_DATA)
        }
        _ => PlotError::Store(err),
    }
}

/// Replace each plot's block and customer identifiers with the records
/// themselves, fetching every referenced record in one query per table.
async fn populate(pool: &PgPool, rows: Vec<Plot>) -> Result<Vec<PopulatedPlot>, PlotError> {
    let mut block_ids: Vec<Uuid> = rows.iter().map(|p| p.block_id).collect();
    block_ids.sort_unstable();
    block_ids.dedup();

    let mut customer_ids: Vec<Uuid> = rows.iter().filter_map(|p| p.customer_id).collect();
    customer_ids.sort_unstable();
    customer_ids.dedup();

    let block_map: HashMap<Uuid, Block> = blocks::get_blocks(pool, &block_ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();
    let customer_map: HashMap<Uuid, Customer> = customers::get_customers(pool, &customer_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(rows
        .into_iter()
        .map(|plot| {
            let block = block_map.get(&plot.block_id).cloned();
            let customer = plot
                .customer_id
                .and_then(|id| customer_map.get(&id).cloned());
            PopulatedPlot::new(plot, block, customer)
        })
        .collect())
}
