//! Per-table query functions. Every function takes a `&PgPool` and returns
//! `anyhow::Result` with the failing operation attached as context.

pub mod blocks;
pub mod customers;
pub mod plots;

/// Return the name of the unique or foreign-key constraint an error violated,
/// if the error chain bottoms out in such a database error.
///
/// Works through `anyhow` context layers added by the query functions.
pub fn violated_constraint(err: &anyhow::Error) -> Option<String> {
    let db_err = err.downcast_ref::<sqlx::Error>()?.as_database_error()?;
    if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
        db_err.constraint().map(str::to_owned)
    } else {
        None
    }
}

/// Whether an error is a database-side rejection (constraint, type, check)
/// as opposed to a connection or protocol failure.
pub fn is_rejected_by_database(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(_))
    )
}
