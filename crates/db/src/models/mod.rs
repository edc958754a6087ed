//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Where the engine consumes the row, a conversion into the
//!   `clearance_core` domain type

pub mod clearance;
pub mod notification;
pub mod office;
pub mod program;
pub mod user;
pub mod workflow;

use clearance_core::error::StoreError;

/// Build the error returned when a row holds a value the domain cannot represent.
pub(crate) fn corrupt_row(table: &str, id: i64, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{table} row {id} is invalid: {detail}"))
}
