//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! Everything here is a static string. User input never reaches this module;
//! values are bound through the DSL at the call site.

use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::sql_types::{BigInt, Unsigned};

/// MySQL's id of the last row inserted on this connection.
///
/// Diesel has no `RETURNING` on MySQL, so inserts read the generated key
/// back with this on the same connection (inside the same transaction).
pub fn last_insert_id() -> SqlLiteral<Unsigned<BigInt>> {
    sql::<Unsigned<BigInt>>("LAST_INSERT_ID()")
}
