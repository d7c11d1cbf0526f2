//! Read-only report routines against the clinical database.
//!
//! Each routine opens one connection, runs its queries serially, prints a
//! formatted console report, and releases the connection before returning.

pub mod patients;
pub mod schema;
pub mod visits;
