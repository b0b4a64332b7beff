//! Domain types and pure business logic for the RFP evaluation platform.
//!
//! Nothing in this crate performs I/O. The database and HTTP layers load
//! rows, hand them to the functions here, and render the results.

pub mod error;
pub mod financial;
pub mod types;
