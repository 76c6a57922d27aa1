//! Input/output helpers.
//!
//! - event CSV ingest + row validation (`events`)
//! - weight table export (`export`)

pub mod events;
pub mod export;

pub use events::{Event, EventTable, RowError, load_events};
pub use export::write_weights_csv;
