//! Turns stored log entries into something a person can read.
//!
//! Entries of both storage layouts are first normalized ([normalize]), then summarized
//! ([statistics]), drawn as text charts ([charts]) and finally put together into the overview
//! Markdown ([document]). Everything in here is a pure function of its input, writing the
//! document somewhere is left to the caller.

pub mod charts;
pub mod document;
pub mod labels;
pub mod normalize;
pub mod statistics;

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use crate::storage::entities::LogEntry;

pub use document::{build_document, OverviewBuilder};
pub use statistics::{compute_statistics, AggregateStatistics};

/// Renders the overview document for `logs` as of `generated_at`.
#[instrument(skip(logs), fields(entries = logs.len()))]
pub fn generate_overview(logs: &[LogEntry], generated_at: NaiveDateTime) -> String {
    let document = build_document(logs, generated_at);
    debug!("Generated overview of {} bytes", document.len());
    document
}
