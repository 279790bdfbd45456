//! Refresh engine of the YASC stock watch widget.
//!
//! - `source` — live quote sources and their failure type.
//! - `resolver` — per-symbol resolution with deterministic demo fallback.
//! - `scheduler` — repeating refresh timer with scoped start/stop.
//! - `widget` — `StockWidget`, tying configuration, store and timer to the
//!   host's attach/detach lifecycle.
pub mod resolver;
pub mod scheduler;
pub mod source;
pub mod widget;

pub use resolver::{CycleReport, QuoteResolver};
pub use scheduler::RefreshScheduler;
pub use source::{OfflineSource, QuoteSource, TransportFailure, YahooSource};
pub use widget::StockWidget;
