//! Utility modules supporting searches.
//!
//! - [`HttpClient`]: shared reqwest client with the search timeout
//! - [`RecordStream`]: the consumer side of a running search
//! - [`render_table`] and [`truncate_with_ellipsis`]: terminal output helpers

mod display;
mod http;
mod streaming;

pub use display::{render_table, truncate_with_ellipsis, TableRow};
pub use http::HttpClient;
pub use streaming::RecordStream;
