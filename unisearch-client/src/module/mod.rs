///! Result acquisition and export pipeline
///!
///! ## Main Components
///! - `ResultView`: routes a location query to a fetch and owns the displayed rows
///! - `Paginator`: page cache and page cursor for the full listing
///! - `Exporter`: saves the current view as CSV
///! - `csv`: encode/decode of the `Name,Abbreviation,Country,Path` document

pub mod csv;
pub mod export;
pub mod pages;
pub mod router;

pub use export::{ExportOutcome, Exporter};
pub use pages::{PageCache, Paginator};
pub use router::{FetchOutcome, ResultView};
