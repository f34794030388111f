mod exporter;
mod stream;

pub use exporter::{ExportOutcome, ExportStrategy, Exporter, export_file_name};
pub use stream::assemble_chunks;
