//! Dataset Module - tabular measurement data
//!
//! Loads/saves CSV, derives the ground-truth label, and runs the offline
//! cleaning step (median fill + normalization + summary report).

pub mod table;
pub mod reader;
pub mod writer;
pub mod labeler;
pub mod clean;
pub mod report;


pub use table::{format_value, parse_cell, Dataset};
pub use reader::load_csv;
pub use writer::save_csv;
pub use labeler::{label_dataset, missing_threshold_columns, read_labels};
pub use clean::{median, process_dataset, ProcessSummary};
pub use report::{describe, render_report, write_report, ColumnStats};
