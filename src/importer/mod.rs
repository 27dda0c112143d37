// ==========================================
// MUCP Planner - import layer
// ==========================================
// File parsing plus per-table validation and coercion. Every reader
// runs in two modes: validate (ValidationReport, never raises) and
// read (typed rows, bad rows dropped).
// ==========================================

pub mod error;
pub mod file_parser;
pub mod report;
pub mod spatial_reader;
pub mod species_reader;
pub mod support_reader;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, RawTable, TableParser, UniversalFileParser};
pub use report::ValidationReport;
