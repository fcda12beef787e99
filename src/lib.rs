// Childcare Facility Normalizer - Core Library
// Flat childcare_facilities table → five deduplicated relational tables
// with deterministic hash identifiers.

pub mod db;
pub mod import;
pub mod pipeline;
pub mod resolver;
pub mod schema;
pub mod writer;

// Re-export commonly used types
pub use db::{open_database, read_source_records, source_columns, SchemaError, SourceRecord, REQUIRED_COLUMNS};
pub use import::{create_source_table, import_csv, insert_source_record, load_csv_records};
pub use pipeline::{normalize, process_rows, table_counts};
pub use resolver::{composite_key, entity_id, resolve, EntityKind, ResolvedIds};
pub use schema::{init_destination_tables, DESTINATION_TABLES, SOURCE_TABLE};
pub use writer::{write_row, EntityCounts, RunStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
