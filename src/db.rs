// 📂 Row Reader - Flat source table → named-field records
// Pure extraction: no filtering, no normalization beyond value→string
// coercion. Missing/null fields pass through as empty strings so the
// resolver can still derive an identifier for every row.

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::schema::SOURCE_TABLE;

// ============================================================================
// SOURCE RECORD
// ============================================================================

/// The columns the source table must carry. Absence of any is fatal.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "Facility Name",
    "License Number",
    "Facility Address",
    "Phone Number",
    "Facility Type",
    "Operational Schedule",
    "Accepts Subsidies",
    "City",
    "State",
    "Zip Code",
    "Alternative Contact Number",
    "License Type",
    "License Issue Date",
    "License Expiry Date",
    "School District Affiliation",
];

/// One row of the flat source table, keyed by named fields.
///
/// Every field is a plain String: the reader coerces whatever SQLite holds
/// (NULL, INTEGER, REAL, TEXT) to its string form, so a numeric zip code and
/// a text zip code compare equal downstream. The serde renames double as the
/// CSV header mapping for the import path.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceRecord {
    #[serde(rename = "Facility Name", default)]
    pub facility_name: String,

    #[serde(rename = "License Number", default)]
    pub license_number: String,

    #[serde(rename = "Facility Address", default)]
    pub facility_address: String,

    #[serde(rename = "Phone Number", default)]
    pub phone_number: String,

    #[serde(rename = "Facility Type", default)]
    pub facility_type: String,

    #[serde(rename = "Operational Schedule", default)]
    pub operational_schedule: String,

    #[serde(rename = "Accepts Subsidies", default)]
    pub accepts_subsidies: String,

    #[serde(rename = "City", default)]
    pub city: String,

    #[serde(rename = "State", default)]
    pub state: String,

    #[serde(rename = "Zip Code", default)]
    pub zip_code: String,

    #[serde(rename = "Alternative Contact Number", default)]
    pub alternative_contact_number: String,

    #[serde(rename = "License Type", default)]
    pub license_type: String,

    #[serde(rename = "License Issue Date", default)]
    pub license_issue_date: String,

    #[serde(rename = "License Expiry Date", default)]
    pub license_expiry_date: String,

    #[serde(rename = "School District Affiliation", default)]
    pub school_district_affiliation: String,
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// Fatal configuration error: the source table or a required column is
/// missing. Raised before any write happens.
#[derive(Debug, Clone)]
pub enum SchemaError {
    MissingTable(String),
    MissingColumns { table: String, missing: Vec<String> },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MissingTable(table) => {
                write!(f, "source table '{}' does not exist", table)
            }
            SchemaError::MissingColumns { table, missing } => write!(
                f,
                "source table '{}' is missing required column(s): {}",
                table,
                missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

// ============================================================================
// CONNECTION SETUP
// ============================================================================

/// Open the database with WAL mode enabled.
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(conn)
}

// ============================================================================
// COLUMN DISCOVERY
// ============================================================================

/// Ordered column names of the source table, from PRAGMA table_info.
/// An empty result means the table does not exist.
pub fn source_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", SOURCE_TABLE))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Positions of the required columns inside the source table's column list.
struct ColumnIndex {
    facility_name: usize,
    license_number: usize,
    facility_address: usize,
    phone_number: usize,
    facility_type: usize,
    operational_schedule: usize,
    accepts_subsidies: usize,
    city: usize,
    state: usize,
    zip_code: usize,
    alternative_contact_number: usize,
    license_type: usize,
    license_issue_date: usize,
    license_expiry_date: usize,
    school_district_affiliation: usize,
}

impl ColumnIndex {
    /// Resolve every required column to its position, collecting ALL missing
    /// names so the error reports the full list at once.
    fn resolve(columns: &[String]) -> Result<ColumnIndex, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::MissingTable(SOURCE_TABLE.to_string()));
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| !columns.iter().any(|c| c == *name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: SOURCE_TABLE.to_string(),
                missing,
            });
        }

        let pos = |name: &str| columns.iter().position(|c| c == name).unwrap();

        Ok(ColumnIndex {
            facility_name: pos("Facility Name"),
            license_number: pos("License Number"),
            facility_address: pos("Facility Address"),
            phone_number: pos("Phone Number"),
            facility_type: pos("Facility Type"),
            operational_schedule: pos("Operational Schedule"),
            accepts_subsidies: pos("Accepts Subsidies"),
            city: pos("City"),
            state: pos("State"),
            zip_code: pos("Zip Code"),
            alternative_contact_number: pos("Alternative Contact Number"),
            license_type: pos("License Type"),
            license_issue_date: pos("License Issue Date"),
            license_expiry_date: pos("License Expiry Date"),
            school_district_affiliation: pos("School District Affiliation"),
        })
    }
}

// ============================================================================
// ROW EXTRACTION
// ============================================================================

/// Coerce a SQLite value to its string form.
///
/// NULL becomes the empty string; numbers become their decimal text. This is
/// what makes zip code 62704 (INTEGER) and "62704" (TEXT) resolve to the
/// same location identifier.
fn coerce_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

fn field(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(coerce_to_string(row.get_ref(idx)?))
}

/// Read every row of the source table into memory as named-field records.
///
/// Validates column presence first: a missing table or column aborts with a
/// SchemaError before anything else happens.
pub fn read_source_records(conn: &Connection) -> Result<Vec<SourceRecord>> {
    let columns = source_columns(conn)?;
    let index = ColumnIndex::resolve(&columns)?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", SOURCE_TABLE))?;
    let records = stmt
        .query_map([], |row| {
            Ok(SourceRecord {
                facility_name: field(row, index.facility_name)?,
                license_number: field(row, index.license_number)?,
                facility_address: field(row, index.facility_address)?,
                phone_number: field(row, index.phone_number)?,
                facility_type: field(row, index.facility_type)?,
                operational_schedule: field(row, index.operational_schedule)?,
                accepts_subsidies: field(row, index.accepts_subsidies)?,
                city: field(row, index.city)?,
                state: field(row, index.state)?,
                zip_code: field(row, index.zip_code)?,
                alternative_contact_number: field(row, index.alternative_contact_number)?,
                license_type: field(row, index.license_type)?,
                license_issue_date: field(row, index.license_issue_date)?,
                license_expiry_date: field(row, index.license_expiry_date)?,
                school_district_affiliation: field(row, index.school_district_affiliation)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::create_source_table;
    use rusqlite::{params, Connection};

    #[test]
    fn test_missing_source_table_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();

        let err = read_source_records(&conn).unwrap_err();
        let schema_err = err.downcast_ref::<SchemaError>().unwrap();
        assert!(matches!(schema_err, SchemaError::MissingTable(_)));
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE childcare_facilities (\"Facility Name\" TEXT, \"City\" TEXT)",
            [],
        )
        .unwrap();

        let err = read_source_records(&conn).unwrap_err();
        let schema_err = err.downcast_ref::<SchemaError>().unwrap();
        match schema_err {
            SchemaError::MissingColumns { missing, .. } => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 2);
                assert!(missing.contains(&"License Number".to_string()));
                assert!(missing.contains(&"School District Affiliation".to_string()));
                assert!(!missing.contains(&"City".to_string()));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_zip_code_coerced_to_string() {
        let conn = Connection::open_in_memory().unwrap();
        create_source_table(&conn).unwrap();

        // Zip stored as an INTEGER, the way a spreadsheet export often lands.
        conn.execute(
            "INSERT INTO childcare_facilities (\"Facility Name\", \"City\", \"State\", \"Zip Code\")
             VALUES (?1, ?2, ?3, ?4)",
            params!["Sunshine Daycare", "Springfield", "IL", 62704i64],
        )
        .unwrap();

        let records = read_source_records(&conn).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].zip_code, "62704");
    }

    #[test]
    fn test_null_fields_become_empty_strings() {
        let conn = Connection::open_in_memory().unwrap();
        create_source_table(&conn).unwrap();

        conn.execute(
            "INSERT INTO childcare_facilities (\"Facility Name\") VALUES ('Lone Field')",
            [],
        )
        .unwrap();

        let records = read_source_records(&conn).unwrap();
        assert_eq!(records[0].facility_name, "Lone Field");
        assert_eq!(records[0].alternative_contact_number, "");
        assert_eq!(records[0].school_district_affiliation, "");
    }

    #[test]
    fn test_extra_source_columns_are_tolerated() {
        let conn = Connection::open_in_memory().unwrap();
        create_source_table(&conn).unwrap();
        conn.execute(
            "ALTER TABLE childcare_facilities ADD COLUMN \"Inspector Notes\" TEXT",
            [],
        )
        .unwrap();

        conn.execute(
            "INSERT INTO childcare_facilities (\"Facility Name\", \"Inspector Notes\")
             VALUES ('Sunshine Daycare', 'n/a')",
            [],
        )
        .unwrap();

        let records = read_source_records(&conn).unwrap();
        assert_eq!(records[0].facility_name, "Sunshine Daycare");
    }
}
