// 🗄️ Schema Initializer - Destination tables for the normalized model
// Full rebuild: every run drops and recreates the five derived tables.
// The UNIQUE constraints below ARE the deduplication mechanism - the writer
// inserts blindly and treats constraint violations as skips.

use anyhow::Result;
use rusqlite::Connection;

/// Fixed name of the flat source table this pipeline reads from.
pub const SOURCE_TABLE: &str = "childcare_facilities";

/// Drop and recreate the five destination tables.
///
/// Destroys any previously derived data - this is a rebuild, not a refresh.
/// The source table is never touched.
pub fn init_destination_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS facilities;
         DROP TABLE IF EXISTS locations;
         DROP TABLE IF EXISTS owners;
         DROP TABLE IF EXISTS licenses;
         DROP TABLE IF EXISTS school_districts;

         CREATE TABLE facilities (
             facility_id TEXT PRIMARY KEY,
             facility_name TEXT NOT NULL,
             license_number TEXT NOT NULL,
             facility_address TEXT NOT NULL,
             phone_number TEXT,
             facility_type TEXT,
             operational_schedule TEXT,
             accepts_subsidies TEXT,
             location_id TEXT,
             owner_id TEXT,
             license_id TEXT,
             school_district_id TEXT,
             UNIQUE(facility_name, license_number, facility_address)
         );

         CREATE TABLE locations (
             location_id TEXT PRIMARY KEY,
             city TEXT NOT NULL,
             state TEXT NOT NULL,
             zip_code TEXT NOT NULL,
             UNIQUE(city, state, zip_code)
         );

         CREATE TABLE owners (
             owner_id TEXT PRIMARY KEY,
             license_number TEXT NOT NULL,
             alternative_contact_number TEXT,
             UNIQUE(license_number)
         );

         CREATE TABLE licenses (
             license_id TEXT PRIMARY KEY,
             license_number TEXT NOT NULL,
             license_type TEXT,
             license_issue_date TEXT,
             license_expiry_date TEXT,
             UNIQUE(license_number)
         );

         CREATE TABLE school_districts (
             district_id TEXT PRIMARY KEY,
             district_name TEXT NOT NULL,
             UNIQUE(district_name)
         );",
    )?;

    Ok(())
}

/// Names of the five destination tables, in insert-dependency order.
pub const DESTINATION_TABLES: [&str; 5] = [
    "locations",
    "owners",
    "licenses",
    "school_districts",
    "facilities",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_creates_all_destination_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_destination_tables(&conn).unwrap();

        for table in DESTINATION_TABLES {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {} should exist", table);
        }
    }

    #[test]
    fn test_rebuild_discards_previous_data() {
        let conn = Connection::open_in_memory().unwrap();
        init_destination_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO school_districts (district_id, district_name) VALUES ('x', 'Old District')",
            [],
        )
        .unwrap();

        init_destination_tables(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM school_districts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "rebuild should drop previously derived rows");
    }

    #[test]
    fn test_facility_natural_key_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        init_destination_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO facilities (facility_id, facility_name, license_number, facility_address)
             VALUES ('id1', 'Sunshine Daycare', 'LIC001', '123 Main St')",
            [],
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO facilities (facility_id, facility_name, license_number, facility_address)
             VALUES ('id2', 'Sunshine Daycare', 'LIC001', '123 Main St')",
            [],
        );
        assert!(dup.is_err(), "duplicate natural key must violate UNIQUE");
    }
}
