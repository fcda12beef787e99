// 📥 CSV Seeding - Published CSV → flat source table
// The facility data ships as a CSV with the same headers the source table
// carries. This loads it so the normalize pass can run end-to-end from the
// published file. Blank CSV fields land as empty strings, not NULLs.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::io::Read;
use std::path::Path;

use crate::db::SourceRecord;
use crate::schema::SOURCE_TABLE;

/// Create the flat source table if it is not already there.
/// All columns are TEXT; the reader copes with other affinities anyway.
pub fn create_source_table(conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                \"Facility Name\" TEXT,
                \"License Number\" TEXT,
                \"Facility Address\" TEXT,
                \"Phone Number\" TEXT,
                \"Facility Type\" TEXT,
                \"Operational Schedule\" TEXT,
                \"Accepts Subsidies\" TEXT,
                \"City\" TEXT,
                \"State\" TEXT,
                \"Zip Code\" TEXT,
                \"Alternative Contact Number\" TEXT,
                \"License Type\" TEXT,
                \"License Issue Date\" TEXT,
                \"License Expiry Date\" TEXT,
                \"School District Affiliation\" TEXT
            )",
            SOURCE_TABLE
        ),
        [],
    )?;
    Ok(())
}

/// Append one record to the source table.
pub fn insert_source_record(conn: &Connection, record: &SourceRecord) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (
                \"Facility Name\", \"License Number\", \"Facility Address\", \"Phone Number\",
                \"Facility Type\", \"Operational Schedule\", \"Accepts Subsidies\",
                \"City\", \"State\", \"Zip Code\", \"Alternative Contact Number\",
                \"License Type\", \"License Issue Date\", \"License Expiry Date\",
                \"School District Affiliation\"
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            SOURCE_TABLE
        ),
        params![
            record.facility_name,
            record.license_number,
            record.facility_address,
            record.phone_number,
            record.facility_type,
            record.operational_schedule,
            record.accepts_subsidies,
            record.city,
            record.state,
            record.zip_code,
            record.alternative_contact_number,
            record.license_type,
            record.license_issue_date,
            record.license_expiry_date,
            record.school_district_affiliation,
        ],
    )?;
    Ok(())
}

/// Load facility records from any CSV reader.
pub fn load_csv_records<R: Read>(reader: R) -> Result<Vec<SourceRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SourceRecord = result.context("Failed to deserialize facility record")?;
        records.push(record);
    }

    Ok(records)
}

/// Import a CSV file into the source table, creating the table if needed.
/// Returns the number of rows loaded.
pub fn import_csv(conn: &mut Connection, csv_path: &Path) -> Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    let records = load_csv_records(file)?;

    let tx = conn.transaction()?;
    create_source_table(&tx)?;
    for record in &records {
        insert_source_record(&tx, record)?;
    }
    tx.commit()?;

    Ok(records.len())
}
