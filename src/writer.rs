// 💾 Writer - Insert-or-skip in dependency order
// Per row: Location → Owner → License → SchoolDistrict → Facility.
// A natural-key conflict is not an error: the first row to claim a key wins
// and later rows' attribute values for that key are discarded. That
// first-write-wins policy is deliberate and covered by tests.

use anyhow::Result;
use rusqlite::{params, Connection, Params};

use crate::db::SourceRecord;
use crate::resolver::ResolvedIds;

// ============================================================================
// RUN STATISTICS
// ============================================================================

/// Inserted/skipped tally for one destination table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub inserted: usize,
    pub skipped: usize,
}

/// Outcome of a full batch run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Source rows processed (including failed ones).
    pub rows: usize,
    /// Rows abandoned by the skip-and-continue write-failure policy.
    pub rows_failed: usize,
    pub locations: EntityCounts,
    pub owners: EntityCounts,
    pub licenses: EntityCounts,
    pub school_districts: EntityCounts,
    pub facilities: EntityCounts,
}

// ============================================================================
// INSERT-OR-SKIP
// ============================================================================

/// Execute an INSERT, treating a uniqueness conflict as a silent skip.
///
/// Returns true if a row was written, false if the natural key (or primary
/// key) already existed. Any other failure propagates to the caller, which
/// decides the write-failure policy.
fn insert_or_skip(conn: &Connection, sql: &str, params: impl Params) -> Result<bool> {
    match conn.execute(sql, params) {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

impl EntityCounts {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }
}

// ============================================================================
// ROW WRITER
// ============================================================================

/// Write one resolved row: the four reference entities first, then the
/// facility that references them. Order matters - the facility stores the
/// four generated identifiers as foreign keys.
pub fn write_row(
    conn: &Connection,
    record: &SourceRecord,
    ids: &ResolvedIds,
    stats: &mut RunStats,
) -> Result<()> {
    let inserted = insert_or_skip(
        conn,
        "INSERT INTO locations (location_id, city, state, zip_code)
         VALUES (?1, ?2, ?3, ?4)",
        params![ids.location_id, record.city, record.state, record.zip_code],
    )?;
    stats.locations.record(inserted);

    let inserted = insert_or_skip(
        conn,
        "INSERT INTO owners (owner_id, license_number, alternative_contact_number)
         VALUES (?1, ?2, ?3)",
        params![
            ids.owner_id,
            record.license_number,
            record.alternative_contact_number
        ],
    )?;
    stats.owners.record(inserted);

    let inserted = insert_or_skip(
        conn,
        "INSERT INTO licenses (
            license_id, license_number, license_type, license_issue_date, license_expiry_date
         ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ids.license_id,
            record.license_number,
            record.license_type,
            record.license_issue_date,
            record.license_expiry_date
        ],
    )?;
    stats.licenses.record(inserted);

    let inserted = insert_or_skip(
        conn,
        "INSERT INTO school_districts (district_id, district_name)
         VALUES (?1, ?2)",
        params![ids.school_district_id, record.school_district_affiliation],
    )?;
    stats.school_districts.record(inserted);

    let inserted = insert_or_skip(
        conn,
        "INSERT INTO facilities (
            facility_id, facility_name, license_number, facility_address, phone_number,
            facility_type, operational_schedule, accepts_subsidies,
            location_id, owner_id, license_id, school_district_id
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            ids.facility_id,
            record.facility_name,
            record.license_number,
            record.facility_address,
            record.phone_number,
            record.facility_type,
            record.operational_schedule,
            record.accepts_subsidies,
            ids.location_id,
            ids.owner_id,
            ids.license_id,
            ids.school_district_id
        ],
    )?;
    stats.facilities.record(inserted);

    Ok(())
}
