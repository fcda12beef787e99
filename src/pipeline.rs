// 🔁 Pipeline - One-shot batch: read → resolve → write → commit
// Strictly sequential, single-threaded. The whole batch runs inside one
// transaction committed at the end, so a crash mid-run leaves the previous
// derived tables' drop uncommitted and the database untouched.

use anyhow::Result;
use rusqlite::Connection;

use crate::db::{read_source_records, SourceRecord};
use crate::resolver::resolve;
use crate::schema::{init_destination_tables, DESTINATION_TABLES};
use crate::writer::{write_row, RunStats};

/// Run the full normalization batch.
///
/// Source rows are read (and the required columns validated) before the
/// destination tables are touched, so a missing table or column aborts with
/// nothing written. Everything after that happens in a single transaction.
pub fn normalize(conn: &mut Connection) -> Result<RunStats> {
    let records = read_source_records(conn)?;

    let tx = conn.transaction()?;
    init_destination_tables(&tx)?;
    let stats = process_rows(&tx, &records);
    tx.commit()?;

    Ok(stats)
}

/// Resolve and write every record, in order.
///
/// Write-failure policy: skip-row-and-continue. A non-constraint insert
/// failure is logged with its row number and the batch moves on; the row's
/// earlier entity inserts stay (they are valid reference data on their own).
/// Constraint conflicts never reach here - the writer swallows them as
/// skips.
pub fn process_rows(conn: &Connection, records: &[SourceRecord]) -> RunStats {
    let mut stats = RunStats::default();

    for (row_num, record) in records.iter().enumerate() {
        let row_num = row_num + 1;
        stats.rows += 1;

        let ids = resolve(record);
        match write_row(conn, record, &ids, &mut stats) {
            Ok(()) => println!("Row {}: {} - done", row_num, record.facility_name),
            Err(e) => {
                stats.rows_failed += 1;
                eprintln!("⚠️  Row {}: write failed, skipping ({})", row_num, e);
            }
        }
    }

    stats
}

/// Row count per destination table, in dependency order. For the final
/// report.
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    DESTINATION_TABLES
        .iter()
        .map(|table| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok((*table, count))
        })
        .collect()
}
