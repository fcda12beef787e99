use anyhow::{bail, Result};
use std::env;
use std::path::Path;

use childcare_normalizer::{import_csv, normalize, open_database, table_counts};

const DEFAULT_DB: &str = "childcare.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = match args.get(2) {
                Some(p) => p,
                None => bail!("Usage: childcare-normalizer import <CSV_FILE> [DB_FILE]"),
            };
            let db_path = args.get(3).map(String::as_str).unwrap_or(DEFAULT_DB);
            run_import(Path::new(csv_path), Path::new(db_path))
        }
        Some(db_path) => run_normalize(Path::new(db_path)),
        None => run_normalize(Path::new(DEFAULT_DB)),
    }
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("📥 Seeding source table from CSV");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut conn = open_database(db_path)?;
    let loaded = import_csv(&mut conn, csv_path)?;

    println!("✓ Loaded {} rows into childcare_facilities", loaded);
    Ok(())
}

fn run_normalize(db_path: &Path) -> Result<()> {
    println!("🗄️  Normalizing childcare facilities → relational model");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut conn = open_database(db_path)?;
    let stats = normalize(&mut conn)?;

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Processed {} source rows", stats.rows);
    println!(
        "✓ Facilities:       {} inserted, {} duplicates skipped",
        stats.facilities.inserted, stats.facilities.skipped
    );
    println!(
        "✓ Locations:        {} inserted, {} duplicates skipped",
        stats.locations.inserted, stats.locations.skipped
    );
    println!(
        "✓ Owners:           {} inserted, {} duplicates skipped",
        stats.owners.inserted, stats.owners.skipped
    );
    println!(
        "✓ Licenses:         {} inserted, {} duplicates skipped",
        stats.licenses.inserted, stats.licenses.skipped
    );
    println!(
        "✓ School districts: {} inserted, {} duplicates skipped",
        stats.school_districts.inserted, stats.school_districts.skipped
    );
    if stats.rows_failed > 0 {
        eprintln!("⚠️  {} row(s) failed to write and were skipped", stats.rows_failed);
    }

    println!("\n🔍 Verifying database...");
    for (table, count) in table_counts(&conn)? {
        println!("✓ {}: {} rows", table, count);
    }

    println!("\n🎉 All unique entities successfully inserted!");
    Ok(())
}
