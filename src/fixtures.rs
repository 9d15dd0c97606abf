//! Synthetic CSV fixtures for benchmark runs.

use std::io::Write;

use chrono::{Days, NaiveDate};
use log::info;
use rand::Rng;

use crate::config::{CSV_HEADER, DATE_FORMAT};

const PROGRESS_EVERY: u64 = 100_000;
const DOCUMENT_BASE: u64 = 30_000_000;

/// Inclusive start and exclusive end of the birth date range.
const BIRTH_RANGE: ((i32, u32, u32), (i32, u32, u32)) = ((1960, 1, 1), (2005, 12, 31));
/// Inclusive start and exclusive end of the admission date range.
const ADMISSION_RANGE: ((i32, u32, u32), (i32, u32, u32)) = ((2010, 1, 1), (2024, 12, 31));

fn random_date<R: Rng + ?Sized>(rng: &mut R, range: ((i32, u32, u32), (i32, u32, u32))) -> String {
    let ((sy, sm, sd), (ey, em, ed)) = range;
    let start = NaiveDate::from_ymd_opt(sy, sm, sd).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(ey, em, ed).unwrap_or_default();
    let span = (end - start).num_days().max(1) as u64;
    start
        .checked_add_days(Days::new(rng.random_range(0..span)))
        .unwrap_or(start)
        .format(DATE_FORMAT)
        .to_string()
}

/// The `i`-th synthetic row (1-based), in CSV column order.
pub fn fixture_row<R: Rng + ?Sized>(i: u64, rng: &mut R) -> [String; 8] {
    [
        format!("Apellido{i}"),
        format!("Nombre{i}"),
        (DOCUMENT_BASE + i).to_string(),
        "DNI".to_string(),
        random_date(rng, BIRTH_RANGE),
        if rng.random_bool(0.5) { "M" } else { "F" }.to_string(),
        i.to_string(),
        random_date(rng, ADMISSION_RANGE),
    ]
}

/// Writes the header and `rows` synthetic data rows to `writer`.
pub fn generate_csv<W: Write, R: Rng + ?Sized>(
    writer: W,
    rows: u64,
    rng: &mut R,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for i in 1..=rows {
        csv_writer.write_record(fixture_row(i, rng))?;
        if i % PROGRESS_EVERY == 0 {
            info!("Generated {} rows...", i);
        }
    }
    csv_writer.flush()?;
    Ok(())
}
