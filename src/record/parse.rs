//! Record parsing and validation.
//!
//! Turns one raw field tuple into a [`Record`]. Pure: no I/O, no logging.

use chrono::NaiveDate;

use crate::config::{CSV_HEADER, DATE_FORMAT};
use crate::error_handling::ParseError;

use super::Record;

/// Positional field names, as they appear in the CSV header.
pub const FIELD_NAMES: [&str; 8] = CSV_HEADER;

const BIRTH_DATE: usize = 4;
const ENROLLMENT_NUMBER: usize = 6;
const ADMISSION_DATE: usize = 7;

/// Parses a raw field tuple into a [`Record`].
///
/// Fields are positional (see [`FIELD_NAMES`]); anything past the eighth is
/// ignored. Every field is trimmed before validation. Validation stops at the
/// first failing field and no partial record is ever built.
///
/// # Errors
///
/// - [`ParseError::MissingField`] when fewer than 8 fields are present
/// - [`ParseError::InvalidDate`] when a date is not `YYYY-MM-DD`
/// - [`ParseError::InvalidEnrollmentNumber`] when the enrollment number is not an integer
///
/// # Example
///
/// ```
/// use bulkload_bench::parse_record;
///
/// let record = parse_record(&[
///     "Araya", "Valentino", "45361303", "DNI", "2004-07-14", "M", "9938", "2022-03-08",
/// ])
/// .unwrap();
/// assert_eq!(record.enrollment_number, "9938");
/// ```
pub fn parse_record<S: AsRef<str>>(fields: &[S]) -> Result<Record, ParseError> {
    if fields.len() < FIELD_NAMES.len() {
        return Err(ParseError::MissingField {
            field: FIELD_NAMES[fields.len()],
            index: fields.len(),
            found: fields.len(),
        });
    }

    let field = |i: usize| fields[i].as_ref().trim();

    let birth_date = parse_date(BIRTH_DATE, field(BIRTH_DATE))?;
    let admission_date = parse_date(ADMISSION_DATE, field(ADMISSION_DATE))?;

    let raw_enrollment = field(ENROLLMENT_NUMBER);
    let enrollment_number = raw_enrollment
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidEnrollmentNumber {
            value: raw_enrollment.to_string(),
        })?;

    Ok(Record {
        surname: field(0).to_string(),
        first_name: field(1).to_string(),
        document_number: field(2).to_string(),
        document_type: field(3).to_string(),
        birth_date,
        sex: field(5).to_string(),
        enrollment_number: enrollment_number.to_string(),
        admission_date,
    })
}

fn parse_date(index: usize, value: &str) -> Result<NaiveDate, ParseError> {
    // chrono accepts unpadded months and days; the format does not.
    if value.len() != 10 {
        return Err(invalid_date(index, value));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid_date(index, value))
}

fn invalid_date(index: usize, value: &str) -> ParseError {
    ParseError::InvalidDate {
        field: FIELD_NAMES[index],
        value: value.to_string(),
    }
}
