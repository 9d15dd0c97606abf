//! Student record model.
//!
//! A [`Record`] is one validated CSV data row. It is produced by
//! [`parse_record`], owned by whichever batch currently holds it and dropped
//! once that batch has been written or discarded.

mod parse;

use chrono::NaiveDate;

use crate::config::DATE_FORMAT;

pub use parse::{parse_record, FIELD_NAMES};

/// One validated student record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub surname: String,
    pub first_name: String,
    pub document_number: String,
    pub document_type: String,
    pub birth_date: NaiveDate,
    pub sex: String,
    /// Canonical decimal text of an integer (leading zeros and `+` removed)
    pub enrollment_number: String,
    pub admission_date: NaiveDate,
}

impl Record {
    /// All eight column values as text, in table column order.
    ///
    /// Dates use the fixed `YYYY-MM-DD` format so the stored value is the same
    /// whichever write technique binds it.
    pub fn text_fields(&self) -> [String; 8] {
        [
            self.surname.clone(),
            self.first_name.clone(),
            self.document_number.clone(),
            self.document_type.clone(),
            format_date(self.birth_date),
            self.sex.clone(),
            self.enrollment_number.clone(),
            format_date(self.admission_date),
        ]
    }
}

/// Formats a date the way every write technique binds it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
