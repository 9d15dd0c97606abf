//! Single-record insert.

use sqlx::PgPool;

use crate::error_handling::DatabaseError;
use crate::record::Record;

use super::strategy::insert_sql;
use super::table::TableName;

/// Inserts one record outside any batch, in autocommit mode.
pub async fn insert_record(
    pool: &PgPool,
    table: &TableName,
    record: &Record,
) -> Result<(), DatabaseError> {
    let sql = insert_sql(table);
    let mut query = sqlx::query(&sql);
    for value in record.text_fields() {
        query = query.bind(value);
    }
    query.execute(pool).await?;
    Ok(())
}
