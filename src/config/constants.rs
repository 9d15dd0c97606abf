//! Configuration constants.
//!
//! Defaults and limits used throughout the loader.

use std::time::Duration;

/// Records per batch when none is given.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Records reserved up front for a pending batch. Larger batches grow on demand.
pub const MAX_PREALLOCATED_BATCH: usize = 8192;
/// Writer tasks when none is given, or when zero is requested.
pub const DEFAULT_WORKERS: usize = 4;
/// Queue slots per writer task. Queue capacity = workers * this value.
pub const DEFAULT_QUEUE_DEPTH_PER_WORKER: usize = 2;

/// Maximum pooled PostgreSQL connections.
pub const DB_MAX_CONNECTIONS: u32 = 50;
/// Connections kept open between benchmark scenarios.
pub const DB_MIN_CONNECTIONS: u32 = 4;
/// How long a writer waits for a pooled connection before giving up.
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
/// Default PostgreSQL port.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Target table when none is configured.
pub const DEFAULT_TABLE: &str = "alumnos";

/// PostgreSQL accepts at most this many bind parameters per statement.
pub const PG_MAX_BIND_PARAMS: usize = 65_535;

/// Calendar format for both date fields, in input and when binding.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The fixed 8-column CSV header (and target table column order).
pub const CSV_HEADER: [&str; 8] = [
    "apellido",
    "nombre",
    "nro_documento",
    "tipo_documento",
    "fecha_nacimiento",
    "sexo",
    "nro_legajo",
    "fecha_ingreso",
];

/// Consecutive undecodable rows after which the source gives up on the stream.
///
/// A persistent I/O failure would otherwise be reported forever.
pub const MAX_CONSECUTIVE_DECODE_ERRORS: usize = 1000;

/// Interval between progress log lines during a run.
pub const PROGRESS_LOGGING_INTERVAL: Duration = Duration::from_secs(5);
