//! Streaming ingestion pipeline.
//!
//! ```text
//! LineSource -> parse_record -> Batcher -> bounded queue -> WorkerPool -> BatchSink
//!                                              ^                 |
//!                                              +-- error signal -+
//! ```
//!
//! One reader (the coordinator) feeds `W` writer tasks through a bounded
//! queue. The first write failure stops the reader; every writer is awaited
//! before the run returns.

mod batch;
mod coordinator;
mod handoff;
mod loader;
mod pool;
mod sink;
mod source;

pub use batch::{Batch, BatchRange, Batcher};
pub use coordinator::{Coordinator, CoordinatorState};
pub use handoff::{hand_off, Handoff};
pub use loader::{load_streaming, read_all_records, LoadReport, Loader};
pub use pool::WorkerPool;
pub use sink::BatchSink;
pub use source::{LineSource, RawRow};
