//! # loanpool
//!
//! Thread-safe object pool that lends reusable, expensive-to-create
//! resources and takes them back when callers are done.
//!
//! ## Features
//!
//! - Free-scan pools that lend the first free entry and grow up to a maximum
//! - Keyed pools over a fixed registry of addressable resources
//! - Never-blocking borrow, with an optional polling async borrow on top
//! - Automatic return of loans via RAII (Drop trait)
//! - Process-wide or injected serial numbering for created resources
//! - Health status and metrics, with Prometheus text export
//!
//! ## Quick Start
//!
//! ```rust
//! use loanpool::{ObjectPool, PoolConfiguration};
//!
//! let config = PoolConfiguration::new().with_initial_size(2).with_max_size(3);
//! let pool = ObjectPool::new(|| vec![0u8; 1024], config).unwrap();
//!
//! let buffer = pool.borrow_object().unwrap();
//! assert_eq!(buffer.len(), 1024);
//! pool.return_object(&buffer);
//!
//! {
//!     let guard = pool.borrow_guarded().unwrap();
//!     println!("Got {} bytes", guard.len());
//!     // Loan returned when `guard` goes out of scope
//! }
//! ```

mod config;
mod entry;
mod errors;
mod health;
mod metrics;
mod pool;
mod power_bank;
mod serial;
mod strategy;

pub use config::PoolConfiguration;
pub use entry::PooledEntry;
pub use errors::{PoolError, PoolResult};
pub use health::HealthStatus;
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{KeyedObjectPool, ObjectPool, PooledObject};
pub use power_bank::{BOX_SLOTS, PowerBank, power_bank_box, power_bank_pool};
pub use serial::SerialCounter;
pub use strategy::IdentificationStrategy;
