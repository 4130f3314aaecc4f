//! A bounded blocking producer/consumer buffer library for Rust
#![warn(missing_docs)]
mod buffer;
mod cancel;
mod config;
pub mod errors;
mod signal;
mod worker;

pub use buffer::BoundedBuffer;
pub use buffer::DEFAULT_CAPACITY;
pub use cancel::CancelToken;
pub use config::{BufferBuilder, BufferConfig};
pub use errors::{Error, PutError, Result};
pub use signal::SyncStrategy;

pub use worker::{Collector, Consumer, Producer};
