//! Buffer configuration
use crate::buffer::{BoundedBuffer, DEFAULT_CAPACITY};
use crate::errors::{Error, Result};
use crate::signal::SyncStrategy;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::sync::Arc;

/// Buffer settings, usually read from a JSON document such as `{"capacity": 5, "strategy": "monitor"}`.
/// Missing fields take their default values.
///
/// The capacity is kept signed so that negative values coming from outside are reported as an
/// invalid configuration rather than failing to parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of values in the buffer, must be greater than 0
    pub capacity: i64,
    /// How blocked producers and consumers are woken up
    pub strategy: SyncStrategy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        return BufferConfig {
            capacity: DEFAULT_CAPACITY as i64,
            strategy: SyncStrategy::default(),
        };
    }
}

impl BufferConfig {
    /// Reads a configuration from JSON. The result is validated
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BufferConfig = serde_json::from_str(json)?;
        config.validate()?;
        return Ok(config);
    }

    /// Checks the capacity is positive, returning it as a `usize`
    pub fn validate(&self) -> Result<usize> {
        if self.capacity <= 0 {
            return Err(Error::InvalidConfiguration(format!("capacity must be greater than 0, got {}", self.capacity)));
        }

        return usize::try_from(self.capacity).map_err(|_| Error::InvalidConfiguration(format!("capacity {} is too large", self.capacity)));
    }

    /// Creates a buffer from this configuration
    pub fn build<T>(&self) -> Result<BoundedBuffer<T>> {
        let capacity = self.validate()?;
        return BoundedBuffer::with_strategy(capacity, self.strategy);
    }
}

impl<T> BoundedBuffer<T> {
    /// Create a new buffer from a configuration
    pub fn from_config(config: &BufferConfig) -> Result<Self> {
        return config.build();
    }
}

/// Builder for buffers
pub struct BufferBuilder {
    capacity: usize,
    strategy: SyncStrategy,
}

impl BufferBuilder {
    /// Creates a new buffer builder with the default capacity and strategy
    pub fn new() -> Self {
        return BufferBuilder {
            capacity: DEFAULT_CAPACITY,
            strategy: SyncStrategy::default(),
        };
    }

    /// Sets the maximum number of values in the buffer
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        return self;
    }

    /// Uses a single condition shared by producers and consumers
    pub fn monitor(mut self) -> Self {
        self.strategy = SyncStrategy::Monitor;
        return self;
    }

    /// Uses separate conditions for producers and consumers
    pub fn conditions(mut self) -> Self {
        self.strategy = SyncStrategy::Conditions;
        return self;
    }

    /// Sets the synchronization strategy
    pub fn strategy(mut self, strategy: SyncStrategy) -> Self {
        self.strategy = strategy;
        return self;
    }

    /// Creates a buffer using the given builder parameters
    pub fn build<T>(&self) -> Result<BoundedBuffer<T>> {
        return BoundedBuffer::with_strategy(self.capacity, self.strategy);
    }

    /// Creates a buffer wrapped as an atomic reference counter
    pub fn build_arc<T>(&self) -> Result<Arc<BoundedBuffer<T>>> {
        return Ok(Arc::new(self.build()?));
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        return BufferBuilder::new();
    }
}

impl From<&BufferConfig> for BufferBuilder {
    fn from(config: &BufferConfig) -> Self {
        // negative capacities become 0 so that build reports them
        let capacity = usize::try_from(config.capacity).unwrap_or(0);
        return BufferBuilder::new().capacity(capacity).strategy(config.strategy);
    }
}
