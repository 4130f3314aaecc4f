//! Producer and consumer threads for a shared buffer
use crate::buffer::BoundedBuffer;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Puts a prepared list of values into a buffer, pausing after each one
pub struct Producer<T> {
    values: Vec<T>,
    pause: Duration,
    buffer: Arc<BoundedBuffer<T>>,
}

impl<T: Send + 'static> Producer<T> {
    /// Creates a producer for `values`, sleeping `pause` after each put
    pub fn new(values: Vec<T>, pause: Duration, buffer: Arc<BoundedBuffer<T>>) -> Self {
        return Producer {
            values: values,
            pause: pause,
            buffer: buffer,
        };
    }

    /// Puts every value on the current thread, in order
    pub fn run(self) {
        let count = self.values.len();
        for value in self.values {
            self.buffer.put(value);
            if !self.pause.is_zero() {
                thread::sleep(self.pause);
            }
        }
        debug!("producer finished after {} values", count);
    }

    /// Runs the producer on a new thread
    pub fn spawn(self) -> JoinHandle<()> {
        return thread::spawn(move || self.run());
    }
}

/// Takes a fixed number of values from a buffer
pub struct Consumer<T> {
    count: usize,
    pause: Duration,
    buffer: Arc<BoundedBuffer<T>>,
}

impl<T: Send + 'static> Consumer<T> {
    /// Creates a consumer that takes `count` values
    pub fn new(count: usize, buffer: Arc<BoundedBuffer<T>>) -> Self {
        return Consumer {
            count: count,
            pause: Duration::from_millis(0),
            buffer: buffer,
        };
    }

    /// Sleeps `pause` after each value, simulating a slow consumer
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        return self;
    }

    /// Takes the values on the current thread, returning them in the order they were received
    pub fn run(self) -> Vec<T> {
        let mut received = Vec::with_capacity(self.count);
        while received.len() < self.count {
            received.push(self.buffer.get());
            if !self.pause.is_zero() {
                thread::sleep(self.pause);
            }
        }
        return received;
    }

    /// Runs the consumer on a new thread
    pub fn spawn(self) -> JoinHandle<Vec<T>> {
        return thread::spawn(move || self.run());
    }
}

/// Several consumers draining one buffer into a shared list until a total number of values was collected.
///
/// Consumers don't know in advance how many values each of them will get, so they poll the buffer with
/// `poll` as timeout and stop once the target is reached.
pub struct Collector<T> {
    target: usize,
    poll: Duration,
    collected: Arc<Mutex<Vec<T>>>,
    buffer: Arc<BoundedBuffer<T>>,
}

impl<T: Send + 'static> Collector<T> {
    /// Creates a collector that stops after `target` values
    pub fn new(target: usize, poll: Duration, buffer: Arc<BoundedBuffer<T>>) -> Self {
        return Collector {
            target: target,
            poll: poll,
            collected: Arc::new(Mutex::new(Vec::with_capacity(target))),
            buffer: buffer,
        };
    }

    /// Starts `consumers` threads draining the buffer
    pub fn spawn(&self, consumers: usize) -> Vec<JoinHandle<()>> {
        let mut jhv = Vec::with_capacity(consumers);
        for _ in 0..consumers {
            let target = self.target;
            let poll = self.poll;
            let collected = self.collected.clone();
            let buffer = self.buffer.clone();

            jhv.push(thread::spawn(move || Collector::drain(target, poll, &collected, &buffer)));
        }
        return jhv;
    }

    fn drain(target: usize, poll: Duration, collected: &Mutex<Vec<T>>, buffer: &BoundedBuffer<T>) {
        loop {
            if collected.lock().len() >= target {
                return;
            }

            // a timeout only means the buffer was empty for a while, check the target again
            if let Ok(value) = buffer.get_timeout(poll) {
                collected.lock().push(value);
            }
        }
    }

    /// Returns how many values were collected so far
    pub fn len(&self) -> usize {
        return self.collected.lock().len();
    }

    /// Returns true if nothing was collected yet
    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    /// Takes the collected values out of the collector
    pub fn take(&self) -> Vec<T> {
        return std::mem::take(&mut *self.collected.lock());
    }
}
