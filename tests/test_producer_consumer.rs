use crossbeam::channel::unbounded;
use crossbeam::thread;
use rustbuffer::{BoundedBuffer, BufferBuilder, BufferConfig, Collector, Consumer, Error, Producer, SyncStrategy};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STRATEGIES: [SyncStrategy; 2] = [SyncStrategy::Monitor, SyncStrategy::Conditions];

fn count_values(values: &[u32]) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    return counts;
}

// Prepared data with repeated values, so conservation is checked on a multiset
fn prepared_data(seed: u32, len: u32) -> Vec<u32> {
    return (0..len).map(|i| (i * 7 + seed) % 13).collect();
}

#[test]
fn test_one_producer_one_consumer_in_order() {
    for strategy in STRATEGIES.iter() {
        let buffer = Arc::new(BufferBuilder::new().strategy(*strategy).build::<u32>().unwrap());
        assert_eq!(10, buffer.capacity());

        let values: Vec<u32> = (1..=20).collect();
        let producer = Producer::new(values.clone(), Duration::from_millis(2), buffer.clone()).spawn();
        let consumer = Consumer::new(20, buffer.clone()).spawn();

        producer.join().unwrap();
        assert_eq!(values, consumer.join().unwrap());
    }
}

#[test]
fn test_single_slot_many_producers_many_consumers() {
    for strategy in STRATEGIES.iter() {
        let buffer = Arc::new(BoundedBuffer::with_strategy(1, *strategy).unwrap());
        let data1 = prepared_data(1, 20);
        let data2 = prepared_data(5, 20);

        let collector = Collector::new(40, Duration::from_millis(10), buffer.clone());
        let consumers = collector.spawn(3);

        let p1 = Producer::new(data1.clone(), Duration::from_millis(2), buffer.clone()).spawn();
        let p2 = Producer::new(data2.clone(), Duration::from_millis(1), buffer.clone()).spawn();

        p1.join().unwrap();
        p2.join().unwrap();
        consumers.into_iter().for_each(|jh| jh.join().unwrap());

        let mut expected = data1.clone();
        expected.extend(data2);
        let collected = collector.take();

        assert_eq!(40, collected.len());
        assert_eq!(count_values(&expected), count_values(&collected));
        assert!(buffer.is_empty());
    }
}

#[test]
fn test_fast_producers_slow_consumer() {
    for strategy in STRATEGIES.iter() {
        let buffer = Arc::new(BoundedBuffer::with_strategy(3, *strategy).unwrap());
        let data1 = prepared_data(2, 10);
        let data2 = prepared_data(9, 10);

        let p1 = Producer::new(data1.clone(), Duration::from_millis(0), buffer.clone()).spawn();
        let p2 = Producer::new(data2.clone(), Duration::from_millis(0), buffer.clone()).spawn();
        let received = Consumer::new(20, buffer.clone()).pause(Duration::from_millis(2)).run();

        p1.join().unwrap();
        p2.join().unwrap();

        let mut expected = data1;
        expected.extend(data2);
        assert_eq!(count_values(&expected), count_values(&received));
    }
}

#[test]
fn test_conservation_many_threads() {
    let producers = 4u32;
    let consumers = 3usize;
    let per_producer = 500u32;

    for strategy in STRATEGIES.iter() {
        let buffer = BoundedBuffer::with_strategy(5, *strategy).unwrap();
        let (tx, rx) = unbounded();
        let total = (producers * per_producer) as usize;

        thread::scope(|s| {
            for p in 0..producers {
                let buffer = &buffer;
                s.spawn(move |_| {
                    for i in 0..per_producer {
                        buffer.put(p * per_producer + i);
                    }
                });
            }

            for c in 0..consumers {
                let buffer = &buffer;
                let tx = tx.clone();
                // split the total between consumers, the first one takes the remainder
                let share = total / consumers + if c == 0 { total % consumers } else { 0 };
                s.spawn(move |_| {
                    for _ in 0..share {
                        let value = buffer.get();
                        assert!(buffer.len() <= buffer.capacity());
                        tx.send(value).unwrap();
                    }
                });
            }
        })
        .unwrap();

        drop(tx);
        let mut received: Vec<u32> = rx.iter().collect();
        received.sort();
        let expected: Vec<u32> = (0..producers * per_producer).collect();
        assert_eq!(expected, received);
    }
}

#[test]
fn test_fifo_per_producer() {
    for strategy in STRATEGIES.iter() {
        let buffer = BoundedBuffer::with_strategy(2, *strategy).unwrap();
        let per_producer = 200u32;

        let received = thread::scope(|s| {
            for p in 0..2u32 {
                let buffer = &buffer;
                s.spawn(move |_| {
                    for i in 0..per_producer {
                        buffer.put((p, i));
                    }
                });
            }

            let mut received = Vec::new();
            for _ in 0..2 * per_producer {
                received.push(buffer.get());
            }
            received
        })
        .unwrap();

        // values of the same producer come out in the order they were put
        for p in 0..2u32 {
            let order: Vec<u32> = received.iter().filter(|(from, _)| *from == p).map(|(_, i)| *i).collect();
            assert_eq!((0..per_producer).collect::<Vec<u32>>(), order);
        }
    }
}

#[test]
fn test_put_blocks_when_full() {
    for strategy in STRATEGIES.iter() {
        let buffer = BoundedBuffer::with_strategy(2, *strategy).unwrap();
        buffer.put(1);
        buffer.put(2);
        let returned = AtomicBool::new(false);

        thread::scope(|s| {
            s.spawn(|_| {
                buffer.put(3);
                returned.store(true, Ordering::SeqCst);
            });

            std::thread::sleep(Duration::from_millis(50));
            assert!(!returned.load(Ordering::SeqCst));
            assert_eq!(2, buffer.len());

            assert_eq!(1, buffer.get());
        })
        .unwrap();

        assert!(returned.load(Ordering::SeqCst));
        assert_eq!(2, buffer.get());
        assert_eq!(3, buffer.get());
    }
}

#[test]
fn test_invalid_capacity() {
    match BoundedBuffer::<u32>::new(0) {
        Err(Error::InvalidConfiguration(_)) => {}
        _ => panic!("capacity 0 must be rejected"),
    }

    match BufferConfig::from_json(r#"{"capacity": -3}"#) {
        Err(Error::InvalidConfiguration(_)) => {}
        _ => panic!("negative capacity must be rejected"),
    }

    let config = BufferConfig {
        capacity: -1,
        strategy: SyncStrategy::Conditions,
    };
    assert!(BoundedBuffer::<u32>::from_config(&config).is_err());
}
