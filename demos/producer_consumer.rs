/// Two producers and three consumers sharing a small buffer
use rustbuffer::{BufferConfig, Collector, Producer};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    // the configuration would usually come from a file
    let config = BufferConfig::from_json(r#"{"capacity": 4, "strategy": "conditions"}"#).unwrap();
    let buffer = Arc::new(config.build::<u32>().unwrap());

    println!("buffer capacity {} using {:?}", buffer.capacity(), buffer.strategy());

    // three consumers drain the buffer until 40 values were collected
    let collector = Collector::new(40, Duration::from_millis(50), buffer.clone());
    let consumers = collector.spawn(3);

    let p1 = Producer::new((0..20).collect(), Duration::from_millis(5), buffer.clone()).spawn();
    let p2 = Producer::new((100..120).collect(), Duration::from_millis(2), buffer.clone()).spawn();

    p1.join().unwrap();
    p2.join().unwrap();
    consumers.into_iter().for_each(|jh| jh.join().unwrap());

    let mut values = collector.take();
    println!("collected {} values", values.len());

    values.sort();
    println!("{:?}", values);
}
