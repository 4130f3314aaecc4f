/// A single slot buffer: every put waits for the matching get
use rustbuffer::{BoundedBuffer, CancelToken};
use std::thread;
use std::time::Duration;

fn main() {
    let buffer = BoundedBuffer::<String>::new_arc(1).unwrap();

    let producer = buffer.clone();
    let handle = thread::spawn(move || {
        for round in 0..3 {
            producer.put(format!("message {}", round));
            println!("handed off message {}", round);
        }
    });

    for _ in 0..3 {
        thread::sleep(Duration::from_millis(100));
        println!("received {}", buffer.get());
    }
    handle.join().unwrap();

    // a consumer waiting for a value that never comes can be told to stop
    let token = CancelToken::new();
    let consumer = buffer.clone();
    let ctoken = token.clone();
    let waiting = thread::spawn(move || consumer.get_cancellable(&ctoken));

    thread::sleep(Duration::from_millis(100));
    buffer.cancel(&token);

    match waiting.join().unwrap() {
        Ok(value) => println!("unexpected value {}", value),
        Err(e) => println!("consumer stopped: {}", e),
    }

    // the buffer is still usable
    if let Err(e) = buffer.put_timeout("late".to_string(), Duration::from_millis(10)) {
        println!("could not put: {}", e);
    }
    println!("items in the buffer {}", buffer.len());
}
