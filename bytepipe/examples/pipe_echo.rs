//! Echo over an in-memory pipe.
//!
//! This example demonstrates the pipe as an intra-process transport:
//! - One thread owns end B and echoes every byte back
//! - The main thread writes messages on end A and reads the echo
//!
//! Run with: cargo run --example pipe_echo --features std

use bytepipe::{Connection, Error, Pipe};
use std::thread;

fn main() {
    println!("=== Bytepipe Pipe Echo Example ===\n");

    let (mut end_a, mut end_b) = Pipe::<4096>::new().into_ends();

    // Echo thread: reads one byte at a time, writes it straight back
    let echo = thread::spawn(move || {
        loop {
            match end_b.read_one() {
                Ok(b) => {
                    if end_b.write(&[b]).is_err() {
                        return;
                    }
                }
                Err(Error::EndOfStream) => return,
                Err(e) => panic!("echo failed: {e}"),
            }
        }
    });

    let messages = [
        "Hello, Pipe!",
        "This is a test message.",
        "Bytepipe is working!",
        "Final message.",
    ];

    for (i, msg) in messages.iter().enumerate() {
        end_a.write(msg.as_bytes()).expect("write failed");
        println!("   [{}] Sent: {}", i + 1, msg);

        let mut buf = vec![0u8; msg.len()];
        let n = end_a.read(&mut buf).expect("read failed");
        let echoed = core::str::from_utf8(&buf[..n]).unwrap_or("<invalid>");
        println!("   [{}] Echoed back: {}", i + 1, echoed);
    }

    // Hanging up our end terminates the echo thread
    drop(end_a);
    echo.join().unwrap();

    println!("\n=== Done ===");
}
