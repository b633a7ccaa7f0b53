//! Watermark predicates driving the XON/XOFF handshake.
//!
//! This example walks a buffer through a fill/drain cycle and prints
//! the flow-control decisions an adapter would take at each step.
//!
//! Run with: cargo run --example flow_control --features std

use bytepipe::{FlowControlBuffer, XOFF, XON};

fn main() {
    println!("=== Bytepipe Flow Control Example ===\n");

    // Capacity 10, pause at 7, resume at 3
    let buf: FlowControlBuffer<10> = FlowControlBuffer::new(7, 3);
    let mut paused = false;

    println!("1. Producer fills the buffer:");
    for i in 0u8..9 {
        if !buf.put(i) {
            println!("   put({i}) rejected: buffer full");
            continue;
        }
        // The predicate is level-triggered; the adapter sends the
        // control byte only on the pause transition
        if !paused && buf.should_send_xoff() {
            println!(
                "   occupancy {} >= high watermark {} -> send XOFF ({XOFF:#04x})",
                buf.count(),
                buf.high_watermark()
            );
            paused = true;
        } else {
            println!("   put({i}) ok, occupancy {}", buf.count());
        }
    }

    println!("\n2. Consumer drains it:");
    while let Some(b) = buf.get() {
        if paused && buf.should_send_xon() {
            println!(
                "   occupancy {} <= low watermark {} -> send XON ({XON:#04x})",
                buf.count(),
                buf.low_watermark()
            );
            paused = false;
        } else {
            println!("   got({b}), occupancy {}", buf.count());
        }
    }

    println!("\n=== Done ===");
}
