use bytepipe::{Config, Connection, FlowConnection};
use bytepipe::transport::StdTransport;
use log::info;
use std::net::TcpStream;
use std::time::Instant;

const SERVER_ADDR: &str = "127.0.0.1:7171";

const DATA_SIZE: usize = 256 * 1024; // 256 KB

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Connecting to server at {}...", SERVER_ADDR);
    let stream = TcpStream::connect(SERVER_ADDR).expect("Failed to connect to server");
    info!("Connected!");
    stream.set_nonblocking(true).expect("Failed to set non-blocking");
    stream.set_nodelay(true).expect("Failed to set nodelay");

    let mut conn: FlowConnection<_, 8192> = FlowConnection::new(
        StdTransport::new(stream),
        Config::default()
            .with_flow_control(true)
            .with_max_read_size(1024),
    );

    let data: Vec<u8> = (0..DATA_SIZE).map(|i| (i % 251) as u8).collect();

    info!("Sending {} KB and reading the echo...", DATA_SIZE / 1024);
    let start = Instant::now();

    // Interleave sending and draining so neither side stalls on a
    // full socket buffer
    let mut sent = 0usize;
    let mut received = Vec::with_capacity(DATA_SIZE);
    let mut chunk = [0u8; 1024];
    while received.len() < DATA_SIZE {
        if sent < DATA_SIZE {
            let end = (sent + 4096).min(DATA_SIZE);
            conn.write(&data[sent..end]).expect("Failed to send");
            sent = end;
        }
        match conn.try_read(&mut chunk) {
            Ok(0) => std::thread::yield_now(),
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) => panic!("Failed to read echo: {}", e),
        }
    }
    let elapsed = start.elapsed();

    if received == data {
        info!("Echo matches exactly");
    } else {
        info!("Echo does not match");
    }

    info!("=== Round Trip Complete ===");
    info!("Total sent: {} KB", DATA_SIZE / 1024);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!(
        "Speed: {:.2} KB/s",
        (DATA_SIZE as f64 / 1024.0) / elapsed.as_secs_f64()
    );
}
