use bytepipe::{Config, Connection, Error, FlowConnection};
use bytepipe::transport::StdTransport;
use log::{info, warn};
use std::net::TcpListener;
use std::time::Instant;

const LISTEN_ADDR: &str = "127.0.0.1:7171";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let listener = TcpListener::bind(LISTEN_ADDR).expect("Failed to bind listener");
    info!("Server listening on {}", LISTEN_ADDR);

    let (stream, peer) = listener.accept().expect("Failed to accept connection");
    info!("Client connected from {}", peer);
    stream.set_nonblocking(true).expect("Failed to set non-blocking");
    stream.set_nodelay(true).expect("Failed to set nodelay");

    let mut conn: FlowConnection<_, 8192> = FlowConnection::new(
        StdTransport::new(stream),
        Config::default()
            .with_flow_control(true)
            .with_max_read_size(1024),
    );

    // Echo everything back until the client hangs up
    let start = Instant::now();
    let mut echoed = 0usize;
    let mut chunk = [0u8; 1024];
    loop {
        match conn.try_read(&mut chunk) {
            Ok(0) => std::thread::yield_now(),
            Ok(n) => {
                conn.write(&chunk[..n]).expect("Failed to echo");
                echoed += n;
            }
            Err(Error::EndOfStream) => break,
            Err(e) => {
                warn!("Connection error: {}", e);
                break;
            }
        }
    }
    let elapsed = start.elapsed();

    if conn.overflowed() {
        warn!("Receive buffer overflowed during the session");
    }

    info!("=== Echo Complete ===");
    info!("Total echoed: {} KB", echoed / 1024);
    info!("Time: {:.2} seconds", elapsed.as_secs_f64());
    info!(
        "Speed: {:.2} KB/s",
        (echoed as f64 / 1024.0) / elapsed.as_secs_f64()
    );
}
