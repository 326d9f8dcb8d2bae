mod game;
mod net;
mod protocol;
mod server;

use log::{error, info};
use net::{accept_loop, create_event_channel, create_shared_ledger, create_tcp_listener};
use server::game_loop;
use std::env;
use std::net::SocketAddr;
use std::thread;

const DEFAULT_PORT: u16 = 8888;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = parse_port_from_args().unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse().expect("Invalid address");

    let listener = match create_tcp_listener(addr) {
        Ok(l) => l,
        Err(e) => {
            error!("[SERVER] Failed to create listener: {}", e);
            std::process::exit(1);
        }
    };

    let local_addr = listener.local_addr().expect("Failed to get local address");
    info!("[SERVER] Listening on {}", local_addr);

    let ledger = create_shared_ledger();
    let (event_tx, event_rx) = create_event_channel();

    let accept_ledger = ledger.clone();
    thread::spawn(move || {
        accept_loop(listener, accept_ledger, event_tx);
    });

    game_loop(event_rx, ledger);
}

fn parse_port_from_args() -> Option<u16> {
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
        i += 1;
    }
    None
}
