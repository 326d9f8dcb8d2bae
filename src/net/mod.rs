pub mod event;
pub mod handler;
pub mod listener;

pub use event::{
    create_client_channel, create_event_channel, ClientSender, EventReceiver, EventSender,
    GameEvent,
};
pub use handler::spawn_handler;
pub use listener::{accept_loop, create_shared_ledger, create_tcp_listener, SeatLedger, SharedLedger};
