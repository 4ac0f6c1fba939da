mod socket;

pub use socket::{handle_websocket_upgrade, is_websocket_upgrade};
