mod hub;

pub use hub::{Frame, Listener, ListenerId, NotificationHub};
