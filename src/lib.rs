pub mod listener;
pub mod relay;
pub mod session;

pub use listener::Listener;
pub use session::{Limits, Session};
