//! Low-level SSE transport: line decoding plus the resumable reconnect
//! loop built over it.

pub mod parser;
pub mod reconnect;

pub use parser::SseEvent;
pub use reconnect::ReconnectPolicy;
