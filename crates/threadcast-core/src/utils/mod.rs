//! Small pure helpers used by assembly and the adapters.

pub mod request_gate;
pub mod text;

pub use request_gate::{RequestGate, RequestTicket};
pub use text::{clean_text, extract_status_id, split_lines};
