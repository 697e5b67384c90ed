//! Mirror proxy networking.
//!
//! ```text
//! inbound ──▶ MirrorProxy ──▶ local service (127.0.0.1:<local_port>)
//!                 │ tap (inbound → local only)
//!                 ▼
//!          CaptureRecorder ──▶ sample ─▶ redact ─┬─▶ mirror target
//!                                                └─▶ Storage (log dir)
//! ```
//!
//! Everything after the tap is best effort: failures are logged through a
//! [`BestEffortSink`](best_effort::BestEffortSink) and never reach the
//! relayed connection.

pub mod best_effort;
pub mod mirror_proxy;
pub mod payload_sender;
pub mod relay;


pub use mirror_proxy::{start_mirror_proxy, MirrorProxy};
pub use payload_sender::send_payload;
pub use relay::Direction;
