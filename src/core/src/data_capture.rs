pub mod capture_recorder;

pub use capture_recorder::{CaptureRecorder, MAX_CAPTURE_BYTES};
