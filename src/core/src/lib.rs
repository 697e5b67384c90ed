pub mod configuration;
pub mod data_capture;
pub mod error_handling;
pub mod network;
pub mod redaction;
pub mod replay;
pub mod sampling;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use network::start_mirror_proxy;
pub use replay::replay;
