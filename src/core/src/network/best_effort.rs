use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, warn};
use uuid::Uuid;

/// Side effects a sampled connection may trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    MirrorForward,
    LogPersist,
}

impl fmt::Display for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffect::MirrorForward => write!(f, "Mirror to target"),
            SideEffect::LogPersist => write!(f, "Mirror log write"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

/// Terminal point for mirroring side effects.
///
/// It takes the result of a side effect and only logs it: there is no error
/// path out of here, so a failed forward or log write cannot reach the
/// proxied connection.
#[derive(Debug, Default)]
pub struct BestEffortSink {
    failures: AtomicU64,
}

impl BestEffortSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report<T, E: fmt::Display>(
        &self,
        conn_id: Uuid,
        effect: SideEffect,
        result: Result<T, E>,
    ) -> Outcome {
        match result {
            Ok(_) => {
                debug!("[{}] {} succeeded", conn_id, effect);
                Outcome::Done
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!("[{}] {} failed: {}", conn_id, effect, e);
                Outcome::Failed
            }
        }
    }

    /// Number of failed side effects reported so far.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_failures_only() {
        let sink = BestEffortSink::new();
        let id = Uuid::new_v4();
        assert_eq!(
            sink.report(id, SideEffect::MirrorForward, Ok::<(), String>(())),
            Outcome::Done
        );
        assert_eq!(
            sink.report(id, SideEffect::LogPersist, Err::<(), _>("disk full")),
            Outcome::Failed
        );
        assert_eq!(sink.failures(), 1);
    }
}
