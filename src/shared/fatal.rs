//! Process-wide fatal signal.
//!
//! Components that hit an unrecoverable condition raise it; the binary
//! watches it, stops the server and exits non-zero.

use tokio::sync::watch;

/// Cloneable handle onto one fatal signal.
#[derive(Debug, Clone)]
pub struct FatalSignal {
    tx: watch::Sender<Option<String>>,
}

impl FatalSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Record the first unrecoverable error. Later calls are ignored.
    pub fn raise(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason.clone());
            true
        });
        if first {
            tracing::error!(reason = %reason, "Fatal error raised");
        }
    }

    /// The raised reason, if any.
    pub fn reason(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Resolve once the signal is raised.
    pub async fn raised(&self) -> String {
        let mut rx = self.tx.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(reason) => reason.clone().unwrap_or_default(),
            // Unreachable while `self` holds the sender
            Err(_) => String::new(),
        };
        reason
    }
}

impl Default for FatalSignal {
    fn default() -> Self {
        Self::new()
    }
}
