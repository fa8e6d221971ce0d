//! Interrupt observation for foreground sessions.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use thiserror::Error;

/// Abstraction over interrupt delivery.
///
/// The driver consults this after the foreground app returns to tell an
/// interrupted session apart from an app failure; it never blocks on it.
pub trait InterruptSignal: Send + Sync {
    /// True once an interrupt has been delivered to the orchestrator.
    fn fired(&self) -> bool;
}

/// Errors reported while installing interrupt observation.
#[derive(Debug, Error)]
pub enum InterruptError {
    /// Installing a signal handler failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Interrupt observer backed by SIGINT and SIGTERM handlers.
///
/// The handlers only raise a flag; the orchestrator survives the signal and
/// classifies the session outcome once the foreground child has gone down
/// with it.
pub struct SystemInterrupt {
    flag: Arc<AtomicBool>,
}

impl SystemInterrupt {
    /// Installs the signal handlers and returns the observer.
    ///
    /// # Errors
    /// Returns [`InterruptError::Install`] when a handler cannot be
    /// registered.
    pub fn new() -> Result<Self, InterruptError> {
        let flag = Arc::new(AtomicBool::new(false));
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&flag))
                .map_err(|source| InterruptError::Install { source })?;
        }
        Ok(Self { flag })
    }
}

impl InterruptSignal for SystemInterrupt {
    fn fired(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
