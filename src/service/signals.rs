use anyhow::{Context, Result};
use signal_hook::consts::signal::*;
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Signal types forwarded to the `watch` loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Shutdown,
    /// SIGHUP: print the current device list again
    Refresh,
}

/// Turns SIGTERM/SIGINT/SIGHUP into [`SignalType`] messages
pub struct SignalHandler {
    signals: Signals,
    signal_sender: mpsc::UnboundedSender<SignalType>,
}

impl SignalHandler {
    /// Register for the signals right away, so none is lost between
    /// construction and the first poll. Must be called inside a runtime.
    pub fn new(signal_sender: mpsc::UnboundedSender<SignalType>) -> Result<Self> {
        let signals =
            Signals::new([SIGTERM, SIGINT, SIGHUP]).context("Failed to register signal handlers")?;

        info!("Signal handler initialized, listening for SIGTERM, SIGINT, SIGHUP");
        Ok(Self {
            signals,
            signal_sender,
        })
    }

    /// Forward signals until a shutdown signal arrives or the receiver goes away
    pub async fn listen_for_signals(mut self) {
        let handle = self.signals.handle();

        while let Some(signal) = self.signals.next().await {
            match signal {
                SIGTERM | SIGINT => {
                    info!("Received shutdown signal ({}), stopping", signal);
                    let _ = self.signal_sender.send(SignalType::Shutdown);
                    break;
                }
                SIGHUP => {
                    info!("Received SIGHUP, refreshing device list");
                    if self.signal_sender.send(SignalType::Refresh).is_err() {
                        warn!("Signal receiver dropped, stopping signal handler");
                        break;
                    }
                }
                _ => {
                    warn!("Received unexpected signal: {}", signal);
                }
            }
        }

        handle.close();
    }
}
