//! Background tick pacing.
//!
//! Spawns a thread that delivers tick signals over a bounded channel at the
//! wall-clock period `timestep / speedup`. The channel depth is one and the
//! send blocks, so ticks can never overlap: a consumer still processing the
//! previous tick simply delays delivery of the next one.
//!
//! Safety: each `Ticker` spawns exactly one thread that is shut down when
//! the `Ticker` is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use roast_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct Ticker {
    rx: xch::Receiver<u64>,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<C: Clock + Send + Sync + 'static>(period: Duration, clock: C) -> Self {
        let (tx, rx) = xch::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            let mut seq: u64 = 0;
            loop {
                // Immediate shutdown check (lock-free atomic)
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Ticker thread received shutdown signal");
                    break;
                }

                clock.sleep(period);

                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                // If send fails, consumer is gone; exit gracefully
                if tx.send(seq).is_err() {
                    tracing::debug!("Ticker consumer disconnected, exiting thread");
                    break;
                }
                seq = seq.wrapping_add(1);
            }
            tracing::trace!("Ticker thread exiting cleanly");
        });

        Self {
            rx,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Block until the next tick fires; `None` once the ticker has shut down.
    pub fn recv(&self) -> Option<u64> {
        self.rx.recv().ok()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        // Signal shutdown first so the thread exits after its current sleep.
        self.shutdown.store(true, Ordering::Relaxed);
        // Drain a possibly pending tick so a blocked send wakes up.
        let _ = self.rx.try_recv();

        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Ticker thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "Ticker thread panicked during shutdown");
                }
            }
        }
    }
}
