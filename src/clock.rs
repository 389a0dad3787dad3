// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Tick Source

//! Cancellable recurring tick delivery.
//!
//! The engine itself never touches a timer primitive: it receives
//! explicit `tick()` calls, which makes simulated-clock tests trivial.
//! This module is the real-time glue used by hosting processes -- a
//! thread that fires a callback once per period until the callback says
//! stop or the handle is stopped/dropped. Dropping the handle stops the
//! thread, so an ended auction can never leak a recurring timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

// ─── Ticker ──────────────────────────────────────────────────────────────────

pub struct Ticker;

impl Ticker {
    /// Fire `on_tick` every `period` until it returns `false`.
    ///
    /// The first fire happens one full period after the call, matching
    /// a countdown that shows its starting value for one second.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> TickerHandle
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let thread = std::thread::spawn(move || loop {
            std::thread::sleep(period);
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            if !on_tick() {
                break;
            }
        });
        TickerHandle {
            stop,
            thread: Some(thread),
        }
    }
}

// ─── TickerHandle ────────────────────────────────────────────────────────────

/// Handle to a running tick loop. Stopping (or dropping) the handle
/// signals the loop and joins the thread; once `stop` returns, no
/// further tick will ever fire.
pub struct TickerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Wrap an externally spawned loop that polls the same stop flag.
    pub fn from_parts(stop: Arc<AtomicBool>, thread: JoinHandle<()>) -> Self {
        Self {
            stop,
            thread: Some(thread),
        }
    }

    /// Signal the loop and wait for it to finish.
    pub fn stop(self) {
        // Drop does the work.
    }

    /// Wait for the loop to finish on its own (callback returned false).
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn ticker_fires_until_callback_quits() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let handle = Ticker::spawn(Duration::from_millis(2), move || {
            counter.fetch_add(1, Ordering::SeqCst) < 4
        });
        handle.join();
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn stop_prevents_further_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let counter = count.clone();
        let handle = Ticker::spawn(Duration::from_millis(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        std::thread::sleep(Duration::from_millis(20));
        handle.stop();
        let frozen = count.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }
}
