//! Blocking handshake between the test thread and the render loop.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Mutex;

/// Single-flight rendezvous barrier.
///
/// The test thread calls [`ping`](Self::ping) to block until the render loop
/// finishes its current frame; the loop calls [`pong`](Self::pong) once per
/// draw. Both signals travel over capacity-1 channels, so at most one
/// unserved ping exists at any time: a second `ping` queues behind the first
/// instead of overtaking it. Single-flight is part of the contract;
/// concurrent assertions are not supported.
///
/// Liveness contract: `ping` blocks forever if the loop stops pumping
/// `pong`. Callers must keep the loop alive for every ping they issue, and
/// must only request termination while no ping is outstanding.
#[derive(Debug)]
pub struct Rendezvous {
    ping_tx: SyncSender<()>,
    ping_rx: Mutex<Receiver<()>>,
    pong_tx: SyncSender<()>,
    pong_rx: Mutex<Receiver<()>>,
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::new()
    }
}

impl Rendezvous {
    /// Create a new barrier
    #[must_use]
    pub fn new() -> Self {
        let (ping_tx, ping_rx) = sync_channel(1);
        let (pong_tx, pong_rx) = sync_channel(1);
        Self {
            ping_tx,
            ping_rx: Mutex::new(ping_rx),
            pong_tx,
            pong_rx: Mutex::new(pong_rx),
        }
    }

    /// Block until the render loop serves this ping with a pong.
    ///
    /// Test thread only. Blocks behind any earlier unserved ping.
    pub fn ping(&self) {
        // Both halves live in self, so the channels cannot disconnect
        self.ping_tx.send(()).unwrap();
        self.pong_rx.lock().unwrap().recv().unwrap();
    }

    /// Serve an outstanding ping, if any. Returns whether one was served.
    ///
    /// Called once per frame from the draw phase. Never blocks: when no ping
    /// is waiting this is a no-op, so the render loop's cadence is never
    /// stalled by an absent tester.
    pub fn pong(&self) -> bool {
        if self.ping_rx.lock().unwrap().try_recv().is_ok() {
            self.pong_tx.send(()).unwrap();
            return true;
        }
        false
    }
}
