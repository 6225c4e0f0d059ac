//! Test doubles to simulate the differential bus and timer during
//! integration tests.
//!
//! [`SimBus`] records the transmit side as a list of timestamped line
//! segments in *virtual* bus time and replays it to the receive side.
//! The receiver's sampling position may never outrun the transmit
//! frontier, which keeps both clock domains coupled without a single
//! wall-clock sleep. Segments may be zero-length (a release immediately
//! followed by the next drive), preserving the delta ordering a back-to-
//! back word boundary needs.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mil1553_phy::core::LineState;
use mil1553_phy::protocol::traits::bit_timer::BitTimer;
use mil1553_phy::protocol::traits::rx_line::RxLine;
use mil1553_phy::protocol::traits::tx_line::TxLine;
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, Copy)]
struct Segment {
    start_ns: u64,
    state: LineState,
}

#[derive(Debug)]
struct BusState {
    /// Virtual time up to which the waveform is defined.
    frontier_ns: u64,
    /// Non-decreasing starts; equal starts are delta-ordered by index.
    segments: Vec<Segment>,
}

impl BusState {
    fn current_state(&self) -> LineState {
        self.segments.last().map_or(LineState::Idle, |s| s.state)
    }
}

struct Shared {
    bus: Mutex<BusState>,
    changed: Notify,
}

/// One differential pair observed by a transmitter and a receiver.
#[derive(Clone)]
pub struct SimBus {
    shared: Arc<Shared>,
}

#[allow(dead_code)]
impl SimBus {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                bus: Mutex::new(BusState {
                    frontier_ns: 0,
                    segments: vec![Segment {
                        start_ns: 0,
                        state: LineState::Idle,
                    }],
                }),
                changed: Notify::new(),
            }),
        }
    }

    /// Write handle driving this pair.
    pub fn tx(&self) -> SimTxLine {
        SimTxLine {
            shared: self.shared.clone(),
            gate: None,
        }
    }

    /// Write handle that consumes one semaphore permit per drive call,
    /// letting a test freeze the transmitter mid-frame.
    pub fn gated_tx(&self) -> (SimTxLine, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            SimTxLine {
                shared: self.shared.clone(),
                gate: Some(gate.clone()),
            },
            gate,
        )
    }

    /// Read handle sampling this pair from time zero.
    pub fn rx(&self) -> SimRxLine {
        SimRxLine {
            shared: self.shared.clone(),
            time_ns: 0,
            idx: 0,
        }
    }

    /// Let `gap` of bus time pass with the line undriven. Only meaningful
    /// while the transmitter is idle.
    pub fn advance_idle(&self, gap: Duration) {
        {
            let mut bus = self.shared.bus.lock().unwrap();
            assert_eq!(
                bus.current_state(),
                LineState::Idle,
                "advance_idle on a driven line"
            );
            bus.frontier_ns += gap.as_nanos() as u64;
        }
        self.shared.changed.notify_waiters();
    }

    /// Virtual time covered by the recorded waveform.
    pub fn frontier_ns(&self) -> u64 {
        self.shared.bus.lock().unwrap().frontier_ns
    }

    /// Suspend until the transmitter has produced signal up to `at_least_ns`.
    pub async fn wait_frontier(&self, at_least_ns: u64) {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.frontier_ns() >= at_least_ns {
                return;
            }
            notified.await;
        }
    }

    /// Suspend until the transmitter leaves the pair undriven.
    pub async fn wait_idle_line(&self) {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.shared.bus.lock().unwrap().current_state() == LineState::Idle {
                return;
            }
            notified.await;
        }
    }

    /// The recorded waveform as (start_ns, state) pairs.
    pub fn trace(&self) -> Vec<(u64, LineState)> {
        self.shared
            .bus
            .lock()
            .unwrap()
            .segments
            .iter()
            .map(|s| (s.start_ns, s.state))
            .collect()
    }
}

/// Transmit half of a [`SimBus`].
pub struct SimTxLine {
    shared: Arc<Shared>,
    gate: Option<Arc<Semaphore>>,
}

impl TxLine for SimTxLine {
    type Error = ();

    async fn drive(&mut self, state: LineState, hold: Duration) -> Result<(), ()> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.map_err(|_| ())?.forget();
        }
        {
            let mut bus = self.shared.bus.lock().unwrap();
            if bus.current_state() != state {
                let start_ns = bus.frontier_ns;
                bus.segments.push(Segment { start_ns, state });
            }
            bus.frontier_ns += hold.as_nanos() as u64;
        }
        self.shared.changed.notify_waiters();
        Ok(())
    }

    fn release(&mut self) -> Result<(), ()> {
        {
            let mut bus = self.shared.bus.lock().unwrap();
            if bus.current_state() != LineState::Idle {
                let start_ns = bus.frontier_ns;
                bus.segments.push(Segment {
                    start_ns,
                    state: LineState::Idle,
                });
            }
        }
        self.shared.changed.notify_waiters();
        Ok(())
    }
}

/// Receive half of a [`SimBus`]: a forward-only cursor through the
/// recorded waveform.
pub struct SimRxLine {
    shared: Arc<Shared>,
    time_ns: u64,
    /// Index of the segment the cursor last observed; disambiguates
    /// zero-length segments sharing a timestamp.
    idx: usize,
}

impl SimRxLine {
    /// Last segment governing `time`, respecting delta order: a segment
    /// starting exactly at `time` counts only if the cursor has already
    /// observed it.
    fn governing(segments: &[Segment], time_ns: u64, idx: usize) -> usize {
        let mut g = 0;
        for (i, s) in segments.iter().enumerate() {
            if s.start_ns < time_ns || (s.start_ns == time_ns && i <= idx) {
                g = i;
            } else {
                break;
            }
        }
        g
    }
}

impl RxLine for SimRxLine {
    type Error = ();

    async fn sample(&mut self) -> Result<LineState, ()> {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let bus = self.shared.bus.lock().unwrap();
                let declared = self.time_ns < bus.frontier_ns
                    || bus
                        .segments
                        .last()
                        .is_some_and(|s| s.start_ns == self.time_ns);
                if declared {
                    let g = Self::governing(&bus.segments, self.time_ns, self.idx);
                    self.idx = g;
                    return Ok(bus.segments[g].state);
                }
            }
            notified.await;
        }
    }

    async fn edge(&mut self) -> Result<LineState, ()> {
        loop {
            let notified = self.shared.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let bus = self.shared.bus.lock().unwrap();
                let g = Self::governing(&bus.segments, self.time_ns, self.idx);
                let current = bus.segments[g].state;
                if let Some((j, seg)) = bus
                    .segments
                    .iter()
                    .enumerate()
                    .skip(g + 1)
                    .find(|(_, s)| s.state != current)
                {
                    self.time_ns = seg.start_ns;
                    self.idx = j;
                    return Ok(seg.state);
                }
            }
            notified.await;
        }
    }

    async fn advance(&mut self, step: Duration) -> Result<(), ()> {
        // The frontier check happens at the next sample; advancing is
        // pure cursor arithmetic.
        self.time_ns += step.as_nanos() as u64;
        Ok(())
    }
}

#[allow(dead_code)]
/// Timer based on `tokio::time::sleep` to drive bounded waits in tests.
pub struct TokioTimer;

impl BitTimer for TokioTimer {
    async fn delay(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[allow(dead_code)]
/// Timer whose deadline never fires; proves a code path did not rely on
/// the timeout.
pub struct NeverTimer;

impl BitTimer for NeverTimer {
    async fn delay(&mut self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}
