//! Receive side of the transceiver pair.
//!
//! A [`Sink`] owns two ordered output queues (command and data) and a
//! long-lived loop ([`Sink::run`]) that scans an [`RxLine`] for sync
//! fields, decodes words, validates odd parity, and classifies each
//! recovered word by the sync polarity it arrived under. The loop is the
//! queues' only producer; the harness is their only consumer.
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use futures_util::future::{select, Either};
use futures_util::pin_mut;

use crate::core::{BitTiming, LineState, SyncKind, TimeUnit, Word, DEFAULT_QUEUE_DEPTH, WORD_BITS};
use crate::error::{ReadError, WaitError};
use crate::infra::codec::framing;
use crate::infra::codec::manchester;
use crate::infra::codec::sync_field;
use crate::protocol::traits::bit_timer::BitTimer;
use crate::protocol::traits::rx_line::RxLine;

/// Receive state machine and output queues for one differential input.
///
/// `DEPTH` bounds each queue; a word recovered while its queue is full is
/// dropped, which the bus cannot distinguish from a parity loss. All
/// methods take `&self`; one [`run`](Sink::run) future and one waiting
/// harness context are assumed per instance.
pub struct Sink<const DEPTH: usize = DEFAULT_QUEUE_DEPTH> {
    cmd_queue: Channel<CriticalSectionRawMutex, [u8; 2], DEPTH>,
    data_queue: Channel<CriticalSectionRawMutex, [u8; 2], DEPTH>,
    restart: Signal<CriticalSectionRawMutex, ()>,
    ready: Signal<CriticalSectionRawMutex, ()>,
    active: AtomicBool,
    timing: BitTiming,
}

impl<const DEPTH: usize> Default for Sink<DEPTH> {
    fn default() -> Self {
        Self::new(BitTiming::default())
    }
}

impl<const DEPTH: usize> Sink<DEPTH> {
    /// Build a sink for the given bit timing. The loop does not run until
    /// [`run`](Sink::run) is spawned.
    pub const fn new(timing: BitTiming) -> Self {
        Self {
            cmd_queue: Channel::new(),
            data_queue: Channel::new(),
            restart: Signal::new(),
            ready: Signal::new(),
            active: AtomicBool::new(false),
            timing,
        }
    }

    /// Take the oldest word recovered under a command sync, suspending
    /// until one is available.
    pub async fn read_cmd(&self) -> [u8; 2] {
        self.cmd_queue.receive().await
    }

    /// Take the oldest word recovered under a data sync, suspending until
    /// one is available.
    pub async fn read_data(&self) -> [u8; 2] {
        self.data_queue.receive().await
    }

    /// Take a command word without suspending; fails with
    /// [`ReadError::QueueEmpty`] when none is available.
    pub fn read_nowait_cmd(&self) -> Result<[u8; 2], ReadError> {
        self.cmd_queue.try_receive().map_err(|_| ReadError::QueueEmpty)
    }

    /// Take a data word without suspending; fails with
    /// [`ReadError::QueueEmpty`] when none is available.
    pub fn read_nowait_data(&self) -> Result<[u8; 2], ReadError> {
        self.data_queue.try_receive().map_err(|_| ReadError::QueueEmpty)
    }

    /// Words waiting in the command queue.
    pub fn count_cmd(&self) -> usize {
        self.cmd_queue.len()
    }

    /// Words waiting in the data queue.
    pub fn count_data(&self) -> usize {
        self.data_queue.len()
    }

    /// Is the command queue empty?
    pub fn empty_cmd(&self) -> bool {
        self.cmd_queue.is_empty()
    }

    /// Is the data queue empty?
    pub fn empty_data(&self) -> bool {
        self.data_queue.is_empty()
    }

    /// True only when both queues are empty and no word is mid-reception.
    pub fn idle(&self) -> bool {
        self.empty_cmd() && self.empty_data() && !self.active.load(Ordering::Acquire)
    }

    /// Discard all queued command words. Serialized against the loop's
    /// enqueue by the channel's internal lock.
    pub fn clear_cmd(&self) {
        self.cmd_queue.clear();
    }

    /// Discard all queued data words.
    pub fn clear_data(&self) {
        self.data_queue.clear();
    }

    /// Suspend until the command queue is non-empty, without consuming an
    /// entry. A `timeout` of zero waits indefinitely; otherwise the wait
    /// fails with [`WaitError::Timeout`] once `timer` has counted
    /// `timeout` in `unit`.
    pub async fn wait_cmd<T: BitTimer>(
        &self,
        timer: &mut T,
        timeout: u64,
        unit: TimeUnit,
    ) -> Result<(), WaitError> {
        wait_non_empty(&self.cmd_queue, &self.ready, timer, timeout, unit).await
    }

    /// Suspend until the data queue is non-empty, without consuming an
    /// entry. Timeout semantics match [`wait_cmd`](Sink::wait_cmd).
    pub async fn wait_data<T: BitTimer>(
        &self,
        timer: &mut T,
        timeout: u64,
        unit: TimeUnit,
    ) -> Result<(), WaitError> {
        wait_non_empty(&self.data_queue, &self.ready, timer, timeout, unit).await
    }

    /// Force the loop back to its initial scan state. An in-progress
    /// frame is abandoned; already-recovered words stay queued.
    pub fn restart(&self) {
        self.restart.signal(());
    }

    /// The receive loop. Spawn exactly one per sink; it only returns on a
    /// line error.
    ///
    /// `ScanSync`: wait for the line to idle, then for the leading edge
    /// of a sync field. `Framing`: sample the sync halves and every bit
    /// at its quarter points, Manchester-decode, check odd parity.
    /// `Classify`: push the payload into the queue matching the sync
    /// kind. Parity and framing failures discard the word and resume
    /// scanning.
    pub async fn run<L: RxLine>(&self, line: &mut L) -> Result<(), L::Error> {
        loop {
            self.active.store(false, Ordering::Release);

            let outcome = {
                let restart = self.restart.wait();
                let word = self.receive_word(line);
                pin_mut!(restart);
                pin_mut!(word);
                match select(restart, word).await {
                    Either::Left((_, pending_word)) => {
                        drop(pending_word);
                        #[cfg(feature = "defmt")]
                        defmt::debug!("restart, frame abandoned");
                        None
                    }
                    Either::Right((result, _)) => Some(result?),
                }
            };

            let Some(Some(word)) = outcome else {
                // Restarted, or the frame failed to decode; rescan.
                continue;
            };

            #[cfg(feature = "defmt")]
            defmt::info!("recv {} word {=u16:#x}", word.kind(), word.value());

            let accepted = match word.kind() {
                SyncKind::Command => self.cmd_queue.try_send(word.payload()).is_ok(),
                SyncKind::Data => self.data_queue.try_send(word.payload()).is_ok(),
            };
            if accepted {
                self.ready.signal(());
            } else {
                #[cfg(feature = "defmt")]
                defmt::warn!("receive queue full, word dropped");
            }
        }
    }

    /// Recover one word from the line. `Ok(None)` is a recoverable decode
    /// failure: false sync trigger, missing mid-bit transition, or parity
    /// mismatch.
    async fn receive_word<L: RxLine>(&self, line: &mut L) -> Result<Option<Word>, L::Error> {
        // ScanSync: let any in-flight traffic pass, then catch the next
        // leading edge out of idle.
        let mut state = line.sample().await?;
        while state != LineState::Idle {
            state = line.edge().await?;
        }
        loop {
            if line.edge().await? != LineState::Idle {
                break;
            }
        }

        self.active.store(true, Ordering::Release);

        // Sample each 1.5-bit sync half at its midpoint.
        line.advance(self.timing.sync_half() / 2).await?;
        let first = line.sample().await?;
        line.advance(self.timing.sync_half()).await?;
        let second = line.sample().await?;

        let kind = match sync_field::classify_sync(first, second) {
            Ok(kind) => kind,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("false trigger, window is not a sync");
                return Ok(None);
            }
        };

        // Move from the middle of the second sync half to the first bit's
        // quarter point, then sample every bit at T/4 and 3T/4.
        line.advance(self.timing.sync_half() / 2 + self.timing.quarter_bit())
            .await?;

        let mut value: u16 = 0;
        for _ in 0..WORD_BITS {
            let q1 = line.sample().await?;
            line.advance(self.timing.half_bit()).await?;
            let q3 = line.sample().await?;
            line.advance(self.timing.half_bit()).await?;
            match manchester::decode_bit(q1, q3) {
                Ok(bit) => value = (value << 1) | bit as u16,
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("missing mid-bit transition, word dropped");
                    return Ok(None);
                }
            }
        }

        let p1 = line.sample().await?;
        line.advance(self.timing.half_bit()).await?;
        let p3 = line.sample().await?;
        let parity = match manchester::decode_bit(p1, p3) {
            Ok(parity) => parity,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unreadable parity bit, word dropped");
                return Ok(None);
            }
        };

        if parity != framing::parity_bit(value) {
            #[cfg(feature = "defmt")]
            defmt::warn!("parity check failed, word {=u16:#x} dropped", value);
            return Ok(None);
        }

        Ok(Some(Word::from_u16(value, kind)))
    }
}

/// Shared peek-style wait: resolve once `queue` is non-empty, bounded by
/// `timer` unless `timeout` is zero.
async fn wait_non_empty<T: BitTimer, const DEPTH: usize>(
    queue: &Channel<CriticalSectionRawMutex, [u8; 2], DEPTH>,
    ready: &Signal<CriticalSectionRawMutex, ()>,
    timer: &mut T,
    timeout: u64,
    unit: TimeUnit,
) -> Result<(), WaitError> {
    if !queue.is_empty() {
        return Ok(());
    }

    if timeout == 0 {
        while queue.is_empty() {
            ready.wait().await;
        }
        return Ok(());
    }

    let available = async {
        while queue.is_empty() {
            ready.wait().await;
        }
    };
    let deadline = timer.delay(unit.to_duration(timeout));
    pin_mut!(available);
    pin_mut!(deadline);
    match select(available, deadline).await {
        Either::Left(_) => Ok(()),
        Either::Right(_) => Err(WaitError::Timeout),
    }
}
