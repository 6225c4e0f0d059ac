//! Transmit side of the transceiver pair.
//!
//! A [`Source`] owns an ordered transmit queue and a long-lived loop
//! ([`Source::run`]) that drains it one word at a time, driving the full
//! sync + data + parity waveform onto a [`TxLine`]. The harness interacts
//! exclusively through `&self` methods; the loop is the queue's only
//! consumer.
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use futures_util::future::{select, Either};
use futures_util::pin_mut;

use crate::core::{BitTiming, SyncKind, Word, DEFAULT_QUEUE_DEPTH};
use crate::error::WriteError;
use crate::infra::codec::framing;
use crate::protocol::traits::tx_line::TxLine;

/// Transmit state machine and queue for one differential output.
///
/// `DEPTH` bounds the queue; it is a deployment decision, not a protocol
/// property. All methods take `&self`, so a single instance can be shared
/// between the spawned [`run`](Source::run) future and one harness
/// context.
pub struct Source<const DEPTH: usize = DEFAULT_QUEUE_DEPTH> {
    queue: Channel<CriticalSectionRawMutex, Word, DEPTH>,
    restart: Signal<CriticalSectionRawMutex, ()>,
    idle: Signal<CriticalSectionRawMutex, ()>,
    active: AtomicBool,
    timing: BitTiming,
}

impl<const DEPTH: usize> Default for Source<DEPTH> {
    fn default() -> Self {
        Self::new(BitTiming::default())
    }
}

impl<const DEPTH: usize> Source<DEPTH> {
    /// Build a source for the given bit timing. The loop does not run
    /// until [`run`](Source::run) is spawned.
    pub const fn new(timing: BitTiming) -> Self {
        Self {
            queue: Channel::new(),
            restart: Signal::new(),
            idle: Signal::new(),
            active: AtomicBool::new(false),
            timing,
        }
    }

    /// Queue a word transmitted with the command sync. Suspends while the
    /// queue is full.
    pub async fn write_cmd(&self, payload: &[u8]) -> Result<(), WriteError> {
        let word = Word::from_payload(payload, SyncKind::Command)?;
        self.queue.send(word).await;
        Ok(())
    }

    /// Queue a word transmitted with the data sync. Suspends while the
    /// queue is full.
    pub async fn write_data(&self, payload: &[u8]) -> Result<(), WriteError> {
        let word = Word::from_payload(payload, SyncKind::Data)?;
        self.queue.send(word).await;
        Ok(())
    }

    /// Queue a command-sync word without suspending; fails with
    /// [`WriteError::QueueFull`] when no slot is free.
    pub fn write_nowait_cmd(&self, payload: &[u8]) -> Result<(), WriteError> {
        let word = Word::from_payload(payload, SyncKind::Command)?;
        self.queue.try_send(word).map_err(|_| WriteError::QueueFull)
    }

    /// Queue a data-sync word without suspending; fails with
    /// [`WriteError::QueueFull`] when no slot is free.
    pub fn write_nowait_data(&self, payload: &[u8]) -> Result<(), WriteError> {
        let word = Word::from_payload(payload, SyncKind::Data)?;
        self.queue.try_send(word).map_err(|_| WriteError::QueueFull)
    }

    /// Words waiting in the queue. A word mid-transmission is no longer
    /// counted.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// Is the queue empty?
    pub fn empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True only when the queue is empty and no word is mid-transmission.
    pub fn idle(&self) -> bool {
        self.empty() && !self.active.load(Ordering::Acquire)
    }

    /// Discard all queued words. Serialized against the loop's dequeue by
    /// the channel's internal lock; a word already being framed is not
    /// recalled.
    pub fn clear(&self) {
        self.queue.clear();
    }

    /// Suspend the caller until [`idle`](Source::idle) holds — i.e. until
    /// every queued word has physically left the line.
    pub async fn wait(&self) {
        while !self.idle() {
            self.idle.wait().await;
        }
    }

    /// Force the loop back to its initial state. A partially driven
    /// waveform is abandoned and the line released — the next frame
    /// always begins cleanly at a sync boundary. Queue contents are
    /// untouched; the word that was mid-frame is discarded.
    pub fn restart(&self) {
        self.restart.signal(());
    }

    /// The transmit loop. Spawn exactly one per source; it only returns
    /// on a line error.
    ///
    /// `WaitForWork`: suspend until the queue is non-empty. `Framing`:
    /// drive the dequeued word's full 20-bit-time waveform. Then back to
    /// `WaitForWork`, signalling idle whenever the queue has drained.
    pub async fn run<L: TxLine>(&self, line: &mut L) -> Result<(), L::Error> {
        line.release()?;

        loop {
            self.active.store(false, Ordering::Release);
            if self.queue.is_empty() {
                self.idle.signal(());
            }

            // WaitForWork, interruptible by restart.
            let word = {
                let restart = self.restart.wait();
                let next = self.queue.receive();
                pin_mut!(restart);
                pin_mut!(next);
                match select(restart, next).await {
                    Either::Left(_) => {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("restart while waiting for work");
                        continue;
                    }
                    Either::Right((word, _)) => word,
                }
            };

            self.active.store(true, Ordering::Release);

            #[cfg(feature = "defmt")]
            defmt::info!(
                "send {} word {=u16:#x} parity {}",
                word.kind(),
                word.value(),
                framing::parity_bit(word.value())
            );

            // Framing, interruptible by restart at any chip boundary.
            let aborted = {
                let restart = self.restart.wait();
                let frame = transmit_word(line, &self.timing, &word);
                pin_mut!(restart);
                pin_mut!(frame);
                match select(restart, frame).await {
                    Either::Left((_, pending_frame)) => {
                        drop(pending_frame);
                        true
                    }
                    Either::Right((result, _)) => {
                        result?;
                        false
                    }
                }
            };

            line.release()?;

            if aborted {
                #[cfg(feature = "defmt")]
                defmt::warn!("restart mid-frame, word discarded");
            }
        }
    }
}

/// Drive one complete frame: sync field, 16 payload bits MSB first, odd
/// parity bit — 40 half-bit chips held for T/2 each.
async fn transmit_word<L: TxLine>(
    line: &mut L,
    timing: &BitTiming,
    word: &Word,
) -> Result<(), L::Error> {
    let half = timing.half_bit();
    for chip in framing::encode_frame(word) {
        line.drive(chip, half).await?;
    }
    Ok(())
}
