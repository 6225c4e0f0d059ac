//! Defines the data contract shared by the codec layer and the
//! transceiver loops: differential line states, sync kinds, validated
//! words, and the bit timing every delay in the crate derives from.

use core::time::Duration;

use crate::error::WriteError;

//==================================================================================Constants

/// MIL-STD-1553 signaling rate.
pub const BIT_RATE_HZ: u32 = 1_000_000;

/// Duration of one encoded bit at [`BIT_RATE_HZ`] (1 Mbit/s → 1000 ns).
///
/// Manchester-II places a mandatory transition at the half-bit point, so
/// both this value and its half are first-class: the transmit loop holds
/// the line for half-bit "chips", never for arbitrary durations.
pub const BIT_PERIOD_NS: u64 = 1_000;

/// Payload bits per word.
pub const WORD_BITS: usize = 16;

/// Bit times occupied by the sync field.
pub const SYNC_BITS: usize = 3;

/// Total bit times per transmitted word: sync + payload + parity.
pub const FRAME_BITS: usize = SYNC_BITS + WORD_BITS + 1;

/// Half-bit chips occupied by the sync field (two 1.5-bit half-windows).
pub const SYNC_CHIPS: usize = 2 * SYNC_BITS;

/// Half-bit chips per full frame: sync + 16 Manchester pairs + parity pair.
pub const FRAME_CHIPS: usize = SYNC_CHIPS + 2 * WORD_BITS + 2;

/// Default depth of the transmit and receive queues.
///
/// The protocol model places no capacity bound of its own; the depth is a
/// deployment decision surfaced as a const generic on [`Source`] and
/// [`Sink`]. Sixteen words comfortably covers a test burst while keeping
/// the static footprint small on embedded targets.
///
/// [`Source`]: crate::protocol::source::Source
/// [`Sink`]: crate::protocol::sink::Sink
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

//==================================================================================Enums and Structs

/// State of the differential pair as seen by the physical layer.
///
/// `High` and `Low` are the two driven polarities; `Idle` is the undriven
/// pair (both legs equal). A word is framed entirely in `High`/`Low`
/// chips; `Idle` separates words and is what the receive loop scans away
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineState {
    Idle,
    High,
    Low,
}

impl LineState {
    /// Mirror polarity. `Idle` has no mirror and maps to itself.
    pub const fn inverted(self) -> Self {
        match self {
            LineState::Idle => LineState::Idle,
            LineState::High => LineState::Low,
            LineState::Low => LineState::High,
        }
    }
}

/// Which of the two sync waveforms frames a word.
///
/// The two kinds are electrically inverse over the same 3-bit window;
/// classification depends solely on waveform polarity, never on payload
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncKind {
    /// Command sync: high for 1.5 bit times, then low for 1.5 bit times.
    Command,
    /// Data sync: the exact mirror of the command sync.
    Data,
}

/// A validated 16-bit word tagged with the sync kind it travels under.
///
/// Construction through [`Word::from_payload`] is the only place payload
/// length is checked; once a `Word` exists it is frameable by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Word {
    payload: [u8; 2],
    kind: SyncKind,
}

impl Word {
    /// Validate and wrap a payload. Anything other than exactly two bytes
    /// is rejected with [`WriteError::InvalidPayload`] before it can reach
    /// a queue.
    pub fn from_payload(payload: &[u8], kind: SyncKind) -> Result<Self, WriteError> {
        match payload.try_into() {
            Ok(payload) => Ok(Self { payload, kind }),
            Err(_) => Err(WriteError::InvalidPayload {
                len: payload.len(),
            }),
        }
    }

    /// Wrap a `u16`; the high byte is transmitted first (MSB-first wire
    /// order).
    pub const fn from_u16(value: u16, kind: SyncKind) -> Self {
        Self {
            payload: value.to_be_bytes(),
            kind,
        }
    }

    /// Payload interpreted in wire order.
    pub const fn value(&self) -> u16 {
        u16::from_be_bytes(self.payload)
    }

    /// Raw payload bytes, big-endian with respect to the wire.
    pub const fn payload(&self) -> [u8; 2] {
        self.payload
    }

    pub const fn kind(&self) -> SyncKind {
        self.kind
    }
}

/// Bit timing for one transceiver instance.
///
/// Every delay the loops take derives from the single bit period held
/// here; nothing in the crate reads wall-clock time. The default is the
/// standard 1 Mbit/s period; bus-speed variants override it at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    bit_period: Duration,
}

impl BitTiming {
    pub const fn new(bit_period: Duration) -> Self {
        Self { bit_period }
    }

    /// Full bit period `T`.
    pub const fn bit(&self) -> Duration {
        self.bit_period
    }

    /// Half-bit chip duration `T/2` — the transmit hold unit.
    pub fn half_bit(&self) -> Duration {
        self.bit_period / 2
    }

    /// Quarter-bit offset `T/4` — the receive sampling offset.
    pub fn quarter_bit(&self) -> Duration {
        self.bit_period / 4
    }

    /// One half of the sync field, `1.5 × T`.
    pub fn sync_half(&self) -> Duration {
        self.bit_period * 3 / 2
    }

    /// Full frame on the wire, `20 × T`: sync (3T) + data (16T) + parity (1T).
    pub fn frame(&self) -> Duration {
        self.bit_period * FRAME_BITS as u32
    }
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::new(Duration::from_nanos(BIT_PERIOD_NS))
    }
}

/// Units accepted by the bounded-wait operations.
///
/// A closed enumeration: there is no unit string to mis-spell, so no
/// configuration-error path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Secs,
}

impl TimeUnit {
    /// Scale a count into a [`Duration`].
    pub const fn to_duration(self, count: u64) -> Duration {
        match self {
            TimeUnit::Nanos => Duration::from_nanos(count),
            TimeUnit::Micros => Duration::from_micros(count),
            TimeUnit::Millis => Duration::from_millis(count),
            TimeUnit::Secs => Duration::from_secs(count),
        }
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
