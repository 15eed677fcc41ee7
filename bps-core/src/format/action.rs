//! Action stream definitions
//!
//! Every action starts with a varint header: the low two bits select the
//! [`ActionKind`], the remaining bits hold `length - 1`. Copy actions follow
//! the header with a second varint holding a signed displacement (low bit is
//! the sign, the rest is the magnitude). Target reads follow the header with
//! `length` literal bytes.

use super::constants::action::{DISPLACEMENT_SIGN_BIT, KIND_BITS, KIND_MASK, MAX_LENGTH};
use crate::error::{BpsError, Field, Result};
use crate::varint;

/// The four action kinds
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Copy from the source at the output position
    SourceRead = 0,
    /// Copy literal bytes carried in the action stream
    TargetRead = 1,
    /// Copy from the source at the relative source cursor
    SourceCopy = 2,
    /// Copy from already produced target bytes at the relative target cursor
    TargetCopy = 3,
}

impl ActionKind {
    /// All kinds in opcode order
    pub const ALL: [ActionKind; 4] = [
        ActionKind::SourceRead,
        ActionKind::TargetRead,
        ActionKind::SourceCopy,
        ActionKind::TargetCopy,
    ];

    /// Select the kind from an action header
    pub const fn from_header(header: u64) -> Self {
        match header & KIND_MASK {
            0 => ActionKind::SourceRead,
            1 => ActionKind::TargetRead,
            2 => ActionKind::SourceCopy,
            _ => ActionKind::TargetCopy,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ActionKind::SourceRead => "SourceRead",
            ActionKind::TargetRead => "TargetRead",
            ActionKind::SourceCopy => "SourceCopy",
            ActionKind::TargetCopy => "TargetCopy",
        }
    }

    /// Whether the action carries a displacement varint
    pub const fn is_copy(self) -> bool {
        matches!(self, ActionKind::SourceCopy | ActionKind::TargetCopy)
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build an action header, `None` if `length` is zero or too large
pub const fn encode_header(kind: ActionKind, length: u64) -> Option<u64> {
    if length == 0 || length > MAX_LENGTH {
        return None;
    }
    Some(((length - 1) << KIND_BITS) | kind as u64)
}

/// Split an action header into kind and length
pub const fn decode_header(header: u64) -> (ActionKind, u64) {
    (ActionKind::from_header(header), (header >> KIND_BITS) + 1)
}

/// Turn a raw displacement varint into a signed delta
pub const fn decode_displacement(raw: u64) -> i64 {
    // raw >> 1 is at most i64::MAX
    let magnitude = (raw >> 1) as i64;
    if raw & DISPLACEMENT_SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Pack a signed delta into a raw displacement, `None` for `i64::MIN`
pub const fn encode_displacement(delta: i64) -> Option<u64> {
    if delta == i64::MIN {
        return None;
    }
    let magnitude = delta.unsigned_abs() << 1;
    if delta < 0 {
        Some(magnitude | DISPLACEMENT_SIGN_BIT)
    } else {
        Some(magnitude)
    }
}

/// One decoded action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Copy `length` source bytes at the output position
    SourceRead { length: u64 },
    /// Copy the literal bytes
    TargetRead { data: &'a [u8] },
    /// Move the source cursor by `displacement`, then copy `length` bytes
    SourceCopy { length: u64, displacement: i64 },
    /// Move the target cursor by `displacement`, then copy `length` bytes one at a time
    TargetCopy { length: u64, displacement: i64 },
}

impl Action<'_> {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::SourceRead { .. } => ActionKind::SourceRead,
            Action::TargetRead { .. } => ActionKind::TargetRead,
            Action::SourceCopy { .. } => ActionKind::SourceCopy,
            Action::TargetCopy { .. } => ActionKind::TargetCopy,
        }
    }

    /// Number of target bytes the action produces
    pub const fn length(&self) -> u64 {
        match self {
            Action::SourceRead { length }
            | Action::SourceCopy { length, .. }
            | Action::TargetCopy { length, .. } => *length,
            Action::TargetRead { data } => data.len() as u64,
        }
    }
}

/// Iterator decoding actions from a raw action stream
///
/// Yields `Err` once on malformed input and then stops.
#[derive(Debug, Clone)]
pub struct ActionReader<'a> {
    remaining: &'a [u8],
    failed: bool,
}

impl<'a> ActionReader<'a> {
    pub const fn new(stream: &'a [u8]) -> Self {
        Self {
            remaining: stream,
            failed: false,
        }
    }

    /// Bytes not yet decoded
    pub const fn remaining(&self) -> &'a [u8] {
        self.remaining
    }

    fn read_action(&mut self) -> Result<Action<'a>> {
        let header = varint::read(&mut self.remaining, Field::ActionHeader)?;
        let (kind, length) = decode_header(header);

        match kind {
            ActionKind::SourceRead => Ok(Action::SourceRead { length }),
            ActionKind::TargetRead => {
                let len = usize::try_from(length)
                    .ok()
                    .filter(|&len| len <= self.remaining.len())
                    .ok_or(BpsError::TruncatedInput(Field::TargetReadPayload))?;
                let (data, rest) = self.remaining.split_at(len);
                self.remaining = rest;
                Ok(Action::TargetRead { data })
            }
            ActionKind::SourceCopy => {
                let raw = varint::read(&mut self.remaining, Field::Displacement)?;
                Ok(Action::SourceCopy {
                    length,
                    displacement: decode_displacement(raw),
                })
            }
            ActionKind::TargetCopy => {
                let raw = varint::read(&mut self.remaining, Field::Displacement)?;
                Ok(Action::TargetCopy {
                    length,
                    displacement: decode_displacement(raw),
                })
            }
        }
    }
}

impl<'a> Iterator for ActionReader<'a> {
    type Item = Result<Action<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }
        let action = self.read_action();
        if action.is_err() {
            self.failed = true;
        }
        Some(action)
    }
}

impl core::iter::FusedIterator for ActionReader<'_> {}

/// Per-kind action counts and produced byte totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionStats {
    pub source_read: u64,
    pub target_read: u64,
    pub source_copy: u64,
    pub target_copy: u64,
    /// Total target bytes the stream produces
    pub output_bytes: u64,
}

impl ActionStats {
    /// Tally a stream, stopping at the first malformed action
    pub fn collect(stream: &[u8]) -> Result<Self> {
        let mut stats = Self::default();
        for action in ActionReader::new(stream) {
            let action = action?;
            match action.kind() {
                ActionKind::SourceRead => stats.source_read += 1,
                ActionKind::TargetRead => stats.target_read += 1,
                ActionKind::SourceCopy => stats.source_copy += 1,
                ActionKind::TargetCopy => stats.target_copy += 1,
            }
            stats.output_bytes = stats.output_bytes.saturating_add(action.length());
        }
        Ok(stats)
    }

    /// Total number of actions
    pub const fn total(&self) -> u64 {
        self.source_read + self.target_read + self.source_copy + self.target_copy
    }
}
