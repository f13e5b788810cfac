//! Packed encoding of supply schedules for on-chain deployment
//!
//! # Word Format
//!
//! ```text
//! +----------------------+--------------------------------+
//! | mps (24 bits)        | blockDelta (40 bits)           |
//! +----------------------+--------------------------------+
//!  bit 63            40   39                             0
//! ```
//!
//! Each phase is one big-endian u64. Words are concatenated with no length
//! prefix or padding, like Solidity's `abi.encodePacked`. The contract reads
//! `mps = uint24(bytes3(data))` and `blockDelta = uint40(uint64(data))`.

use crate::schedule::error::{PhaseField, ScheduleError, ScheduleResult};
use crate::schedule::types::{Phase, Schedule};

/// Width of the mps field
pub const MPS_BITS: u32 = 24;

/// Width of the blockDelta field
pub const BLOCK_DELTA_BITS: u32 = 40;

/// Largest encodable mps (16,777,215)
pub const MPS_MAX: u64 = (1 << MPS_BITS) - 1;

/// Largest encodable blockDelta (1,099,511,627,775)
pub const BLOCK_DELTA_MAX: u64 = (1 << BLOCK_DELTA_BITS) - 1;

/// Size of one packed phase
pub const WORD_BYTES: usize = 8;

/// Packed schedule bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSchedule(Vec<u8>);

impl EncodedSchedule {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of packed phases
    pub fn phase_count(&self) -> usize {
        self.0.len() / WORD_BYTES
    }

    /// Lowercase hex with a `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse hex, with or without a `0x` prefix
    pub fn from_hex(input: &str) -> ScheduleResult<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| ScheduleError::malformed(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for EncodedSchedule {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for EncodedSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Check both fields of a phase against their bit widths
fn check_phase(index: usize, phase: &Phase) -> ScheduleResult<()> {
    if phase.rate > MPS_MAX {
        return Err(ScheduleError::field_overflow(
            PhaseField::Rate,
            index,
            phase.rate,
            MPS_BITS,
        ));
    }
    if phase.duration > BLOCK_DELTA_MAX {
        return Err(ScheduleError::field_overflow(
            PhaseField::Duration,
            index,
            phase.duration,
            BLOCK_DELTA_BITS,
        ));
    }
    Ok(())
}

/// Pack a validated phase into its 64-bit word
fn pack_word(phase: &Phase) -> u64 {
    (phase.rate << BLOCK_DELTA_BITS) | phase.duration
}

/// Encode phases into packed bytes.
///
/// Every phase is checked before any byte is written; an out-of-range field
/// anywhere fails the whole call.
pub fn encode(phases: &[Phase]) -> ScheduleResult<EncodedSchedule> {
    for (index, phase) in phases.iter().enumerate() {
        if let Err(e) = check_phase(index, phase) {
            tracing::debug!(error = %e, "Rejecting schedule for encoding");
            return Err(e);
        }
    }

    let mut bytes = Vec::with_capacity(phases.len() * WORD_BYTES);
    for phase in phases {
        bytes.extend_from_slice(&pack_word(phase).to_be_bytes());
    }

    Ok(EncodedSchedule(bytes))
}

/// Encode a schedule into packed bytes
pub fn encode_schedule(schedule: &Schedule) -> ScheduleResult<EncodedSchedule> {
    encode(schedule.phases())
}

/// Unpack bytes the way the auction contract does
pub fn decode(bytes: &[u8]) -> ScheduleResult<Schedule> {
    if bytes.len() % WORD_BYTES != 0 {
        return Err(ScheduleError::malformed(format!(
            "length {} is not a multiple of {} bytes",
            bytes.len(),
            WORD_BYTES
        )));
    }

    let phases = bytes
        .chunks_exact(WORD_BYTES)
        .map(|chunk| {
            let mut word = [0u8; WORD_BYTES];
            word.copy_from_slice(chunk);
            let word = u64::from_be_bytes(word);
            Phase::new(word >> BLOCK_DELTA_BITS, word & BLOCK_DELTA_MAX)
        })
        .collect();

    Ok(Schedule::new(phases))
}
