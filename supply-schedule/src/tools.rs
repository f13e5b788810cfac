//! MCP Tools for supply schedules
//!
//! Provides MCP tool interfaces over the schedule core:
//! - generate_supply_schedule: Build a schedule from auction parameters
//! - encode_supply_schedule: Pack a schedule into 0x-prefixed hex
//! - decode_supply_schedule: Unpack hex back into phases

use crate::schedule::encoder::{decode, encode, EncodedSchedule};
use crate::schedule::error::ScheduleResult;
use crate::schedule::generator::ScheduleGenerator;
use crate::schedule::types::{GenerationParameters, Phase, Schedule, ScheduleSummary};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types for MCP Tools
// ============================================================================

/// Request for generate_supply_schedule tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateScheduleRequest {
    /// Total number of blocks for the auction
    pub auction_blocks: u64,

    /// Blocks of zero-emission bidding (default: 0)
    pub prebid_blocks: Option<u64>,

    /// Number of equal-token steps (default: configured, 12)
    pub num_steps: Option<u32>,

    /// Share of supply for the final block (default: configured, 0.30)
    pub final_block_pct: Option<f64>,

    /// Convexity exponent (default: configured, 1.2)
    pub alpha: Option<f64>,

    /// Round block boundaries to the nearest N blocks
    pub round_to_nearest: Option<u64>,
}

/// Response for generate_supply_schedule tool
#[derive(Debug, Serialize)]
pub struct GenerateScheduleResponse {
    pub schedule: Schedule,
    pub auction_blocks: u64,
    pub prebid_blocks: u64,
    pub total_phases: usize,
    pub summary: ScheduleSummary,
}

/// Request for encode_supply_schedule tool
#[derive(Debug, Clone, Deserialize)]
pub struct EncodeScheduleRequest {
    pub schedule: Vec<Phase>,
}

/// Response for encode_supply_schedule tool
#[derive(Debug, Serialize)]
pub struct EncodeScheduleResponse {
    /// Packed bytes as 0x-prefixed hex
    pub encoded: String,
    pub byte_length: usize,
    pub phase_count: usize,
}

/// Request for decode_supply_schedule tool
#[derive(Debug, Clone, Deserialize)]
pub struct DecodeScheduleRequest {
    /// Hex produced by encode_supply_schedule
    pub encoded: String,
}

/// Response for decode_supply_schedule tool
#[derive(Debug, Serialize)]
pub struct DecodeScheduleResponse {
    pub schedule: Schedule,
    pub phase_count: usize,
    pub total_mps: String,
}

impl GenerateScheduleRequest {
    /// Fill unset fields from the generator's configured defaults
    pub fn into_params(self, generator: &ScheduleGenerator) -> GenerationParameters {
        let defaults = generator.config().params(self.auction_blocks);
        GenerationParameters {
            prebid_blocks: self.prebid_blocks.unwrap_or(defaults.prebid_blocks),
            num_steps: self.num_steps.unwrap_or(defaults.num_steps),
            final_block_pct: self.final_block_pct.unwrap_or(defaults.final_block_pct),
            alpha: self.alpha.unwrap_or(defaults.alpha),
            round_to_nearest: self.round_to_nearest.or(defaults.round_to_nearest),
            ..defaults
        }
    }
}

// ============================================================================
// Tool Implementations
// ============================================================================

/// Generate a schedule and its summary
pub fn generate_supply_schedule(
    generator: &ScheduleGenerator,
    req: GenerateScheduleRequest,
) -> ScheduleResult<GenerateScheduleResponse> {
    let params = req.into_params(generator);
    params.validate()?;

    tracing::info!(
        "Generating schedule: auction_blocks={}, prebid_blocks={}, num_steps={}, alpha={}",
        params.auction_blocks,
        params.prebid_blocks,
        params.num_steps,
        params.alpha
    );

    let schedule = generator.generate(&params)?;
    let summary = ScheduleSummary::from_schedule(&schedule, &params, generator.config());

    Ok(GenerateScheduleResponse {
        total_phases: schedule.len(),
        auction_blocks: params.auction_blocks,
        prebid_blocks: params.prebid_blocks,
        schedule,
        summary,
    })
}

/// Pack a schedule for on-chain deployment
pub fn encode_supply_schedule(req: EncodeScheduleRequest) -> ScheduleResult<EncodeScheduleResponse> {
    let encoded = encode(&req.schedule)?;

    tracing::info!("Encoded {} phases into {} bytes", req.schedule.len(), encoded.len());

    Ok(EncodeScheduleResponse {
        encoded: encoded.to_hex(),
        byte_length: encoded.len(),
        phase_count: encoded.phase_count(),
    })
}

/// Unpack an encoded schedule
pub fn decode_supply_schedule(req: DecodeScheduleRequest) -> ScheduleResult<DecodeScheduleResponse> {
    let encoded = EncodedSchedule::from_hex(&req.encoded)?;
    let schedule = decode(encoded.as_bytes())?;

    Ok(DecodeScheduleResponse {
        phase_count: schedule.len(),
        total_mps: schedule.total_emission().to_string(),
        schedule,
    })
}
