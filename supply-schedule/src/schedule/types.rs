//! Core types for supply schedules
//!
//! A schedule is an ordered list of `{mps, blockDelta}` phases. The JSON field
//! names match what the CCA deployment tooling and the on-chain parser expect.

use crate::schedule::error::{ScheduleError, ScheduleResult};
use serde::{Deserialize, Serialize};

/// Total supply released by every schedule, in mps units (1e7)
pub const TOTAL_TARGET: u64 = 10_000_000;

/// Number of equal-token steps between the pre-bid and final phases
pub const DEFAULT_NUM_STEPS: u32 = 12;

/// Share of the supply reserved for the final block
pub const DEFAULT_FINAL_BLOCK_PCT: f64 = 0.30;

/// Convexity exponent of the cumulative supply curve C(t) = t^alpha
pub const DEFAULT_ALPHA: f64 = 1.2;

/// One emission segment of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phase {
    /// Tokens released per block (mps)
    #[serde(rename = "mps", alias = "rate")]
    pub rate: u64,

    /// Number of blocks the phase lasts
    #[serde(rename = "blockDelta", alias = "duration")]
    pub duration: u64,
}

impl Phase {
    pub fn new(rate: u64, duration: u64) -> Self {
        Self { rate, duration }
    }

    /// Tokens released over the whole phase
    pub fn emission(&self) -> u128 {
        self.rate as u128 * self.duration as u128
    }
}

/// Ordered sequence of phases, in temporal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    phases: Vec<Phase>,
}

impl Schedule {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<Phase> {
        self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.phases.iter()
    }

    pub fn first(&self) -> Option<&Phase> {
        self.phases.first()
    }

    pub fn last(&self) -> Option<&Phase> {
        self.phases.last()
    }

    /// Sum of `mps * blockDelta` over every phase
    pub fn total_emission(&self) -> u128 {
        self.phases.iter().map(Phase::emission).sum()
    }

    /// Wall-clock length of the schedule in blocks
    pub fn total_blocks(&self) -> u128 {
        self.phases.iter().map(|p| p.duration as u128).sum()
    }

    /// Cumulative block positions after each phase, starting at 0
    pub fn boundaries(&self) -> Vec<u128> {
        let mut position = 0u128;
        let mut out = Vec::with_capacity(self.phases.len() + 1);
        out.push(position);
        for phase in &self.phases {
            position += phase.duration as u128;
            out.push(position);
        }
        out
    }
}

impl From<Vec<Phase>> for Schedule {
    fn from(phases: Vec<Phase>) -> Self {
        Self::new(phases)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

/// Inputs to schedule generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Total number of blocks for the auction
    pub auction_blocks: u64,

    /// Blocks of zero-emission bidding before supply starts
    pub prebid_blocks: u64,

    /// Number of equal-token steps
    pub num_steps: u32,

    /// Share of the supply for the final block, in (0, 1)
    pub final_block_pct: f64,

    /// Convexity exponent of C(t) = t^alpha
    pub alpha: f64,

    /// Round block boundaries to the nearest N blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_to_nearest: Option<u64>,
}

impl GenerationParameters {
    /// Parameters with the built-in defaults for everything but the length
    pub fn new(auction_blocks: u64) -> Self {
        Self {
            auction_blocks,
            prebid_blocks: 0,
            num_steps: DEFAULT_NUM_STEPS,
            final_block_pct: DEFAULT_FINAL_BLOCK_PCT,
            alpha: DEFAULT_ALPHA,
            round_to_nearest: None,
        }
    }

    pub fn with_prebid_blocks(mut self, prebid_blocks: u64) -> Self {
        self.prebid_blocks = prebid_blocks;
        self
    }

    pub fn with_num_steps(mut self, num_steps: u32) -> Self {
        self.num_steps = num_steps;
        self
    }

    pub fn with_final_block_pct(mut self, final_block_pct: f64) -> Self {
        self.final_block_pct = final_block_pct;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_round_to_nearest(mut self, round_to_nearest: Option<u64>) -> Self {
        self.round_to_nearest = round_to_nearest;
        self
    }

    /// Check parameter ranges before generation
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.auction_blocks == 0 {
            return Err(ScheduleError::invalid_parameter(
                "auction_blocks",
                "must be greater than 0",
            ));
        }
        if self.num_steps == 0 {
            return Err(ScheduleError::invalid_parameter(
                "num_steps",
                "must be greater than 0",
            ));
        }
        if !(self.final_block_pct > 0.0 && self.final_block_pct < 1.0) {
            return Err(ScheduleError::invalid_parameter(
                "final_block_pct",
                format!("must be between 0 and 1 (exclusive), got {}", self.final_block_pct),
            ));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(ScheduleError::invalid_parameter(
                "alpha",
                format!("must be a positive number, got {}", self.alpha),
            ));
        }
        if self.round_to_nearest == Some(0) {
            return Err(ScheduleError::invalid_parameter(
                "round_to_nearest",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Generator configuration: the emission target and the parameter defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    /// Exact emission every schedule must sum to
    pub total_target: u64,

    /// Default number of steps
    pub num_steps: u32,

    /// Default final block share
    pub final_block_pct: f64,

    /// Default convexity exponent
    pub alpha: f64,

    /// Default boundary rounding granularity
    pub round_to_nearest: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            total_target: TOTAL_TARGET,
            num_steps: DEFAULT_NUM_STEPS,
            final_block_pct: DEFAULT_FINAL_BLOCK_PCT,
            alpha: DEFAULT_ALPHA,
            round_to_nearest: None,
        }
    }
}

impl ScheduleConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(n) = env_parse("SUPPLY_SCHEDULE_NUM_STEPS") {
            config.num_steps = n;
        }
        if let Some(pct) = env_parse("SUPPLY_SCHEDULE_FINAL_BLOCK_PCT") {
            config.final_block_pct = pct;
        }
        if let Some(alpha) = env_parse("SUPPLY_SCHEDULE_ALPHA") {
            config.alpha = alpha;
        }
        if let Some(n) = env_parse("SUPPLY_SCHEDULE_ROUND_TO_NEAREST") {
            config.round_to_nearest = Some(n);
        }

        config
    }

    /// Generation parameters using this config's defaults
    pub fn params(&self, auction_blocks: u64) -> GenerationParameters {
        GenerationParameters {
            auction_blocks,
            prebid_blocks: 0,
            num_steps: self.num_steps,
            final_block_pct: self.final_block_pct,
            alpha: self.alpha,
            round_to_nearest: self.round_to_nearest,
        }
    }

    /// Check that the configured defaults would pass parameter validation
    pub fn validate(&self) -> ScheduleResult<()> {
        if self.total_target == 0 {
            return Err(ScheduleError::invalid_parameter(
                "total_target",
                "must be greater than 0",
            ));
        }
        self.params(1).validate()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

/// Statistics reported alongside a generated schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_mps: u64,
    pub target_mps: u64,
    pub final_block_mps: u64,
    pub final_block_percentage: f64,
    pub num_steps: u32,
    pub alpha: f64,
    pub main_supply_pct: f64,
    pub step_tokens_pct: f64,
}

impl ScheduleSummary {
    pub fn from_schedule(
        schedule: &Schedule,
        params: &GenerationParameters,
        config: &ScheduleConfig,
    ) -> Self {
        let final_block_mps = schedule.last().map(|p| p.rate).unwrap_or(0);
        let target = config.total_target;
        let main_supply = 1.0 - params.final_block_pct;

        Self {
            total_mps: u64::try_from(schedule.total_emission()).unwrap_or(u64::MAX),
            target_mps: target,
            final_block_mps,
            final_block_percentage: round_to(final_block_mps as f64 / target as f64 * 100.0, 2),
            num_steps: params.num_steps,
            alpha: params.alpha,
            main_supply_pct: round_to(main_supply * 100.0, 2),
            step_tokens_pct: round_to(main_supply / params.num_steps as f64 * 100.0, 4),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
