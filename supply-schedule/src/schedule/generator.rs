//! Supply schedule generation from a normalized convex curve
//!
//! The main supply is split into `num_steps` equal token amounts. Step
//! boundaries come from the inverse of the cumulative curve C(t) = t^alpha,
//! so for alpha > 1 every step releases the same tokens in fewer blocks than
//! the one before it. A single-block final phase takes the remainder, which
//! makes the total exact regardless of how boundaries were rounded.
//!
//! Floating point is only used to place boundaries. All emission accounting
//! is done in integers.

use crate::schedule::error::{ScheduleError, ScheduleResult};
use crate::schedule::types::{GenerationParameters, Phase, Schedule, ScheduleConfig};

/// Generates schedules against a fixed emission target
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    config: ScheduleConfig,
}

impl ScheduleGenerator {
    pub fn new(config: ScheduleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Build the phase list for `params`.
    ///
    /// Output layout: optional zero-rate pre-bid phase, `num_steps` main
    /// phases, then one final phase of duration 1.
    pub fn generate(&self, params: &GenerationParameters) -> ScheduleResult<Schedule> {
        params.validate()?;

        let target = self.config.total_target;
        let mut phases = Vec::with_capacity(params.num_steps as usize + 2);

        if params.prebid_blocks > 0 {
            phases.push(Phase::new(0, params.prebid_blocks));
        }

        let boundaries = block_boundaries(params);
        let main_fraction = 1.0 - params.final_block_pct;
        let step_tokens = main_fraction / params.num_steps as f64 * target as f64;

        let mut cumulative_tokens: u128 = 0;
        for window in boundaries.windows(2) {
            let duration = window[1] - window[0];
            let rate = if duration > 0 {
                ((step_tokens / duration as f64).round() as u64).max(1)
            } else {
                0
            };
            let phase = Phase::new(rate, duration);
            cumulative_tokens += phase.emission();
            phases.push(phase);
        }

        if cumulative_tokens > target as u128 {
            tracing::debug!(
                cumulative_tokens = %cumulative_tokens,
                target,
                "Main phases overshoot target, final phase would be negative"
            );
            return Err(ScheduleError::invalid_schedule(cumulative_tokens, target));
        }

        // Remainder fits in u64: cumulative_tokens <= target
        let final_rate = target - cumulative_tokens as u64;
        phases.push(Phase::new(final_rate, 1));

        let schedule = Schedule::new(phases);
        let total = schedule.total_emission();
        if total != target as u128 {
            return Err(ScheduleError::invalid_schedule(total, target));
        }

        tracing::debug!(
            phases = schedule.len(),
            final_rate,
            auction_blocks = params.auction_blocks,
            "Generated supply schedule"
        );

        Ok(schedule)
    }
}

/// Generate a schedule against the default 1e7 target
pub fn generate_schedule(params: &GenerationParameters) -> ScheduleResult<Schedule> {
    ScheduleGenerator::default().generate(params)
}

/// Normalized step boundaries in [0, 1]: t_i = (i / num_steps)^(1 / alpha)
///
/// The first entry is exactly 0 and the last exactly 1.
pub fn time_boundaries(num_steps: u32, final_block_pct: f64, alpha: f64) -> Vec<f64> {
    let main_fraction = 1.0 - final_block_pct;
    let step_fraction = main_fraction / num_steps as f64;
    let exponent = 1.0 / alpha;

    (0..=num_steps)
        .map(|i| {
            if i == 0 {
                0.0
            } else if i == num_steps {
                1.0
            } else {
                let cumulative = i as f64 * step_fraction / main_fraction;
                cumulative.powf(exponent)
            }
        })
        .collect()
}

/// Step boundaries as block offsets from the start of the main supply.
///
/// Applies `round_to_nearest` when set; the last boundary is always
/// `auction_blocks` and no boundary exceeds it.
pub fn block_boundaries(params: &GenerationParameters) -> Vec<u64> {
    let auction_blocks = params.auction_blocks;
    let mut blocks: Vec<u64> = time_boundaries(params.num_steps, params.final_block_pct, params.alpha)
        .into_iter()
        .map(|t| (t * auction_blocks as f64).round() as u64)
        .map(|b| b.min(auction_blocks))
        .collect();

    if let Some(step) = params.round_to_nearest.filter(|n| *n > 0) {
        for block in blocks.iter_mut() {
            *block = round_to_multiple(*block, step).min(auction_blocks);
        }
    }

    if let Some(last) = blocks.last_mut() {
        *last = auction_blocks;
    }

    blocks
}

/// Round `value` to the nearest multiple of `step`, halves rounding up
fn round_to_multiple(value: u64, step: u64) -> u64 {
    let step = step as u128;
    let rounded = (value as u128 + step / 2) / step * step;
    u64::try_from(rounded).unwrap_or(u64::MAX)
}
