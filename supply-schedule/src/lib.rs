//! CCA Supply Schedule Library
//!
//! This library provides:
//! - Supply schedule generation for Continuous Clearing Auction (CCA) contracts
//!   using a normalized convex curve C(t) = t^alpha
//! - Packed encoding of schedules for on-chain deployment
//! - MCP tool functions wrapping both
//!
//! # Tools
//! - `generate_supply_schedule`: Build `{mps, blockDelta}` phases from auction parameters
//! - `encode_supply_schedule`: Pack phases into a 0x-prefixed hex string
//! - `decode_supply_schedule`: Unpack hex back into phases
//!
//! # Usage
//!
//! ```bash
//! # Run the MCP server over stdio
//! supply-schedule-mcp
//!
//! # Override defaults for every generated schedule
//! supply-schedule-mcp --num-steps 10 --alpha 1.5 --round-to-nearest 100
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod schedule;
pub mod tools;

// Re-export key schedule types
pub use schedule::{
    decode, encode, encode_schedule, generate_schedule, EncodedSchedule, GenerationParameters,
    Phase, PhaseField, Schedule, ScheduleConfig, ScheduleError, ScheduleGenerator, ScheduleResult,
    ScheduleSummary, StructuredError, TOTAL_TARGET,
};
