//! Supply Schedule Module
//!
//! Pure schedule computation for Continuous Clearing Auctions:
//! - Convex-curve schedule generation with an exact emission total
//! - Bit-packed encoding matching the on-chain parser (24-bit mps, 40-bit blockDelta)
//! - Decoding of packed schedules for inspection

pub mod encoder;
pub mod error;
pub mod generator;
pub mod types;

pub use encoder::{decode, encode, encode_schedule, EncodedSchedule};
pub use error::{PhaseField, ScheduleError, ScheduleResult, StructuredError};
pub use generator::{generate_schedule, ScheduleGenerator};
pub use types::*;
