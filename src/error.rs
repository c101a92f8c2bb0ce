// Copyright 2024 the driftflake authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The error type for this crate.
///
/// Configuration variants are raised by [`Builder::finalize`] and are not
/// retryable; runtime variants are raised by [`IdGenerator::next_id`] and are
/// fatal to that call only.
///
/// [`Builder::finalize`]: crate::Builder::finalize
/// [`IdGenerator::next_id`]: crate::IdGenerator::next_id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("node_id_bit_len `{0}` is outside the allowed range 1..=15")]
    InvalidNodeIdBitLength(u8),
    #[error("seq_bit_len `{0}` is outside the allowed range 3..=21")]
    InvalidSequenceBitLength(u8),
    #[error("data_center_id_bit_len `{0}` is outside the allowed range 1..=15")]
    InvalidDataCenterIdBitLength(u8),
    #[error("node_id_bit_len({node_id_bits}) + seq_bit_len({seq_bits}) must not exceed 22")]
    BitLengthOverflow { node_id_bits: u8, seq_bits: u8 },
    #[error("node_id `{node_id}` is greater than the max allowed value {max}")]
    InvalidNodeId { node_id: u16, max: u16 },
    #[error("data_center_id `{data_center_id}` is greater than the max allowed value {max}")]
    InvalidDataCenterId { data_center_id: u16, max: u16 },
    #[error("max_sequence `{max_sequence}` is greater than the max allowed value {limit}")]
    InvalidMaxSequence { max_sequence: u32, limit: u32 },
    #[error("min_sequence `{0}` is outside the allowed range 0..=127")]
    InvalidMinSequence(u32),
    #[error("top_over_cost_count `{0}` is outside the allowed range 0..=10000")]
    InvalidOverCostCount(u32),
    #[error("max_backward_tolerance_ms `{0}` is outside the allowed range 0..=60000")]
    InvalidBackwardTolerance(u32),
    #[error("base_time `{0}` is ahead of current time")]
    BaseTimeAheadOfCurrentTime(DateTime<Utc>),
    #[error("wall clock moved {delta_ms}ms behind the last issued timestamp")]
    ClockMovedBackward { delta_ms: i64 },
    #[error("gave up waiting out clock drift after {attempts} retries")]
    DriftRetriesExhausted { attempts: u32 },
    #[error("batch size `{0}` must be at least 1")]
    InvalidBatchSize(usize),
    #[error("mutex is poisoned (i.e. a panic happened while it was locked)")]
    MutexPoisoned,
}
