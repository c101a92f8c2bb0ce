use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::generator::{Algorithm, IdGenerator, SharedGenerator, State};
use crate::layout::{Layout, TimestampUnit};
use chrono::prelude::*;
use std::sync::{Arc, Mutex};

/// smallest/largest allowed width of the node ID field
pub(crate) const MIN_BIT_LEN_NODE_ID: u8 = 1;
pub(crate) const MAX_BIT_LEN_NODE_ID: u8 = 15;
/// smallest/largest allowed width of the sequence field
pub(crate) const MIN_BIT_LEN_SEQUENCE: u8 = 3;
pub(crate) const MAX_BIT_LEN_SEQUENCE: u8 = 21;
/// node ID and sequence widths together may not exceed this
pub(crate) const MAX_BIT_LEN_NODE_AND_SEQUENCE: u8 = 22;
/// smallest/largest allowed width of the datacenter ID field (drift only)
pub(crate) const MIN_BIT_LEN_DATA_CENTER_ID: u8 = 1;
pub(crate) const MAX_BIT_LEN_DATA_CENTER_ID: u8 = 15;
/// width of the datacenter ID field under the classic algorithm
pub(crate) const CLASSIC_BIT_LEN_DATA_CENTER_ID: u8 = 5;
/// upper bound of the configurable minimum sequence
pub(crate) const MAX_MIN_SEQUENCE: u32 = 127;
/// upper bound of the drift retry budget
pub(crate) const MAX_TOP_OVER_COST_COUNT: u32 = 10_000;
/// upper bound of the tolerated backward jump, in milliseconds
pub(crate) const MAX_BACKWARD_TOLERANCE_MS: u32 = 60_000;

/// A builder for the [`IdGenerator`].
///
/// All knobs have defaults; `finalize` validates them in a fixed order and
/// fails on the first violation. The derived bit layout is frozen at that
/// point; changing a builder after `finalize` never affects an already
/// constructed generator.
///
/// [`IdGenerator`]: struct.IdGenerator.html
pub struct Builder {
    node_id: u16,
    data_center_id: u16,
    node_id_bit_len: u8,
    seq_bit_len: u8,
    data_center_id_bit_len: u8,
    max_sequence: Option<u32>,
    min_sequence: u32,
    timestamp_unit: TimestampUnit,
    base_time: Option<DateTime<Utc>>,
    algorithm: Algorithm,
    looped_sequence: bool,
    max_backward_tolerance_ms: u32,
    top_over_cost_count: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    /// Construct a new builder for the build of [`IdGenerator`].
    ///
    /// [`IdGenerator`]: struct.IdGenerator.html
    pub fn new() -> Self {
        Self {
            node_id: 0,
            data_center_id: 0,
            node_id_bit_len: 6,
            seq_bit_len: 6,
            data_center_id_bit_len: 5,
            max_sequence: None,
            min_sequence: 0,
            timestamp_unit: TimestampUnit::Milliseconds,
            base_time: None,
            algorithm: Algorithm::DriftTolerant,
            looped_sequence: false,
            max_backward_tolerance_ms: 3_000,
            top_over_cost_count: 2_000,
        }
    }

    /// Set the node ID. Fleet-wide uniqueness of generated IDs relies on
    /// every concurrently running instance being configured with a distinct
    /// `(node_id, data_center_id)` pair; nothing enforces that here.
    pub fn node_id(mut self, node_id: u16) -> Self {
        self.node_id = node_id;
        self
    }

    /// Set the datacenter ID.
    pub fn data_center_id(mut self, data_center_id: u16) -> Self {
        self.data_center_id = data_center_id;
        self
    }

    /// Set the bit length of the node ID section.
    pub fn node_id_bit_len(mut self, node_id_bit_len: u8) -> Self {
        self.node_id_bit_len = node_id_bit_len;
        self
    }

    /// Set the bit length of the sequence section.
    pub fn seq_bit_len(mut self, seq_bit_len: u8) -> Self {
        self.seq_bit_len = seq_bit_len;
        self
    }

    /// Set the bit length of the datacenter ID section.
    ///
    /// Only the drift-tolerant algorithm honors this; the classic algorithm
    /// always uses a 5-bit datacenter field.
    pub fn data_center_id_bit_len(mut self, data_center_id_bit_len: u8) -> Self {
        self.data_center_id_bit_len = data_center_id_bit_len;
        self
    }

    /// Set the largest sequence number issued within one tick.
    /// Defaults to the maximum the sequence section can hold.
    pub fn max_sequence(mut self, max_sequence: u32) -> Self {
        self.max_sequence = Some(max_sequence);
        self
    }

    /// Set the sequence number a fresh tick starts from.
    pub fn min_sequence(mut self, min_sequence: u32) -> Self {
        self.min_sequence = min_sequence;
        self
    }

    /// Set the resolution of the timestamp section.
    pub fn timestamp_unit(mut self, timestamp_unit: TimestampUnit) -> Self {
        self.timestamp_unit = timestamp_unit;
        self
    }

    /// Set the base time.
    /// If the time is set later than the current time, `finalize` will fail.
    pub fn base_time(mut self, base_time: DateTime<Utc>) -> Self {
        self.base_time = Some(base_time);
        self
    }

    /// Choose the generation algorithm.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Let the drift-tolerant algorithm wrap the sequence within a tick
    /// instead of waiting for the next tick. Accepts a collision risk on the
    /// wrapped sequence numbers.
    pub fn looped_sequence(mut self, looped_sequence: bool) -> Self {
        self.looped_sequence = looped_sequence;
        self
    }

    /// Set the largest backward clock jump, in milliseconds, the
    /// drift-tolerant algorithm waits out rather than fails on.
    pub fn max_backward_tolerance_ms(mut self, max_backward_tolerance_ms: u32) -> Self {
        self.max_backward_tolerance_ms = max_backward_tolerance_ms;
        self
    }

    /// Set how many back-off retries the drift-tolerant algorithm spends on
    /// one tolerated backward jump before giving up.
    pub fn top_over_cost_count(mut self, top_over_cost_count: u32) -> Self {
        self.top_over_cost_count = top_over_cost_count;
        self
    }

    /// Finish building and create an [`IdGenerator`] backed by the system
    /// clock. Returns an error if validation fails; no partially usable
    /// generator is ever constructed.
    ///
    /// [`IdGenerator`]: struct.IdGenerator.html
    pub fn finalize(self) -> Result<IdGenerator, Error> {
        self.finalize_with_clock(SystemClock)
    }

    /// `finalize` against an injected clock. Used by tests to drive tick
    /// boundaries deterministically.
    pub(crate) fn finalize_with_clock<C: Clock>(self, clock: C) -> Result<IdGenerator<C>, Error> {
        if self.node_id_bit_len < MIN_BIT_LEN_NODE_ID || self.node_id_bit_len > MAX_BIT_LEN_NODE_ID
        {
            return Err(Error::InvalidNodeIdBitLength(self.node_id_bit_len));
        }
        if self.seq_bit_len < MIN_BIT_LEN_SEQUENCE || self.seq_bit_len > MAX_BIT_LEN_SEQUENCE {
            return Err(Error::InvalidSequenceBitLength(self.seq_bit_len));
        }
        // The classic algorithm pins the datacenter width, so only the
        // drift-tolerant path validates the configured one.
        let data_center_id_bit_len = match self.algorithm {
            Algorithm::Classic => CLASSIC_BIT_LEN_DATA_CENTER_ID,
            Algorithm::DriftTolerant => {
                if self.data_center_id_bit_len < MIN_BIT_LEN_DATA_CENTER_ID
                    || self.data_center_id_bit_len > MAX_BIT_LEN_DATA_CENTER_ID
                {
                    return Err(Error::InvalidDataCenterIdBitLength(
                        self.data_center_id_bit_len,
                    ));
                }
                self.data_center_id_bit_len
            }
        };
        if self.node_id_bit_len + self.seq_bit_len > MAX_BIT_LEN_NODE_AND_SEQUENCE {
            return Err(Error::BitLengthOverflow {
                node_id_bits: self.node_id_bit_len,
                seq_bits: self.seq_bit_len,
            });
        }

        let node_id_max = (1 << self.node_id_bit_len) - 1;
        if self.node_id > node_id_max {
            return Err(Error::InvalidNodeId {
                node_id: self.node_id,
                max: node_id_max,
            });
        }
        let data_center_id_max = (1 << data_center_id_bit_len) - 1;
        if self.data_center_id > data_center_id_max {
            return Err(Error::InvalidDataCenterId {
                data_center_id: self.data_center_id,
                max: data_center_id_max,
            });
        }

        let sequence_limit = (1 << self.seq_bit_len) - 1;
        let max_sequence = self.max_sequence.unwrap_or(sequence_limit);
        if max_sequence > sequence_limit {
            return Err(Error::InvalidMaxSequence {
                max_sequence,
                limit: sequence_limit,
            });
        }
        if self.min_sequence > MAX_MIN_SEQUENCE {
            return Err(Error::InvalidMinSequence(self.min_sequence));
        }
        if self.top_over_cost_count > MAX_TOP_OVER_COST_COUNT {
            return Err(Error::InvalidOverCostCount(self.top_over_cost_count));
        }
        if self.max_backward_tolerance_ms > MAX_BACKWARD_TOLERANCE_MS {
            return Err(Error::InvalidBackwardTolerance(
                self.max_backward_tolerance_ms,
            ));
        }

        let base_time = if let Some(base_time) = self.base_time {
            if base_time.timestamp_millis() > clock.now_millis() {
                return Err(Error::BaseTimeAheadOfCurrentTime(base_time));
            }
            base_time
        } else {
            // Default base time
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
        };

        let layout = Layout::derive(
            self.timestamp_unit,
            base_time,
            data_center_id_bit_len,
            self.node_id_bit_len,
            self.seq_bit_len,
        );

        let shared = Arc::new(SharedGenerator {
            node_id: self.node_id,
            data_center_id: self.data_center_id,
            algorithm: self.algorithm,
            layout,
            max_sequence,
            min_sequence: self.min_sequence,
            looped_sequence: self.looped_sequence,
            max_backward_tolerance_ms: self.max_backward_tolerance_ms,
            top_over_cost_count: self.top_over_cost_count,
            clock,
            state: Mutex::new(State {
                last_tick: 0,
                sequence: 0,
                over_cost_count: 0,
            }),
        });
        Ok(IdGenerator::new_inner(shared))
    }
}
