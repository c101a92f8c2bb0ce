use crate::clock::Clock;
use chrono::{DateTime, TimeZone, Utc};

/// bit length of the timestamp field at millisecond resolution
pub(crate) const BIT_LEN_TIME_MILLIS: u8 = 41;
/// bit length of the timestamp field at second resolution
pub(crate) const BIT_LEN_TIME_SECONDS: u8 = 32;

/// Resolution of the timestamp field.
///
/// The resolution determines the width of the timestamp field: 41 bits at
/// millisecond resolution, 32 bits at second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampUnit {
    Seconds,
    Milliseconds,
}

impl TimestampUnit {
    pub(crate) fn field_mask(self) -> i64 {
        match self {
            TimestampUnit::Seconds => (1 << BIT_LEN_TIME_SECONDS) - 1,
            TimestampUnit::Milliseconds => (1 << BIT_LEN_TIME_MILLIS) - 1,
        }
    }

    /// Converts an absolute wall-clock reading to ticks of this resolution.
    pub(crate) fn tick_from_millis(self, millis: i64) -> i64 {
        match self {
            TimestampUnit::Seconds => millis.div_euclid(1000),
            TimestampUnit::Milliseconds => millis,
        }
    }

    /// Converts a tick span to wall-clock milliseconds.
    pub(crate) fn ticks_to_millis(self, ticks: i64) -> i64 {
        match self {
            TimestampUnit::Seconds => ticks * 1000,
            TimestampUnit::Milliseconds => ticks,
        }
    }

    pub(crate) fn tick_of(self, time: DateTime<Utc>) -> i64 {
        match self {
            TimestampUnit::Seconds => time.timestamp(),
            TimestampUnit::Milliseconds => time.timestamp_millis(),
        }
    }

    pub(crate) fn to_datetime(self, tick: i64) -> DateTime<Utc> {
        match self {
            TimestampUnit::Seconds => Utc.timestamp_opt(tick, 0).unwrap(),
            TimestampUnit::Milliseconds => Utc.timestamp_millis_opt(tick).unwrap(),
        }
    }
}

/// The bit layout shared by a generator and its decoder.
///
/// Derived once from a validated configuration and immutable afterwards. IDs
/// pack, from the low bits up: sequence, node ID, datacenter ID, timestamp
/// ticks elapsed since the base time. Bit 63 stays unused.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub(crate) unit: TimestampUnit,
    /// base time expressed in ticks since the Unix epoch
    pub(crate) base_tick: i64,
    pub(crate) timestamp_shift: u32,
    pub(crate) timestamp_mask: i64,
    pub(crate) dc_shift: u32,
    pub(crate) dc_mask: i64,
    pub(crate) node_shift: u32,
    pub(crate) node_mask: i64,
    pub(crate) seq_mask: i64,
}

impl Layout {
    pub(crate) fn derive(
        unit: TimestampUnit,
        base_time: DateTime<Utc>,
        data_center_id_bits: u8,
        node_id_bits: u8,
        seq_bits: u8,
    ) -> Self {
        let node_shift = u32::from(seq_bits);
        let dc_shift = u32::from(seq_bits + node_id_bits);
        let timestamp_shift = u32::from(seq_bits + node_id_bits + data_center_id_bits);
        Self {
            unit,
            base_tick: unit.tick_of(base_time),
            timestamp_shift,
            timestamp_mask: unit.field_mask(),
            dc_shift,
            dc_mask: (1 << data_center_id_bits) - 1,
            node_shift,
            node_mask: (1 << node_id_bits) - 1,
            seq_mask: (1 << seq_bits) - 1,
        }
    }

    /// Ticks elapsed since the base time, read through `clock`.
    pub(crate) fn current_tick<C: Clock>(&self, clock: &C) -> i64 {
        self.unit.tick_from_millis(clock.now_millis()) - self.base_tick
    }

    /// Extracts the instant an ID was issued at.
    ///
    /// Like the other extractors this is pure shift-and-mask over the layout:
    /// decoding an ID produced under a different layout yields a well-defined
    /// but meaningless value. No runtime check guards against that.
    pub fn timestamp_of(&self, id: i64) -> DateTime<Utc> {
        let tick = ((id >> self.timestamp_shift) & self.timestamp_mask) + self.base_tick;
        self.unit.to_datetime(tick)
    }

    /// Extracts the datacenter ID field.
    pub fn data_center_id_of(&self, id: i64) -> u16 {
        ((id >> self.dc_shift) & self.dc_mask) as u16
    }

    /// Extracts the node ID field.
    pub fn node_id_of(&self, id: i64) -> u16 {
        ((id >> self.node_shift) & self.node_mask) as u16
    }

    /// Extracts the sequence field.
    pub fn sequence_of(&self, id: i64) -> u32 {
        (id & self.seq_mask) as u32
    }

    /// Break an ID up into its parts.
    pub fn decompose(&self, id: i64) -> DecomposedId {
        DecomposedId {
            id,
            timestamp: self.timestamp_of(id),
            data_center_id: self.data_center_id_of(id),
            node_id: self.node_id_of(id),
            sequence: self.sequence_of(id),
        }
    }
}

/// The parts of a generated ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecomposedId {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub data_center_id: u16,
    pub node_id: u16,
    pub sequence: u32,
}
