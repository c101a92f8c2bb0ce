use crate::builder::Builder;
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::layout::{DecomposedId, Layout};
use chrono::{DateTime, Utc};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// fixed back-off while waiting out a tolerated backward clock jump
pub(crate) const DRIFT_BACKOFF: Duration = Duration::from_millis(5);
/// poll interval while waiting for the clock to reach the next tick
pub(crate) const TICK_POLL: Duration = Duration::from_millis(1);

/// The generation strategy run on every `next_id` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Fail fast: any backward clock observation is an error.
    Classic,
    /// Wait out backward clock jumps up to a configured tolerance with a
    /// bounded number of fixed back-offs.
    DriftTolerant,
}

/// Mutable generator state.
/// Exclusively owned by one generator and only touched under its lock.
#[derive(Debug)]
pub(crate) struct State {
    /// ticks since base time at the last issued ID
    pub(crate) last_tick: i64,
    pub(crate) sequence: u32,
    /// consecutive drift back-offs, reset when the clock moves forward
    pub(crate) over_cost_count: u32,
}

/// SharedGenerator is shared between cloned [`IdGenerator`] handles.
/// This struct is not exposed to the public.
pub(crate) struct SharedGenerator<C> {
    pub(crate) node_id: u16,
    pub(crate) data_center_id: u16,
    pub(crate) algorithm: Algorithm,
    pub(crate) layout: Layout,
    pub(crate) max_sequence: u32,
    pub(crate) min_sequence: u32,
    pub(crate) looped_sequence: bool,
    pub(crate) max_backward_tolerance_ms: u32,
    pub(crate) top_over_cost_count: u32,
    pub(crate) clock: C,
    pub(crate) state: Mutex<State>,
}

/// A snapshot of one generator's state, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// ticks since base time at the last issued ID
    pub last_tick: i64,
    pub sequence: u32,
    pub over_cost_count: u32,
    pub node_id: u16,
    pub data_center_id: u16,
}

/// IdGenerator is a distributed unique ID generator.
/// It is thread-safe and can be cloned to be used in multiple threads.
pub struct IdGenerator<C = SystemClock>(pub(crate) Arc<SharedGenerator<C>>);

impl IdGenerator<SystemClock> {
    /// Create a new IdGenerator with the default configuration.
    /// For custom configuration see [`builder`].
    ///
    /// [`builder`]: struct.IdGenerator.html#method.builder
    pub fn new() -> Result<Self, Error> {
        Builder::new().finalize()
    }

    /// Create a new [`Builder`] to construct an IdGenerator.
    ///
    /// [`Builder`]: struct.Builder.html
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<C: Clock> IdGenerator<C> {
    pub(crate) fn new_inner(shared: Arc<SharedGenerator<C>>) -> Self {
        Self(shared)
    }

    /// Generate the next unique ID.
    ///
    /// Serializes through the generator's lock, which stays held across any
    /// wait inside the call: that is what keeps `(timestamp, sequence)` pairs
    /// strictly ordered per instance. Fails per the configured algorithm's
    /// clock-regression policy; never returns a partial ID.
    pub fn next_id(&self) -> Result<i64, Error> {
        let mut state = self.0.state.lock().map_err(|_| Error::MutexPoisoned)?;
        match self.0.algorithm {
            Algorithm::Classic => self.next_classic(&mut state),
            Algorithm::DriftTolerant => self.next_drift_tolerant(&mut state),
        }
    }

    /// Generate `count` IDs.
    ///
    /// Each ID is an independent lock-serialized `next_id` call; other
    /// threads may interleave their own IDs between two batch members.
    pub fn next_id_batch(&self, count: usize) -> Result<Vec<i64>, Error> {
        if count == 0 {
            return Err(Error::InvalidBatchSize(count));
        }
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.next_id()?);
        }
        Ok(ids)
    }

    /// Snapshot the generator's state for an external metrics or logging
    /// consumer.
    pub fn stats(&self) -> Result<Stats, Error> {
        let state = self.0.state.lock().map_err(|_| Error::MutexPoisoned)?;
        Ok(Stats {
            last_tick: state.last_tick,
            sequence: state.sequence,
            over_cost_count: state.over_cost_count,
            node_id: self.0.node_id,
            data_center_id: self.0.data_center_id,
        })
    }

    /// The instant `id` was issued at. Takes no lock.
    ///
    /// Meaningful only for IDs produced under this generator's layout; see
    /// [`Layout::timestamp_of`].
    pub fn timestamp_of(&self, id: i64) -> DateTime<Utc> {
        self.0.layout.timestamp_of(id)
    }

    /// The node ID embedded in `id`. Takes no lock.
    pub fn node_id_of(&self, id: i64) -> u16 {
        self.0.layout.node_id_of(id)
    }

    /// The datacenter ID embedded in `id`. Takes no lock.
    pub fn data_center_id_of(&self, id: i64) -> u16 {
        self.0.layout.data_center_id_of(id)
    }

    /// The sequence number embedded in `id`. Takes no lock.
    pub fn sequence_of(&self, id: i64) -> u32 {
        self.0.layout.sequence_of(id)
    }

    /// Break `id` up into its parts. Takes no lock.
    pub fn decompose(&self, id: i64) -> DecomposedId {
        self.0.layout.decompose(id)
    }

    /// The bit layout this generator composes and decodes IDs with.
    pub fn layout(&self) -> Layout {
        self.0.layout
    }

    fn next_classic(&self, state: &mut State) -> Result<i64, Error> {
        let shared = &*self.0;
        let mut tick = shared.layout.current_tick(&shared.clock);

        if tick < state.last_tick {
            return Err(Error::ClockMovedBackward {
                delta_ms: shared.layout.unit.ticks_to_millis(state.last_tick - tick),
            });
        }
        if tick == state.last_tick {
            state.sequence = (state.sequence + 1) & shared.max_sequence;
            if state.sequence == 0 {
                // Tick exhausted. Wait for the next one; the sequence stays
                // at its wrapped value rather than resetting to the minimum.
                tick = self.wait_next_tick(state.last_tick);
            }
        } else {
            state.sequence = shared.min_sequence;
        }

        state.last_tick = tick;
        Ok(self.compose(tick, state.sequence))
    }

    fn next_drift_tolerant(&self, state: &mut State) -> Result<i64, Error> {
        let shared = &*self.0;
        let mut tick = shared.layout.current_tick(&shared.clock);

        while tick < state.last_tick {
            let delta_ms = shared.layout.unit.ticks_to_millis(state.last_tick - tick);
            if delta_ms > i64::from(shared.max_backward_tolerance_ms) {
                return Err(Error::ClockMovedBackward { delta_ms });
            }
            shared.clock.sleep(DRIFT_BACKOFF);
            state.over_cost_count += 1;
            if state.over_cost_count > shared.top_over_cost_count {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    delta_ms,
                    attempts = state.over_cost_count,
                    "giving up on backward clock jump"
                );
                return Err(Error::DriftRetriesExhausted {
                    attempts: state.over_cost_count,
                });
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                delta_ms,
                attempts = state.over_cost_count,
                "clock behind last issued tick, backing off"
            );
            tick = shared.layout.current_tick(&shared.clock);
        }

        if tick == state.last_tick {
            state.sequence += 1;
            if state.sequence > shared.max_sequence {
                if shared.looped_sequence {
                    // Wrap within the same tick. Collisions with the IDs
                    // already issued this tick become possible.
                    state.sequence = shared.min_sequence;
                } else {
                    tick = self.wait_next_tick(state.last_tick);
                    state.sequence = shared.min_sequence;
                }
            }
        } else {
            state.sequence = shared.min_sequence;
            state.over_cost_count = 0;
        }

        state.last_tick = tick;
        Ok(self.compose(tick, state.sequence))
    }

    /// Polls the clock until it has passed `last_tick`.
    /// Called with the generator lock held.
    fn wait_next_tick(&self, last_tick: i64) -> i64 {
        let shared = &*self.0;
        loop {
            let tick = shared.layout.current_tick(&shared.clock);
            if tick > last_tick {
                return tick;
            }
            shared.clock.sleep(TICK_POLL);
        }
    }

    fn compose(&self, tick: i64, sequence: u32) -> i64 {
        let layout = &self.0.layout;
        (tick & layout.timestamp_mask) << layout.timestamp_shift
            | i64::from(self.0.data_center_id) << layout.dc_shift
            | i64::from(self.0.node_id) << layout.node_shift
            | i64::from(sequence)
    }
}

/// Returns a new `IdGenerator` referencing the same state as `self`.
/// This is used for concurrent use.
impl<C> Clone for IdGenerator<C> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
