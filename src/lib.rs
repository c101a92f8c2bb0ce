//! A distributed unique ID generator in the [Twitter Snowflake] family, with
//! a configurable bit layout and a choice of clock-regression policies.
//!
//! Every ID is a non-negative `i64` packing, from the low bits up: a
//! per-tick sequence number, a node ID, a datacenter ID and the time elapsed
//! since a configured base time. IDs from one instance are strictly ordered;
//! IDs across a fleet are unique as long as every instance runs with a
//! distinct `(node_id, data_center_id)` pair. No coordinator and no shared
//! storage are involved.
//!
//! Two generation algorithms are available:
//!
//! - [`Algorithm::Classic`] fails fast with [`Error::ClockMovedBackward`] on
//!   any backward clock observation.
//! - [`Algorithm::DriftTolerant`] waits out backward jumps up to a configured
//!   tolerance with a bounded number of fixed back-offs, and only then fails.
//!
//! ## Quickstart
//!
//! Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! driftflake = "0.1"
//! ```
//!
//! Use the library like this:
//!
//! ```
//! use driftflake::IdGenerator;
//!
//! let generator = IdGenerator::builder()
//!     .node_id(1)
//!     .finalize()
//!     .unwrap();
//! let id = generator.next_id().unwrap();
//! assert_eq!(generator.node_id_of(id), 1);
//! ```
//!
//! ## Concurrent use
//!
//! An `IdGenerator` is thread-safe. `clone` it before moving to another
//! thread; clones share one state record and one lock:
//! ```
//! use driftflake::IdGenerator;
//! use std::thread;
//!
//! let generator = IdGenerator::new().unwrap();
//!
//! let mut children = Vec::new();
//! for _ in 0..10 {
//!     let thread_generator = generator.clone();
//!     children.push(thread::spawn(move || {
//!         println!("{}", thread_generator.next_id().unwrap());
//!     }));
//! }
//!
//! for child in children {
//!     child.join().unwrap();
//! }
//! ```
//!
//! [Twitter Snowflake]: https://blog.twitter.com/2010/announcing-snowflake

mod builder;
mod clock;
mod error;
pub mod format;
mod generator;
mod layout;

pub use crate::clock::{Clock, SystemClock};
pub use crate::generator::*;
pub use crate::layout::{DecomposedId, Layout, TimestampUnit};
pub use builder::*;
pub use error::*;
