//! # rxsingle
//!
//! Delayed terminal delivery for single-value reactive producers.
//!
//! A [`Single`](single::Single) emits exactly one success value or exactly
//! one error per subscription, then terminates. The delay adapter captures
//! that terminal event the moment the upstream produces it and re-emits it
//! to the consumer on a scheduler worker after a fixed duration, so the
//! consumer never observes the event on the producing thread, and
//! cancelling the subscription before the delay elapses suppresses the
//! delivery entirely.
//!
//! ```rust
//! use futures::executor::LocalPool;
//! use rxsingle::prelude::*;
//!
//! let mut pool = LocalPool::new();
//! single::of(1)
//!   .delay(Duration::from_millis(5), pool.spawner())
//!   .subscribe(|v| println!("{v}"));
//! pool.run();
//! ```
//!
//! ## Key concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Single`](single::Single) | Producer of exactly one terminal event |
//! | [`SingleObserver`](observer::SingleObserver) | Consumes that event |
//! | [`LocalScheduler`](scheduler::LocalScheduler) / [`SharedScheduler`](scheduler::SharedScheduler) | Hand out one worker per subscription |
//! | [`LocalSubscription`](subscription::LocalSubscription) / [`SharedSubscription`](subscription::SharedSubscription) | Composite cancellation handles |
//!
//! ## Feature flags
//!
//! - **`futures-scheduler`** (default): thread-pool backed shared scheduler.

pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod single;
pub mod subscription;
pub mod test_scheduler;

pub use prelude::*;

pub use crate::scheduler::{Duration, Instant};
