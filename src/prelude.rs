//! Re-exports of the types and traits a downstream pipeline touches.

pub use crate::observer::{SingleObserver, SubscribeAll, SubscribeSuccess};
pub use crate::ops::delay::{
  DelayObserver, DelayObserverThreads, DelayOp, DelayOpThreads, DetachObserver,
};
pub use crate::rc::{MutArc, MutRc, RcDeref, RcDerefMut};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{default_pool, PoolWorker};
pub use crate::scheduler::{
  Duration, Instant, LocalScheduler, LocalWorker, SharedScheduler,
  SharedWorker, SpawnHandle, SpawnerWorker,
};
pub use crate::single::{self, Single, SingleExt};
pub use crate::subscription::*;
