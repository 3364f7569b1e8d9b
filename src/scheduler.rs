//! Scheduling layer: workers created one per subscription, able to run a
//! task after a delay and to be released to cancel any pending work.

use futures::{
  executor::LocalSpawner,
  future::{AbortHandle, Abortable},
  task::LocalSpawnExt,
  FutureExt,
};

use crate::subscription::{LocalSubscription, SubscriptionLike};

pub use std::time::{Duration, Instant};

#[cfg(feature = "futures-scheduler")]
use futures::executor::ThreadPool;
#[cfg(feature = "futures-scheduler")]
use once_cell::sync::Lazy;

#[cfg(feature = "futures-scheduler")]
use crate::subscription::SharedSubscription;

/// Cancellation handle for one scheduled task.
///
/// The abort flag is shared by every clone, so cancelling through any of
/// them is observed by the task itself and by the worker that tracks it.
#[derive(Clone)]
pub struct SpawnHandle(AbortHandle);

impl SpawnHandle {
  pub fn new(handle: AbortHandle) -> Self { SpawnHandle(handle) }
}

impl SubscriptionLike for SpawnHandle {
  #[inline]
  fn unsubscribe(&mut self) { self.0.abort(); }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_aborted() }
}

/// A scheduler hands out independent execution contexts.
///
/// Every subscription that needs timed work creates its own worker and owns
/// it exclusively; workers are never shared between subscriptions.
pub trait LocalScheduler {
  type Worker: LocalWorker + 'static;

  fn create_worker(&self) -> Self::Worker;
}

/// Single-thread execution context: runs `task(state)` after `delay` on its
/// own context, one task at a time in arrival order.
///
/// Releasing the worker (`unsubscribe`) cancels every task it has scheduled
/// and makes later `schedule` calls inert: no task scheduled through a
/// released worker may run.
pub trait LocalWorker: SubscriptionLike + Clone {
  fn schedule<S: 'static>(
    &self,
    task: impl FnOnce(S) + 'static,
    delay: Option<Duration>,
    state: S,
  ) -> SpawnHandle;
}

/// Thread-safe counterpart of [`LocalScheduler`].
pub trait SharedScheduler {
  type Worker: SharedWorker + Send + Sync + 'static;

  fn create_worker(&self) -> Self::Worker;
}

/// Thread-safe counterpart of [`LocalWorker`].
pub trait SharedWorker: SubscriptionLike + Clone {
  fn schedule<S: Send + 'static>(
    &self,
    task: impl FnOnce(S) + Send + 'static,
    delay: Option<Duration>,
    state: S,
  ) -> SpawnHandle;
}

async fn delayed<S>(task: impl FnOnce(S), delay: Option<Duration>, state: S) {
  if let Some(delay) = delay {
    futures_time::task::sleep(delay.into()).await;
  }
  task(state);
}

/// Worker driven by a [`LocalPool`](futures::executor::LocalPool) spawner.
#[derive(Clone)]
pub struct SpawnerWorker {
  spawner: LocalSpawner,
  tasks: LocalSubscription,
}

impl LocalScheduler for LocalSpawner {
  type Worker = SpawnerWorker;

  fn create_worker(&self) -> SpawnerWorker {
    SpawnerWorker {
      spawner: self.clone(),
      tasks: LocalSubscription::default(),
    }
  }
}

impl LocalWorker for SpawnerWorker {
  fn schedule<S: 'static>(
    &self,
    task: impl FnOnce(S) + 'static,
    delay: Option<Duration>,
    state: S,
  ) -> SpawnHandle {
    let (abort, registration) = AbortHandle::new_pair();
    if self.tasks.is_closed() {
      abort.abort();
      return SpawnHandle::new(abort);
    }
    let fut = Abortable::new(delayed(task, delay, state), registration);
    self
      .spawner
      .spawn_local(fut.map(|_| ()))
      .expect("spawn task to local pool failed.");
    let handle = SpawnHandle::new(abort);
    self.tasks.add(handle.clone());
    handle
  }
}

impl SubscriptionLike for SpawnerWorker {
  #[inline]
  fn unsubscribe(&mut self) { self.tasks.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.tasks.is_closed() }
}

/// Worker dispatching its tasks to a [`ThreadPool`].
#[cfg(feature = "futures-scheduler")]
#[derive(Clone)]
pub struct PoolWorker {
  pool: ThreadPool,
  tasks: SharedSubscription,
}

#[cfg(feature = "futures-scheduler")]
impl SharedScheduler for ThreadPool {
  type Worker = PoolWorker;

  fn create_worker(&self) -> PoolWorker {
    PoolWorker {
      pool: self.clone(),
      tasks: SharedSubscription::default(),
    }
  }
}

#[cfg(feature = "futures-scheduler")]
impl SharedWorker for PoolWorker {
  fn schedule<S: Send + 'static>(
    &self,
    task: impl FnOnce(S) + Send + 'static,
    delay: Option<Duration>,
    state: S,
  ) -> SpawnHandle {
    let (abort, registration) = AbortHandle::new_pair();
    if self.tasks.is_closed() {
      abort.abort();
      return SpawnHandle::new(abort);
    }
    let fut = Abortable::new(delayed(task, delay, state), registration);
    self.pool.spawn_ok(fut.map(|_| ()));
    let handle = SpawnHandle::new(abort);
    self.tasks.add(handle.clone());
    handle
  }
}

#[cfg(feature = "futures-scheduler")]
impl SubscriptionLike for PoolWorker {
  #[inline]
  fn unsubscribe(&mut self) { self.tasks.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.tasks.is_closed() }
}

#[cfg(feature = "futures-scheduler")]
static DEFAULT_POOL: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("build default thread pool failed."));

/// Process-wide pool shared by subscriptions that do not bring their own
/// scheduler.
#[cfg(feature = "futures-scheduler")]
pub fn default_pool() -> ThreadPool { DEFAULT_POOL.clone() }
