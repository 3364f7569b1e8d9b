//! The Single contract: producers that emit exactly one success value or
//! exactly one error per subscription, then terminate.

pub mod create;
pub mod never;
pub mod of;
pub mod throw;

pub use create::{create, CreateSingle};
pub use never::{never, NeverSingle};
pub use of::{of, OfSingle};
pub use throw::{throw, ThrowSingle};

use crate::{
  observer::{SingleObserver, SubscribeAll, SubscribeSuccess},
  ops::delay::{DelayOp, DelayOpThreads},
  scheduler::{Duration, LocalScheduler, SharedScheduler},
  subscription::{SubscriptionLike, SubscriptionWrapper},
};

/// A producer of exactly one terminal event.
///
/// Starting the producer hands it an observer; the producer invokes exactly
/// one of the observer's terminal methods, exactly once, at any time at or
/// after the `actual_subscribe` call, possibly synchronously.
pub trait Single<Item, Err, O: SingleObserver<Item, Err>> {
  type Unsub: SubscriptionLike;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Combinators and subscribe entry points shared by every Single.
pub trait SingleExt<Item, Err>: Sized {
  /// Defers the delivery of this producer's terminal event by `delay`,
  /// re-emitting it on a worker created from `scheduler`.
  ///
  /// The event itself is captured the moment the upstream produces it; only
  /// its delivery is postponed, and it always travels through the worker
  /// even for a zero delay. Cancelling the returned subscription before the
  /// delay elapses discards the captured event silently.
  fn delay<SD>(self, delay: Duration, scheduler: SD) -> DelayOp<Self, SD>
  where
    SD: LocalScheduler,
  {
    DelayOp { source: self, delay, scheduler }
  }

  /// Thread-safe rendition of [`delay`](SingleExt::delay): the upstream may
  /// terminate on any thread and the delivery runs on the shared
  /// scheduler's worker.
  fn delay_threads<SD>(
    self,
    delay: Duration,
    scheduler: SD,
  ) -> DelayOpThreads<Self, SD>
  where
    SD: SharedScheduler,
  {
    DelayOpThreads { source: self, delay, scheduler }
  }

  /// Subscribe with a success handler; only available on producers that
  /// cannot fail.
  fn subscribe<F>(
    self,
    on_success: F,
  ) -> SubscriptionWrapper<<Self as Single<Item, Err, SubscribeSuccess<F>>>::Unsub>
  where
    Self: Single<Item, Err, SubscribeSuccess<F>>,
    SubscribeSuccess<F>: SingleObserver<Item, Err>,
    F: FnMut(Item),
  {
    SubscriptionWrapper(self.actual_subscribe(SubscribeSuccess(on_success)))
  }

  /// Subscribe with handlers for both terminal outcomes.
  fn subscribe_all<F, E>(
    self,
    on_success: F,
    on_error: E,
  ) -> SubscriptionWrapper<<Self as Single<Item, Err, SubscribeAll<F, E>>>::Unsub>
  where
    Self: Single<Item, Err, SubscribeAll<F, E>>,
    F: FnMut(Item),
    E: FnMut(Err),
  {
    SubscriptionWrapper(self.actual_subscribe(SubscribeAll(on_success, on_error)))
  }
}
