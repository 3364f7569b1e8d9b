//! Observer side of the Single contract.
//!
//! A [`SingleObserver`] consumes exactly one terminal event per
//! subscription: either a success value or an error, never both.

use std::convert::Infallible;

use crate::rc::{MutArc, MutRc, RcDerefMut};

/// The consumer of a [`Single`](crate::single::Single).
///
/// The producer contract guarantees that at most one of these methods is
/// invoked, exactly once per subscription.
pub trait SingleObserver<Item, Err> {
  /// Accept the success value terminating the producer.
  fn on_success(&mut self, value: Item);

  /// Accept the error terminating the producer.
  fn on_error(&mut self, err: Err);
}

/// Closure adapter for subscriptions that only care about the success value.
///
/// Pins `Err` to [`Infallible`], so type inference resolves without
/// annotating the error side and producers that can fail don't silently lose
/// their errors here.
#[derive(Clone)]
pub struct SubscribeSuccess<F>(pub F);

impl<Item, F> SingleObserver<Item, Infallible> for SubscribeSuccess<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn on_success(&mut self, value: Item) { (self.0)(value); }

  #[inline]
  fn on_error(&mut self, _err: Infallible) {}
}

/// Closure adapter accepting both terminal outcomes.
#[derive(Clone)]
pub struct SubscribeAll<F, E>(pub F, pub E);

impl<Item, Err, F, E> SingleObserver<Item, Err> for SubscribeAll<F, E>
where
  F: FnMut(Item),
  E: FnMut(Err),
{
  #[inline]
  fn on_success(&mut self, value: Item) { (self.0)(value); }

  #[inline]
  fn on_error(&mut self, err: Err) { (self.1)(err); }
}

// Once-slot observers: the parked observer is taken on the first terminal
// event, so a second terminal from a non-conforming upstream is a no-op, and
// clearing the slot from the outside detaches the consumer entirely.
macro_rules! once_slot_observer_impl {
  ($rc: ident) => {
    impl<O, Item, Err> SingleObserver<Item, Err> for $rc<Option<O>>
    where
      O: SingleObserver<Item, Err>,
    {
      fn on_success(&mut self, value: Item) {
        let inner = self.rc_deref_mut().take();
        if let Some(mut inner) = inner {
          inner.on_success(value);
        }
      }

      fn on_error(&mut self, err: Err) {
        let inner = self.rc_deref_mut().take();
        if let Some(mut inner) = inner {
          inner.on_error(err);
        }
      }
    }
  };
}

once_slot_observer_impl!(MutRc);
once_slot_observer_impl!(MutArc);
