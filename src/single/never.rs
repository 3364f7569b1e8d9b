use crate::prelude::*;

/// Creates a single that never terminates.
pub fn never() -> NeverSingle { NeverSingle }

#[derive(Clone)]
pub struct NeverSingle;

impl<Item, Err, O> Single<Item, Err, O> for NeverSingle
where
  O: SingleObserver<Item, Err>,
{
  type Unsub = FlagSubscription;

  fn actual_subscribe(self, _observer: O) -> Self::Unsub {
    FlagSubscription::default()
  }
}

impl<Item, Err> SingleExt<Item, Err> for NeverSingle {}
