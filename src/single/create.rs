use crate::prelude::*;

/// Creates a single from a function that drives the observer by hand.
///
/// The function receives the subscribing observer by value and may terminate
/// it synchronously, park it somewhere for a later terminal call, or drop it
/// to never terminate.
pub fn create<F>(subscribe: F) -> CreateSingle<F> { CreateSingle(subscribe) }

#[derive(Clone)]
pub struct CreateSingle<F>(pub(crate) F);

impl<Item, Err, O, F> Single<Item, Err, O> for CreateSingle<F>
where
  O: SingleObserver<Item, Err>,
  F: FnOnce(O),
{
  type Unsub = FlagSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    (self.0)(observer);
    FlagSubscription::default()
  }
}

impl<Item, Err, F> SingleExt<Item, Err> for CreateSingle<F> {}
