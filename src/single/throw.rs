use crate::prelude::*;

/// Creates a single that terminates with `err` instead of a value,
/// immediately and on the subscribing thread.
pub fn throw<Err>(err: Err) -> ThrowSingle<Err> { ThrowSingle(err) }

#[derive(Clone)]
pub struct ThrowSingle<Err>(pub(crate) Err);

impl<Item, Err, O> Single<Item, Err, O> for ThrowSingle<Err>
where
  O: SingleObserver<Item, Err>,
{
  type Unsub = FlagSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.on_error(self.0);
    FlagSubscription::default()
  }
}

impl<Item, Err> SingleExt<Item, Err> for ThrowSingle<Err> {}
