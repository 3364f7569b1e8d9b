use crate::prelude::*;

/// Creates a single that delivers `value`, immediately and on the
/// subscribing thread. Never fails.
///
/// # Examples
///
/// ```
/// use rxsingle::prelude::*;
///
/// single::of(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item>(value: Item) -> OfSingle<Item> { OfSingle(value) }

#[derive(Clone)]
pub struct OfSingle<Item>(pub(crate) Item);

impl<Item, Err, O> Single<Item, Err, O> for OfSingle<Item>
where
  O: SingleObserver<Item, Err>,
{
  type Unsub = FlagSubscription;

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.on_success(self.0);
    FlagSubscription::default()
  }
}

impl<Item, Err> SingleExt<Item, Err> for OfSingle<Item> {}
