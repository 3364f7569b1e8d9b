//! Shared mutable cells used to hand one observer slot to several owners.

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::Rc,
  sync::{Arc, Mutex, MutexGuard},
};

/// Immutable access to the value behind a shared mutable cell.
pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;

  fn rc_deref(&self) -> Self::Target<'_>;
}

/// Mutable access to the value behind a shared mutable cell.
pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;

  fn rc_deref_mut(&self) -> Self::Target<'_>;
}

/// Shared mutable cell for single-thread pipelines.
pub struct MutRc<T>(Rc<RefCell<T>>);

/// Shared mutable cell for cross-thread pipelines.
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }
}

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }
}

impl<T> RcDeref for MutRc<T> {
  type Target<'a>
    = Ref<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref(&self) -> Self::Target<'_> { self.0.borrow() }
}

impl<T> RcDeref for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref(&self) -> Self::Target<'_> { self.0.lock().unwrap() }
}

impl<T> RcDerefMut for MutRc<T> {
  type Target<'a>
    = RefMut<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref_mut(&self) -> Self::Target<'_> { self.0.borrow_mut() }
}

impl<T> RcDerefMut for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  fn rc_deref_mut(&self) -> Self::Target<'_> { self.0.lock().unwrap() }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn clones_share_the_cell() {
    let a = MutRc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() = 2;
    assert_eq!(*a.rc_deref(), 2);

    let a = MutArc::own(1);
    let b = a.clone();
    *b.rc_deref_mut() = 2;
    assert_eq!(*a.rc_deref(), 2);
  }
}
