#![cfg(test)]
//! Virtual-time scheduler for deterministic tests: the clock only moves
//! when told to, and queued tasks only run when `run_tasks` is called.

use std::{cell::RefCell, rc::Rc};

use futures::future::AbortHandle;

use crate::prelude::*;

#[derive(Clone)]
pub struct ManualScheduler {
  clock: Rc<RefCell<FakeClock>>,
  tasks: Rc<RefCell<Vec<OneshotTask>>>,
}

struct FakeClock {
  current_time: Instant,
}

impl FakeClock {
  fn new(time: Instant) -> FakeClock { FakeClock { current_time: time } }

  fn instant(&self) -> Instant { self.current_time }

  fn advance(&mut self, duration: Duration) {
    self.current_time += duration;
  }
}

struct OneshotTask {
  task: Box<dyn FnOnce()>,
  due: Instant,
  cancel: SpawnHandle,
}

impl ManualScheduler {
  pub fn new(now: Instant) -> ManualScheduler {
    ManualScheduler {
      clock: Rc::new(RefCell::new(FakeClock::new(now))),
      tasks: Rc::new(RefCell::new(vec![])),
    }
  }

  pub fn now() -> ManualScheduler { ManualScheduler::new(Instant::now()) }

  pub fn pending_count(&self) -> usize { self.tasks.borrow().len() }

  pub fn advance(&self, duration: Duration) {
    self.clock.borrow_mut().advance(duration);
  }

  /// Run every queued task that is due at the current virtual time, in
  /// arrival order. Cancelled tasks are dropped without running.
  pub fn run_tasks(&self) {
    loop {
      let now = self.clock.borrow().instant();
      let due = {
        let mut tasks = self.tasks.borrow_mut();
        tasks
          .iter()
          .position(|t| t.due <= now)
          .map(|idx| tasks.remove(idx))
      };
      let Some(task) = due else { break };
      if !task.cancel.is_closed() {
        (task.task)();
      }
    }
  }

  pub fn advance_and_run(&self, duration: Duration) {
    self.advance(duration);
    self.run_tasks();
  }
}

impl LocalScheduler for ManualScheduler {
  type Worker = ManualWorker;

  fn create_worker(&self) -> ManualWorker {
    ManualWorker {
      scheduler: self.clone(),
      tasks: LocalSubscription::default(),
    }
  }
}

#[derive(Clone)]
pub struct ManualWorker {
  scheduler: ManualScheduler,
  tasks: LocalSubscription,
}

impl LocalWorker for ManualWorker {
  fn schedule<S: 'static>(
    &self,
    task: impl FnOnce(S) + 'static,
    delay: Option<Duration>,
    state: S,
  ) -> SpawnHandle {
    let (abort, _registration) = AbortHandle::new_pair();
    if self.tasks.is_closed() {
      abort.abort();
      return SpawnHandle::new(abort);
    }
    let handle = SpawnHandle::new(abort);
    let due =
      self.scheduler.clock.borrow().instant() + delay.unwrap_or_default();
    self.scheduler.tasks.borrow_mut().push(OneshotTask {
      task: Box::new(move || task(state)),
      due,
      cancel: handle.clone(),
    });
    self.tasks.add(handle.clone());
    handle
  }
}

impl SubscriptionLike for ManualWorker {
  #[inline]
  fn unsubscribe(&mut self) { self.tasks.unsubscribe(); }

  #[inline]
  fn is_closed(&self) -> bool { self.tasks.is_closed() }
}
