//! Defers the delivery of a Single's terminal event: the event is captured
//! the moment the upstream produces it, then re-emitted to the consumer on a
//! scheduler worker once the configured delay has elapsed.

use crate::prelude::*;

/// Delay adapter for the local context.
#[derive(Clone)]
pub struct DelayOp<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

/// Thread-safe rendition of [`DelayOp`].
#[derive(Clone)]
pub struct DelayOpThreads<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

/// Observer handed to the upstream.
///
/// Holds no pending event of its own: the terminal event moves into the one
/// forwarding task it schedules, so a pending value and a pending error can
/// never coexist, and cancelling the worker drops the event with the task.
pub struct DelayObserver<O, W> {
  observer: MutRc<Option<O>>,
  worker: W,
  delay: Duration,
}

pub struct DelayObserverThreads<O, W> {
  observer: MutArc<Option<O>>,
  worker: W,
  delay: Duration,
}

/// Registered on the composite subscription so that cancelling after the
/// event was captured, but before the delay elapsed, detaches the consumer:
/// a forwarding task that still manages to run finds the slot empty.
pub struct DetachObserver<R>(R);

macro_rules! impl_detach_observer {
  ($rc: ident) => {
    impl<O> SubscriptionLike for DetachObserver<$rc<Option<O>>> {
      fn unsubscribe(&mut self) { self.0.rc_deref_mut().take(); }

      fn is_closed(&self) -> bool { self.0.rc_deref().is_none() }
    }
  };
}

impl_detach_observer!(MutRc);
impl_detach_observer!(MutArc);

/// Releases the worker on every exit path of a forwarding task, a panicking
/// downstream handler included.
struct WorkerGuard<W: SubscriptionLike>(W);

impl<W: SubscriptionLike> Drop for WorkerGuard<W> {
  fn drop(&mut self) { self.0.unsubscribe(); }
}

fn success_task<Item, Err, O, W>((mut observer, value, worker): (O, Item, W))
where
  O: SingleObserver<Item, Err>,
  W: SubscriptionLike,
{
  let _worker = WorkerGuard(worker);
  observer.on_success(value);
}

fn error_task<Item, Err, O, W>((mut observer, err, worker): (O, Err, W))
where
  O: SingleObserver<Item, Err>,
  W: SubscriptionLike,
{
  let _worker = WorkerGuard(worker);
  observer.on_error(err);
}

macro_rules! impl_delay_single {
  ($op: ty, $rc: ident, $observer: ident, $subscription: ty,
   $scheduler: ident, $worker: ident $(, $send: ident)?) => {
    impl<Item, Err, O, S, SD> Single<Item, Err, O> for $op
    where
      Item: $($send +)? 'static,
      Err: $($send +)? 'static,
      O: SingleObserver<Item, Err> $(+ $send)? + 'static,
      S: Single<Item, Err, $observer<O, SD::Worker>>,
      S::Unsub: $($send + Sync +)? 'static,
      SD: $scheduler,
    {
      type Unsub = $subscription;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let Self { source, delay, scheduler } = self;
        let worker = scheduler.create_worker();
        let subscription = <$subscription>::default();
        let observer = $rc::own(Some(observer));
        // the upstream may terminate synchronously; both resources must be
        // tracked before it starts
        subscription.add(worker.clone());
        subscription.add(DetachObserver(observer.clone()));
        let delay_observer = $observer { observer, worker, delay };
        subscription.add(source.actual_subscribe(delay_observer));
        subscription
      }
    }

    impl<Item, Err, O, W> SingleObserver<Item, Err> for $observer<O, W>
    where
      Item: $($send +)? 'static,
      Err: $($send +)? 'static,
      O: SingleObserver<Item, Err> $(+ $send)? + 'static,
      W: $worker $(+ $send)? + 'static,
    {
      fn on_success(&mut self, value: Item) {
        let state = (self.observer.clone(), value, self.worker.clone());
        self.worker.schedule(
          success_task::<Item, Err, $rc<Option<O>>, W>,
          Some(self.delay),
          state,
        );
      }

      fn on_error(&mut self, err: Err) {
        let state = (self.observer.clone(), err, self.worker.clone());
        self.worker.schedule(
          error_task::<Item, Err, $rc<Option<O>>, W>,
          Some(self.delay),
          state,
        );
      }
    }

    impl<Item, Err, S, SD> SingleExt<Item, Err> for $op where
      S: SingleExt<Item, Err>
    {
    }
  };
}

impl_delay_single!(
  DelayOp<S, SD>,
  MutRc,
  DelayObserver,
  LocalSubscription,
  LocalScheduler,
  LocalWorker
);
impl_delay_single!(
  DelayOpThreads<S, SD>,
  MutArc,
  DelayObserverThreads,
  SharedSubscription,
  SharedScheduler,
  SharedWorker,
  Send
);

#[cfg(test)]
mod test {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Instant,
  };

  use bencher::benchmark_group;
  use futures::executor::LocalPool;

  use super::*;
  use crate::{prelude::*, test_scheduler::ManualScheduler};

  #[test]
  fn local_smoke() {
    let value = Rc::new(RefCell::new(0));
    let c_value = value.clone();
    let mut pool = LocalPool::new();
    single::of(1)
      .delay(Duration::from_millis(1), pool.spawner())
      .subscribe(move |v| {
        *c_value.borrow_mut() = v;
      });
    assert_eq!(*value.borrow(), 0);
    let stamp = Instant::now();
    pool.run();
    assert!(stamp.elapsed() >= Duration::from_millis(1));
    assert_eq!(*value.borrow(), 1);
  }

  #[test]
  fn virtual_time_success() {
    let scheduler = ManualScheduler::now();
    let received = Rc::new(RefCell::new(Vec::new()));
    let r = received.clone();
    single::of(42)
      .delay(Duration::from_millis(100), scheduler.clone())
      .subscribe(move |v| r.borrow_mut().push(v));

    scheduler.advance_and_run(Duration::from_millis(50));
    assert!(received.borrow().is_empty());
    scheduler.advance_and_run(Duration::from_millis(50));
    assert_eq!(*received.borrow(), vec![42]);
  }

  #[test]
  fn virtual_time_error() {
    let scheduler = ManualScheduler::now();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let values = Rc::new(Cell::new(0));
    let e = errors.clone();
    let v = values.clone();
    single::throw("boom")
      .delay(Duration::from_millis(50), scheduler.clone())
      .subscribe_all(
        move |_: i32| v.set(v.get() + 1),
        move |err| e.borrow_mut().push(err),
      );

    scheduler.advance_and_run(Duration::from_millis(49));
    assert!(errors.borrow().is_empty());
    scheduler.advance_and_run(Duration::from_millis(1));
    assert_eq!(*errors.borrow(), vec!["boom"]);
    assert_eq!(values.get(), 0);
  }

  #[test]
  fn exactly_once_delivery() {
    let scheduler = ManualScheduler::now();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    single::of(7)
      .delay(Duration::from_millis(10), scheduler.clone())
      .subscribe(move |_| h.set(h.get() + 1));

    scheduler.advance_and_run(Duration::from_millis(10));
    scheduler.advance_and_run(Duration::from_millis(1000));
    assert_eq!(hits.get(), 1);
  }

  #[test]
  fn unsubscribe_suppresses_captured_event() {
    let scheduler = ManualScheduler::now();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let mut sub = single::of(1)
      .delay(Duration::from_millis(100), scheduler.clone())
      .subscribe(move |_| h.set(h.get() + 1));

    scheduler.advance_and_run(Duration::from_millis(10));
    sub.unsubscribe();
    scheduler.advance_and_run(Duration::from_millis(200));
    assert_eq!(hits.get(), 0);
  }

  #[test]
  fn unsubscribe_is_idempotent() {
    let scheduler = ManualScheduler::now();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let mut sub = single::of(1)
      .delay(Duration::from_millis(100), scheduler.clone())
      .subscribe(move |_| h.set(h.get() + 1));

    sub.unsubscribe();
    sub.unsubscribe();
    scheduler.advance_and_run(Duration::from_millis(200));
    assert_eq!(hits.get(), 0);
  }

  #[test]
  fn unsubscribe_before_upstream_terminal() {
    let scheduler = ManualScheduler::now();
    let parked = Rc::new(RefCell::new(None));
    let p = parked.clone();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let mut sub = single::create(move |observer| *p.borrow_mut() = Some(observer))
      .delay(Duration::from_millis(10), scheduler.clone())
      .subscribe(move |_: i32| h.set(h.get() + 1));

    sub.unsubscribe();
    // late terminal on a released worker: the forwarding task must never run
    if let Some(mut observer) = parked.borrow_mut().take() {
      observer.on_success(5);
    }
    scheduler.advance_and_run(Duration::from_secs(1));
    assert_eq!(hits.get(), 0);
  }

  #[test]
  fn forwarding_releases_worker() {
    let scheduler = ManualScheduler::now();
    let worker = scheduler.create_worker();
    let delivered = Rc::new(Cell::new(false));
    let d = delivered.clone();
    let mut delay_observer = DelayObserver {
      observer: MutRc::own(Some(SubscribeSuccess(move |_: i32| d.set(true)))),
      worker: worker.clone(),
      delay: Duration::from_millis(5),
    };
    delay_observer.on_success(3);

    assert!(!worker.is_closed());
    scheduler.advance_and_run(Duration::from_millis(5));
    assert!(delivered.get());
    assert!(worker.is_closed());
  }

  #[test]
  fn panicking_downstream_still_releases_worker() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let scheduler = ManualScheduler::now();
    let worker = scheduler.create_worker();
    let mut delay_observer = DelayObserver {
      observer: MutRc::own(Some(SubscribeSuccess(|_: i32| panic!("downstream")))),
      worker: worker.clone(),
      delay: Duration::from_millis(1),
    };
    delay_observer.on_success(1);

    let result = catch_unwind(AssertUnwindSafe(|| {
      scheduler.advance_and_run(Duration::from_millis(1));
    }));
    assert!(result.is_err());
    assert!(worker.is_closed());
  }

  #[test]
  fn zero_delay_keeps_scheduling_path() {
    let value = Rc::new(Cell::new(0));
    let v = value.clone();
    let mut pool = LocalPool::new();
    single::of(9)
      .delay(Duration::ZERO, pool.spawner())
      .subscribe(move |x| v.set(x));

    assert_eq!(value.get(), 0);
    pool.run();
    assert_eq!(value.get(), 9);
  }

  #[cfg(feature = "futures-scheduler")]
  #[test]
  fn shared_smoke() {
    use std::sync::mpsc;

    use futures::executor::ThreadPool;

    let pool = ThreadPool::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let stamp = Instant::now();
    single::of(1)
      .delay_threads(Duration::from_millis(10), pool)
      .subscribe(move |v| tx.send(v).unwrap());

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
    assert!(stamp.elapsed() >= Duration::from_millis(10));
  }

  #[cfg(feature = "futures-scheduler")]
  #[test]
  fn shared_unsubscribe_prevents_delivery() {
    use std::sync::mpsc;

    use futures::executor::ThreadPool;

    let pool = ThreadPool::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let mut sub = single::of(1)
      .delay_threads(Duration::from_millis(50), pool)
      .subscribe(move |v| tx.send(v).unwrap());
    sub.unsubscribe();
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_delay);

  fn bench_delay(b: &mut bencher::Bencher) { b.iter(local_smoke); }
}
