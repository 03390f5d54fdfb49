// Bounded blocking MPMC queue – mutex + two condition variables
//
// Any number of producers and consumers share one `VecDeque` behind a single
// lock. Consumers park on `not_empty`, producers using `OverflowPolicy::Block`
// park on `not_full`. Every wait re-checks its predicate on wake.

use crate::mpmc::error::{PushError, RecvError};
use crate::mpmc::lock_pair::lock_pair;
use crate::mpmc::policy::{Deadline, OverflowPolicy, QueueConfig, Wait};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::{collections::VecDeque, fmt};

/*──────────────────────────────────────────────────────────────────────────*/
/*  State guarded by the lock                                               */
/*──────────────────────────────────────────────────────────────────────────*/

struct State<T> {
   items:   VecDeque<T>,
   config:  QueueConfig,
   closed:  bool,
   evicted: u64,
}

impl<T> State<T> {
   fn new(config: QueueConfig) -> Self {
      Self { items: VecDeque::new(), config, closed: false, evicted: 0 }
   }

   #[inline]
   fn is_full(&self) -> bool {
      self.config.is_bounded() && self.items.len() >= self.config.max_items
   }

   // only used when replacing the whole sequence, pushes go through the policy
   fn trim_to_bound(&mut self) {
      if self.config.is_bounded() {
         let excess = self.items.len().saturating_sub(self.config.max_items);
         self.items.drain(..excess);
         self.evicted += excess as u64;
      }
   }
}

/// Why a parked caller gave up before its predicate cleared.
enum Stop {
   WouldBlock,
   TimedOut,
}

impl Stop {
   fn into_recv_error(self) -> RecvError {
      match self {
         Stop::WouldBlock => RecvError::Empty,
         Stop::TimedOut   => RecvError::Timeout,
      }
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Queue header                                                            */
/*──────────────────────────────────────────────────────────────────────────*/

/// Thread-safe FIFO with an optional capacity bound.
///
/// Share it by reference (scoped threads) or behind an `Arc`. Under the
/// default [`OverflowPolicy::DropOldest`] the queue is lossy: a push into a
/// full queue silently evicts the oldest unread item. Without [`close`] a
/// consumer blocked on an empty queue with no producers left waits forever.
///
/// [`close`]: BoundedBlockingQueue::close
pub struct BoundedBlockingQueue<T> {
   state:     Mutex<State<T>>,
   not_empty: Condvar,
   not_full:  Condvar,
}

impl<T> BoundedBlockingQueue<T> {
   /// An unbounded queue with the drop-oldest policy.
   pub fn new() -> Self {
      Self::with_config(QueueConfig::default())
   }

   pub fn with_max_items(max_items: usize) -> Self {
      Self::with_config(QueueConfig::default().with_max_items(max_items))
   }

   pub fn with_config(config: QueueConfig) -> Self {
      Self {
         state:     Mutex::new(State::new(config)),
         not_empty: Condvar::new(),
         not_full:  Condvar::new(),
      }
   }

   /*──────────────────────────── configuration ───────────────────────────*/

   /// Change the capacity bound. `0` removes it.
   ///
   /// Shrinking below the current length evicts nothing here; the next
   /// drop-oldest push trims the queue down to the new bound.
   pub fn set_max_items(&self, max_items: usize) {
      let mut state = self.state.lock();
      state.config.max_items = max_items;
      // a raised bound may unblock producers
      self.not_full.notify_all();
   }

   pub fn max_items(&self) -> usize {
      self.state.lock().config.max_items
   }

   pub fn set_overflow_policy(&self, overflow: OverflowPolicy) {
      let mut state = self.state.lock();
      state.config.overflow = overflow;
      self.not_full.notify_all();
   }

   pub fn overflow_policy(&self) -> OverflowPolicy {
      self.state.lock().config.overflow
   }

   pub fn config(&self) -> QueueConfig {
      self.state.lock().config
   }

   /*──────────────────────────── producers ───────────────────────────────*/

   /// Append `item`, waiting for room if the policy is `Block`.
   ///
   /// With `DropOldest` this only fails once the queue is closed.
   pub fn push(&self, item: T) -> Result<(), PushError<T>> {
      self.push_with(item, Wait::Forever)
   }

   pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
      self.push_with(item, Wait::Never)
   }

   pub fn push_timeout(&self, item: T, timeout: std::time::Duration) -> Result<(), PushError<T>> {
      self.push_with(item, Wait::For(timeout))
   }

   /// Append `item` at the back. `wait` only matters for `OverflowPolicy::Block`.
   pub fn push_with(&self, item: T, wait: Wait) -> Result<(), PushError<T>> {
      let mut state = self.state.lock();

      if state.closed {
         return Err(PushError::Closed(item));
      }

      // re-evaluated: the policy may change while a `Block` producer is parked
      while state.is_full() {
         let overflow = state.config.overflow;
         match overflow {
            OverflowPolicy::DropOldest => {
               // loop: the bound may have been lowered below the current length
               let mut dropped = 0u64;
               while state.is_full() && state.items.pop_front().is_some() {
                  dropped += 1;
               }
               state.evicted += dropped;
               tracing::trace!(
                  dropped,
                  max_items = state.config.max_items,
                  "queue at capacity, evicted oldest"
               );
            }
            OverflowPolicy::Reject => return Err(PushError::Full(item)),
            OverflowPolicy::Block => {
               let waited = Self::park_while(&self.not_full, &mut state, wait, |s| {
                  s.is_full() && !s.closed && s.config.overflow == OverflowPolicy::Block
               });
               match waited {
                  Err(Stop::WouldBlock) => return Err(PushError::Full(item)),
                  Err(Stop::TimedOut)   => return Err(PushError::Timeout(item)),
                  Ok(()) if state.closed => return Err(PushError::Closed(item)),
                  Ok(()) => {}
               }
            }
         }
      }

      state.items.push_back(item);
      self.not_empty.notify_one();
      Ok(())
   }

   /*──────────────────────────── consumers ───────────────────────────────*/

   /// Remove and return the front item.
   ///
   /// Items queued before [`close`](Self::close) are still handed out; only
   /// a closed *and* empty queue yields `RecvError::Closed`.
   pub fn take(&self, wait: Wait) -> Result<T, RecvError> {
      let mut state = self.state.lock();
      Self::park_while(&self.not_empty, &mut state, wait, |s| s.items.is_empty() && !s.closed)
         .map_err(Stop::into_recv_error)?;

      let item = state.items.pop_front().ok_or(RecvError::Closed)?;
      if state.config.is_bounded() {
         self.not_full.notify_one();
      }
      Ok(item)
   }

   pub fn blocking_take(&self) -> Result<T, RecvError> {
      self.take(Wait::Forever)
   }

   pub fn try_take(&self) -> Result<T, RecvError> {
      self.take(Wait::Never)
   }

   pub fn take_timeout(&self, timeout: std::time::Duration) -> Result<T, RecvError> {
      self.take(Wait::For(timeout))
   }

   /// Remove everything currently queued without waiting, oldest first.
   pub fn drain(&self) -> Vec<T> {
      let mut state = self.state.lock();
      let items: Vec<T> = state.items.drain(..).collect();
      if !items.is_empty() {
         self.not_full.notify_all();
      }
      items
   }

   /*──────────────────────────── lifecycle ───────────────────────────────*/

   /// Refuse further pushes and release every parked thread.
   ///
   /// Returns `true` for the call that actually closed the queue.
   pub fn close(&self) -> bool {
      let mut state = self.state.lock();
      if state.closed {
         return false;
      }
      state.closed = true;
      tracing::debug!(remaining = state.items.len(), "queue closed");
      self.not_empty.notify_all();
      self.not_full.notify_all();
      true
   }

   pub fn is_closed(&self) -> bool {
      self.state.lock().closed
   }

   /*──────────────────────────── inspection ──────────────────────────────*/

   /// Snapshot of the current length; stale as soon as the lock is released.
   pub fn len(&self) -> usize {
      self.state.lock().items.len()
   }

   pub fn is_empty(&self) -> bool {
      self.state.lock().items.is_empty()
   }

   /// Items discarded since construction, either by drop-oldest overflow or
   /// by trimming an oversized `assign_from`/`replace_with` to the bound.
   pub fn evicted(&self) -> u64 {
      self.state.lock().evicted
   }

   /*──────────────────────────── whole-queue replace ─────────────────────*/

   /// Replace this queue's contents with the items of `other`, which is
   /// consumed. Only `self` is locked: nobody else can reach `other`.
   pub fn replace_with(&self, other: BoundedBlockingQueue<T>) {
      let incoming = other.state.into_inner().items;
      let mut state = self.state.lock();
      state.items = incoming;
      state.trim_to_bound();
      tracing::debug!(len = state.items.len(), "queue contents replaced");
      self.wake_all_after_replace(&state);
   }

   fn wake_all_after_replace(&self, state: &State<T>) {
      // a replacement can satisfy many pending waits at once
      if !state.items.is_empty() {
         self.not_empty.notify_all();
      }
      self.not_full.notify_all();
   }

   /*──────────────────────────── internal helpers ────────────────────────*/

   /// Monitor wait: park on `cond` while `blocked` holds, re-checking after
   /// every wake. The lock is released while parked.
   fn park_while<F>(
      cond: &Condvar,
      state: &mut MutexGuard<'_, State<T>>,
      wait: Wait,
      blocked: F,
   ) -> Result<(), Stop>
   where
      F: Fn(&State<T>) -> bool,
   {
      let deadline = wait.deadline();
      while blocked(&**state) {
         match deadline {
            Deadline::Now   => return Err(Stop::WouldBlock),
            Deadline::Never => cond.wait(state),
            Deadline::At(at) => {
               if cond.wait_until(state, at).timed_out() && blocked(&**state) {
                  return Err(Stop::TimedOut);
               }
            }
         }
      }
      Ok(())
   }
}

/*──────────────────────────── clone-based operations ──────────────────────*/

impl<T: Clone> BoundedBlockingQueue<T> {
   /// Return a copy of the front item without removing it.
   pub fn peek(&self, wait: Wait) -> Result<T, RecvError> {
      let mut state = self.state.lock();
      Self::park_while(&self.not_empty, &mut state, wait, |s| s.items.is_empty() && !s.closed)
         .map_err(Stop::into_recv_error)?;

      let item = state.items.front().cloned().ok_or(RecvError::Closed)?;
      // the item is still queued: pass the wakeup on in case a taker is parked
      self.not_empty.notify_one();
      Ok(item)
   }

   pub fn blocking_peek(&self) -> Result<T, RecvError> {
      self.peek(Wait::Forever)
   }

   pub fn try_peek(&self) -> Result<T, RecvError> {
      self.peek(Wait::Never)
   }

   pub fn peek_timeout(&self, timeout: std::time::Duration) -> Result<T, RecvError> {
      self.peek(Wait::For(timeout))
   }

   /// Replace this queue's contents with a copy of `other`'s.
   ///
   /// Both locks are held for the copy, taken in a fixed order so that
   /// concurrent `a.assign_from(&b)` and `b.assign_from(&a)` cannot deadlock.
   /// Assigning a queue to itself does nothing.
   pub fn assign_from(&self, other: &BoundedBlockingQueue<T>) {
      let Some((mut state, source)) = lock_pair(&self.state, &other.state) else {
         return;
      };
      state.items = source.items.clone();
      drop(source);
      state.trim_to_bound();
      tracing::debug!(len = state.items.len(), "queue contents copied");
      self.wake_all_after_replace(&state);
   }
}

impl<T: Clone> Clone for BoundedBlockingQueue<T> {
   /// Copies the items and configuration. The copy starts open with a zero
   /// eviction count.
   fn clone(&self) -> Self {
      let source = self.state.lock();
      let mut state = State::new(source.config);
      state.items = source.items.clone();
      Self {
         state:     Mutex::new(state),
         not_empty: Condvar::new(),
         not_full:  Condvar::new(),
      }
   }
}

impl<T> Default for BoundedBlockingQueue<T> {
   fn default() -> Self {
      Self::new()
   }
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let state = self.state.lock();
      f.debug_struct("BoundedBlockingQueue")
       .field("len", &state.items.len())
       .field("max_items", &state.config.max_items)
       .field("overflow", &state.config.overflow)
       .field("closed", &state.closed)
       .finish()
   }
}

