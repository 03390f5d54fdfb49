// Two-phase acquisition of two distinct mutexes.
//
// Locks are always taken lowest address first, so two threads running
// `a.assign_from(&b)` and `b.assign_from(&a)` at the same time queue up on
// the same first mutex instead of each holding one and waiting for the other.

use parking_lot::{Mutex, MutexGuard};

/// Lock `first` and `second` in canonical order and return the guards in
/// argument order.
///
/// Returns `None` when both arguments are the same mutex; locking it twice
/// would self-deadlock.
pub(crate) fn lock_pair<'a, T>(
   first: &'a Mutex<T>,
   second: &'a Mutex<T>,
) -> Option<(MutexGuard<'a, T>, MutexGuard<'a, T>)> {
   let a = first as *const Mutex<T> as usize;
   let b = second as *const Mutex<T> as usize;

   if a == b {
      return None;
   }

   if a < b {
      let g1 = first.lock();
      let g2 = second.lock();
      Some((g1, g2))
   } else {
      let g2 = second.lock();
      let g1 = first.lock();
      Some((g1, g2))
   }
}
