use std::fmt;
use thiserror::Error;

/// Why a `take` or `peek` returned without an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
   #[error("queue is empty")]
   Empty,
   #[error("timed out waiting for an item")]
   Timeout,
   #[error("queue is closed and drained")]
   Closed,
}

/// A rejected push. The item is always handed back to the caller.
#[derive(PartialEq, Eq, Error)]
pub enum PushError<T> {
   #[error("queue is full")]
   Full(T),
   #[error("timed out waiting for free space")]
   Timeout(T),
   #[error("queue is closed")]
   Closed(T),
}

impl<T> PushError<T> {
   pub fn into_inner(self) -> T {
      match self {
         PushError::Full(item) | PushError::Timeout(item) | PushError::Closed(item) => item,
      }
   }

   pub fn is_closed(&self) -> bool {
      matches!(self, PushError::Closed(_))
   }
}

// no `T: Debug` bound, payloads are usually opaque
impl<T> fmt::Debug for PushError<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      let name = match self {
         PushError::Full(_)    => "Full",
         PushError::Timeout(_) => "Timeout",
         PushError::Closed(_)  => "Closed",
      };
      f.debug_tuple(name).finish_non_exhaustive()
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown overflow policy `{input}` (expected drop-oldest, block or reject)")]
pub struct ParsePolicyError {
   pub(crate) input: String,
}
