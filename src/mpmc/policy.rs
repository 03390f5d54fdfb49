// Queue configuration – overflow policy, capacity bound and wait modes

use crate::mpmc::error::ParsePolicyError;
use std::{
   fmt,
   str::FromStr,
   time::{Duration, Instant},
};

/*──────────────────────────────────────────────────────────────────────────*/
/*  Overflow policy                                                         */
/*──────────────────────────────────────────────────────────────────────────*/

/// What `push` does when the queue already holds `max_items` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverflowPolicy {
   /// Evict the oldest unread item, then append. Newest wins.
   #[default]
   DropOldest,
   /// Wait for a consumer to make room.
   Block,
   /// Hand the item back with `PushError::Full`.
   Reject,
}

impl OverflowPolicy {
   pub const fn as_str(self) -> &'static str {
      match self {
         OverflowPolicy::DropOldest => "drop-oldest",
         OverflowPolicy::Block      => "block",
         OverflowPolicy::Reject     => "reject",
      }
   }
}

impl fmt::Display for OverflowPolicy {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

impl FromStr for OverflowPolicy {
   type Err = ParsePolicyError;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.trim().to_ascii_lowercase().as_str() {
         "drop-oldest" | "drop_oldest" | "dropoldest" => Ok(OverflowPolicy::DropOldest),
         "block"                                      => Ok(OverflowPolicy::Block),
         "reject"                                     => Ok(OverflowPolicy::Reject),
         _ => Err(ParsePolicyError { input: s.to_owned() }),
      }
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Configuration                                                           */
/*──────────────────────────────────────────────────────────────────────────*/

/// Construction-time settings. `max_items == 0` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueConfig {
   pub max_items: usize,
   pub overflow: OverflowPolicy,
}

impl QueueConfig {
   pub fn with_max_items(mut self, max_items: usize) -> Self {
      self.max_items = max_items;
      self
   }

   pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
      self.overflow = overflow;
      self
   }

   #[inline]
   pub fn is_bounded(&self) -> bool {
      self.max_items > 0
   }
}

/*──────────────────────────────────────────────────────────────────────────*/
/*  Wait modes                                                              */
/*──────────────────────────────────────────────────────────────────────────*/

/// How long a `take`, `peek` or blocking `push` may park the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
   /// Poll once and return immediately.
   Never,
   /// Park until the operation can complete or the queue is closed.
   Forever,
   /// Park for at most this long.
   For(Duration),
   /// Park until this instant at the latest.
   Until(Instant),
}

/// A `Wait` resolved against the clock at call entry.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Deadline {
   Now,
   Never,
   At(Instant),
}

impl Wait {
   pub(crate) fn deadline(self) -> Deadline {
      match self {
         Wait::Never    => Deadline::Now,
         Wait::Forever  => Deadline::Never,
         // a timeout too large to represent is as good as no timeout
         Wait::For(d)   => Instant::now().checked_add(d).map_or(Deadline::Never, Deadline::At),
         Wait::Until(t) => Deadline::At(t),
      }
   }
}
