mod blocking;
mod error;
mod lock_pair;
mod policy;

pub use blocking::BoundedBlockingQueue;
pub use error::{ParsePolicyError, PushError, RecvError};
pub use policy::{OverflowPolicy, QueueConfig, Wait};
