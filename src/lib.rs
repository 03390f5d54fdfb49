pub mod console;
pub mod mpmc;

pub use console::{ConsoleSink, LineSink, TracingSink};
pub use mpmc::BoundedBlockingQueue;
pub use mpmc::{OverflowPolicy, QueueConfig, Wait};
pub use mpmc::{ParsePolicyError, PushError, RecvError};
