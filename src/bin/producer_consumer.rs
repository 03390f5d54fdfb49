// Producer/consumer demo: N producers push a shared counter, M consumers
// block on `take`. Runs until SIGINT/SIGTERM or `--run-for-secs` elapses,
// then closes the queue and joins every worker.

use anyhow::{anyhow, Context, Result};
use blocking_queue::{
   sync_println, BoundedBlockingQueue, ConsoleSink, LineSink, OverflowPolicy, QueueConfig,
};
use clap::Parser;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::{
   sync::atomic::{AtomicBool, AtomicU64, Ordering},
   thread,
   time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SUPERVISOR_TICK: Duration = Duration::from_millis(50);

static STOP: AtomicBool = AtomicBool::new(false);

#[derive(Parser, Debug)]
#[command(name = "producer_consumer", version, about = "Bounded blocking queue demo")]
struct Args {
   /// Number of producer threads
   #[arg(long, env = "PC_PRODUCERS", default_value_t = 1)]
   producers: usize,

   /// Number of consumer threads
   #[arg(long, env = "PC_CONSUMERS", default_value_t = 4)]
   consumers: usize,

   /// Capacity bound, 0 for unbounded
   #[arg(long, env = "PC_MAX_ITEMS", default_value_t = 10)]
   max_items: usize,

   /// drop-oldest, block or reject
   #[arg(long, env = "PC_OVERFLOW", default_value_t = OverflowPolicy::DropOldest)]
   overflow: OverflowPolicy,

   #[arg(long, env = "PC_PRODUCE_INTERVAL_MS", default_value_t = 100)]
   produce_interval_ms: u64,

   #[arg(long, env = "PC_CONSUME_INTERVAL_MS", default_value_t = 1000)]
   consume_interval_ms: u64,

   /// Stop after this many seconds instead of waiting for a signal
   #[arg(long, env = "PC_RUN_FOR_SECS")]
   run_for_secs: Option<u64>,
}

extern "C" fn request_stop(_signal: libc::c_int) {
   STOP.store(true, Ordering::Release);
}

fn install_stop_handler() -> Result<()> {
   let action = SigAction::new(SigHandler::Handler(request_stop), SaFlags::SA_RESTART, SigSet::empty());
   for signal in [Signal::SIGINT, Signal::SIGTERM] {
      // the handler only stores to an atomic, which is async-signal-safe
      unsafe { sigaction(signal, &action) }.with_context(|| format!("installing {signal:?} handler"))?;
   }
   Ok(())
}

fn init_tracing() {
   let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
   tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt::layer().with_writer(std::io::stderr))
      .init();
}

fn producer<S: LineSink>(
   id: usize,
   queue: &BoundedBlockingQueue<u64>,
   counter: &AtomicU64,
   console: &S,
   interval: Duration,
) {
   // a refused item is retried before a new counter value is drawn
   let mut pending = None;
   loop {
      let item = pending.take().unwrap_or_else(|| counter.fetch_add(1, Ordering::Relaxed) + 1);
      match queue.push(item) {
         Ok(()) => {}
         Err(e) if e.is_closed() => break,
         Err(e) => {
            warn!(producer = id, item, error = %e, "push refused, retrying");
            pending = Some(e.into_inner());
            thread::sleep(interval);
            continue;
         }
      }
      let size = queue.len();
      if let Err(e) = sync_println!(console, "Producer [", id, "] pushed item [", item, "] - Queue Size [", size, "]") {
         warn!(error = %e, "console write failed");
      }
      thread::sleep(interval);
   }
   info!(producer = id, "producer stopped");
}

fn consumer<S: LineSink>(id: usize, queue: &BoundedBlockingQueue<u64>, console: &S, interval: Duration) {
   loop {
      // an unbounded wait only fails once the queue is closed and drained
      let Ok(item) = queue.blocking_take() else {
         break;
      };
      let size = queue.len();
      if let Err(e) = sync_println!(console, "Consumer [", id, "] popped item [", item, "] - Queue Size [", size, "]") {
         warn!(error = %e, "console write failed");
      }
      thread::sleep(interval);
   }
   info!(consumer = id, "consumer stopped");
}

fn main() -> Result<()> {
   init_tracing();
   let args = Args::parse();
   install_stop_handler()?;

   let config = QueueConfig::default()
      .with_max_items(args.max_items)
      .with_overflow(args.overflow);
   let queue = BoundedBlockingQueue::<u64>::with_config(config);
   let counter = AtomicU64::new(0);
   let console = ConsoleSink::stdout();
   let produce_interval = Duration::from_millis(args.produce_interval_ms);
   let consume_interval = Duration::from_millis(args.consume_interval_ms);
   let deadline = args.run_for_secs.map(|secs| Instant::now() + Duration::from_secs(secs));

   info!(
      producers = args.producers,
      consumers = args.consumers,
      max_items = args.max_items,
      overflow = %args.overflow,
      "starting producer/consumer demo"
   );

   crossbeam::scope(|s| {
      let (queue, counter, console) = (&queue, &counter, &console);

      for id in 0..args.producers {
         s.spawn(move |_| producer(id, queue, counter, console, produce_interval));
      }
      for id in 0..args.consumers {
         s.spawn(move |_| consumer(id, queue, console, consume_interval));
      }

      while !STOP.load(Ordering::Acquire) && deadline.map_or(true, |at| Instant::now() < at) {
         thread::sleep(SUPERVISOR_TICK);
      }
      queue.close();
   })
   .map_err(|_| anyhow!("a worker thread panicked"))?;

   info!(
      produced = counter.load(Ordering::Relaxed),
      left_in_queue = queue.len(),
      evicted = queue.evicted(),
      "demo finished"
   );
   Ok(())
}
