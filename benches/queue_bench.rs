use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::time::Duration;

use blocking_queue::{BoundedBlockingQueue, OverflowPolicy, QueueConfig};

const ITERS: u64 = 100_000;
const RING_CAP: usize = 1024;

// push then take on one thread, no contention
fn bench_uncontended(c: &mut Criterion) {
   let q = BoundedBlockingQueue::<u64>::new();
   c.bench_function("push+take (uncontended)", |b| {
      b.iter(|| {
         q.push(black_box(1)).unwrap();
         black_box(q.try_take().unwrap());
      })
   });
}

// every push into a full queue evicts the oldest item
fn bench_drop_oldest(c: &mut Criterion) {
   let q = BoundedBlockingQueue::<u64>::with_max_items(RING_CAP);
   for i in 0..RING_CAP as u64 {
      q.push(i).unwrap();
   }
   c.bench_function("push (drop-oldest, full)", |b| {
      b.iter(|| q.push(black_box(7)).unwrap())
   });
}

// N producers, N consumers, ITERS items in total
fn run_mpmc(threads: u64, policy: OverflowPolicy) {
   let q = BoundedBlockingQueue::with_config(
      QueueConfig::default().with_max_items(RING_CAP).with_overflow(policy),
   );
   let per_thread = ITERS / threads;

   crossbeam::scope(|s| {
      let q = &q;
      let consumers: Vec<_> = (0..threads)
         .map(|_| {
            s.spawn(move |_| {
               let mut n = 0u64;
               while q.blocking_take().is_ok() {
                  n += 1;
               }
               n
            })
         })
         .collect();

      let producers: Vec<_> = (0..threads)
         .map(|t| {
            s.spawn(move |_| {
               for i in 0..per_thread {
                  q.push(t * per_thread + i).unwrap();
               }
            })
         })
         .collect();

      for p in producers {
         p.join().unwrap();
      }
      q.close();

      let consumed: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
      if policy == OverflowPolicy::Block {
         assert_eq!(consumed, per_thread * threads);
      }
   })
   .unwrap();
}

fn bench_mpmc(c: &mut Criterion) {
   let mut group = c.benchmark_group("mpmc");
   group.throughput(Throughput::Elements(ITERS));
   for threads in [1u64, 2, 4, 8] {
      for policy in [OverflowPolicy::Block, OverflowPolicy::DropOldest] {
         group.bench_with_input(
            BenchmarkId::new(policy.as_str(), threads),
            &threads,
            |b, &threads| b.iter(|| run_mpmc(threads, policy)),
         );
      }
   }
   group.finish();
}

// Criterion setup
fn custom_criterion() -> Criterion {
   Criterion::default()
      .warm_up_time(Duration::from_secs(3))
      .measurement_time(Duration::from_secs(10))
      .sample_size(50)
}

criterion_group! {
   name = benches;
   config = custom_criterion();
   targets =
      bench_uncontended,
      bench_drop_oldest,
      bench_mpmc
}
criterion_main!(benches);
