//! # GR-01 Job Queue Benchmarks
//!
//! - Submit + drain of trivial jobs with mixed priorities
//! - Self-chaining jobs (the only way periodic work exists)

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use gr_01_job_queue::{Job, JobContext, JobError, JobQueue, JobSubmitter, ManualClock};
use std::sync::Arc;
use std::time::Duration;

struct Noop(i32);

impl Job for Noop {
    fn name(&self) -> &str {
        "noop"
    }

    fn priority(&self) -> i32 {
        self.0
    }

    fn run(self: Box<Self>, _ctx: &JobContext) -> Result<(), JobError> {
        black_box(self.0);
        Ok(())
    }
}

struct Chain(u32);

impl Job for Chain {
    fn name(&self) -> &str {
        "chain"
    }

    fn run(self: Box<Self>, ctx: &JobContext) -> Result<(), JobError> {
        if self.0 > 0 {
            ctx.submit(Box::new(Chain(self.0 - 1)));
        }
        Ok(())
    }
}

pub fn bench_submit_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("gr-01/submit_and_drain");
    group.measurement_time(Duration::from_secs(5));

    for count in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let queue = JobQueue::new(Arc::new(ManualClock::new(0)));
                for i in 0..count {
                    queue.submit(Box::new(Noop((i % 7) as i32)));
                }
                black_box(queue.run_ready())
            })
        });
    }

    group.finish();
}

pub fn bench_job_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("gr-01/job_chain");

    for depth in [10u32, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let queue = JobQueue::new(Arc::new(ManualClock::new(0)));
                queue.submit(Box::new(Chain(depth)));
                black_box(queue.run_ready())
            })
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_submit_and_drain(c);
    bench_job_chain(c);
}
