//! # Garlic Router Kernel Benchmarks
//!
//! | Subsystem | Concern |
//! |-----------|---------|
//! | gr-01 Job Queue | submit/drain throughput, chained jobs |
//! | gr-02 Garlic Dispatch | sealed build latency vs. the 1 s slow-build mark |

use criterion::{criterion_group, criterion_main, Criterion};
use gr_tests::benchmarks::{gr_01_job_queue, gr_02_garlic_dispatch};

fn job_queue(c: &mut Criterion) {
    gr_01_job_queue::register_benchmarks(c);
}

fn garlic_dispatch(c: &mut Criterion) {
    gr_02_garlic_dispatch::register_benchmarks(c);
}

criterion_group!(benches, job_queue, garlic_dispatch);
criterion_main!(benches);
