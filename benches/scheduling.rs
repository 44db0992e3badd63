//! Benchmarks for the Round Robin replay and the lifecycle loop.
//!
//! # Benchmark Groups
//!
//! - **round_robin**: `schedule_jobs` over growing process counts with a
//!   fixed burst mix. Throughput is reported in dispatched slices.
//! - **lifecycle/no_table**: the lifecycle loop with a table that discards
//!   every save, isolating dispatch, I/O draws, and unblock draws.
//! - **lifecycle/file_table**: the same loop writing the table to disk after
//!   every mutation.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench scheduling
//! cargo bench --bench scheduling -- lifecycle
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sched_sim::{
    FileTable, LifecycleSimulator, NullDisplay, PersistError, Pid, ProcessRecord, ProcessTable,
    RoundRobinScheduler, RrJob, SimConfig,
};

/// Accepts and forgets every snapshot.
struct DiscardTable;

impl ProcessTable for DiscardTable {
    fn save(&self, _snapshot: &[ProcessRecord]) -> Result<(), PersistError> {
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ProcessRecord>, PersistError> {
        Ok(Vec::new())
    }
}

fn jobs(n: u32) -> Vec<RrJob> {
    (0..n)
        .map(|i| RrJob {
            pid: Pid::new(i),
            burst: 50 + u64::from(i % 7) * 40,
        })
        .collect()
}

fn bench_round_robin(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_robin");
    let quantum = 10;
    for n in [4u32, 64, 1024] {
        let jobs = jobs(n);
        let slices = RoundRobinScheduler::schedule_jobs(&jobs, quantum)
            .map(|r| r.slices.len() as u64)
            .unwrap_or(0);
        group.throughput(Throughput::Elements(slices));
        group.bench_with_input(BenchmarkId::from_parameter(n), &jobs, |b, jobs| {
            b.iter(|| RoundRobinScheduler::schedule_jobs(black_box(jobs), quantum))
        });
    }
    group.finish();
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.sample_size(20);

    let cfg = SimConfig::default();
    let cycles: u64 = cfg.workloads.iter().sum();
    group.throughput(Throughput::Elements(cycles));
    group.bench_function("no_table/default", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            LifecycleSimulator::seeded(cfg.clone(), DiscardTable, seed)
                .and_then(|sim| sim.run(&mut NullDisplay))
                .map(|report| black_box(report.rounds))
        })
    });

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("process_table.txt");
    let small = SimConfig::with_workloads(50, vec![400, 200, 300, 100]);
    let cycles: u64 = small.workloads.iter().sum();
    group.throughput(Throughput::Elements(cycles));
    group.bench_function("file_table/small", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            LifecycleSimulator::seeded(small.clone(), FileTable::new(&path), seed)
                .and_then(|sim| sim.run(&mut NullDisplay))
                .map(|report| black_box(report.rounds))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_round_robin, bench_lifecycle);
criterion_main!(benches);
