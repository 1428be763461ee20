//! # Merge Path Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | rp-03 Selector | one `select` over a block of N records |
//! | rp-01 Registry | conditional merge submission |
//! | shared-crypto | attested merge of two proofs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use rp_01_proof_registry::{InMemoryStatusRegistry, ProofSubmission, StatusRegistry};
use rp_03_proof_merge::{select, SelectionHistory};
use shared_crypto::{
    blake3_hash, AttestedProofSystem, ProofMerger, StateTransition, StateTransitionProver,
};
use shared_types::{BlockProofState, DataHandle, ProofRecord, SequenceRange};

fn singleton_block(n: u64) -> BlockProofState {
    let mut block = BlockProofState::open(1, 1);
    block.end_sequence = Some(n);
    for sequence in 1..=n {
        block.records.push(ProofRecord::calculated(
            SequenceRange::single(sequence),
            DataHandle::new(format!("h{sequence}")),
            0,
        ));
    }
    block
}

fn bench_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("rp-03-selector");
    for size in [16u64, 256, 4096] {
        let block = singleton_block(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("select", size), &block, |b, block| {
            b.iter(|| {
                let mut history = SelectionHistory::new(Duration::from_secs(60));
                black_box(select(block, &mut history, tokio::time::Instant::now()))
            })
        });
    }
    group.finish();
}

fn bench_registry_merge_submission(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    c.bench_function("rp-01-registry/submit_merge", |b| {
        b.iter_batched(
            || {
                let registry = InMemoryStatusRegistry::new([0; 32]);
                registry.open_block(1, 1, [0; 32]).expect("open");
                runtime.block_on(async {
                    for sequence in 1..=2 {
                        registry
                            .submit_proof(ProofSubmission::fresh(
                                1,
                                SequenceRange::single(sequence),
                                DataHandle::new(format!("h{sequence}")),
                            ))
                            .await
                            .expect("seed");
                    }
                });
                registry
            },
            |registry| {
                runtime.block_on(async {
                    black_box(
                        registry
                            .submit_proof(ProofSubmission::merged(
                                1,
                                SequenceRange::new(1, 2).expect("range"),
                                SequenceRange::single(1),
                                SequenceRange::single(2),
                                DataHandle::new("merged"),
                            ))
                            .await
                            .expect("merge"),
                    )
                })
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_attested_merge(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let system = AttestedProofSystem::from_seed([1; 32]);
    let root = |n: u64| blake3_hash(&n.to_le_bytes());

    let (left, right) = runtime.block_on(async {
        let prove = |sequence: u64| StateTransition {
            block_number: 1,
            sequence,
            start_root: root(sequence - 1),
            end_root: root(sequence),
            operation_digest: [0; 32],
        };
        (
            system.prove(&prove(1)).await.expect("prove"),
            system.prove(&prove(2)).await.expect("prove"),
        )
    });

    c.bench_function("shared-crypto/attested_merge", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(system.merge(&left, &right).await.expect("merge"))
            })
        })
    });
}

criterion_group!(
    benches,
    bench_selector,
    bench_registry_merge_submission,
    bench_attested_merge
);
criterion_main!(benches);
