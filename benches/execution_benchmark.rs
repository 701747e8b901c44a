use codon_vm::batch::run_batch;
use codon_vm::codon::Codon;
use codon_vm::config::{SurfaceConfig, VmConfig};
use codon_vm::lexer::tokenize;
use codon_vm::render::RecordingRenderer;
use codon_vm::vm::VirtualMachine;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

// PUSH r, CIRCLE, PUSH 4, ROTATE, then LOOP replays those four 63 times.
fn ring_program() -> String {
    "ATG GAA AGG GGA GAA ACA AGA GAA ACA GAA TTT TTC TAA".to_string()
}

// Random codon soup; most of these fault early, which is the common case
// when evaluating a mutated population.
fn random_programs(count: usize, codons: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let body: Vec<String> = (0..codons)
                .map(|_| Codon::from_index(rng.random_range(0..64)).to_string())
                .collect();
            format!("ATG {} TAA", body.join(" "))
        })
        .collect()
}

fn benchmark_run(c: &mut Criterion) {
    let source = ring_program();
    let tokens = tokenize(&source).unwrap();

    let mut group = c.benchmark_group("VirtualMachine");
    group.bench_function("tokenize_ring", |b| b.iter(|| tokenize(black_box(&source))));
    group.bench_function("run_ring", |b| {
        let mut vm = VirtualMachine::new(RecordingRenderer::default());
        b.iter(|| {
            let _ = vm.run(black_box(&tokens));
            vm.renderer_mut().take_calls();
        })
    });
    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let programs = random_programs(256, 60);
    let vm = VmConfig::default();
    let surface = SurfaceConfig::default();
    c.bench_function("run_batch_256_random", |b| {
        b.iter(|| run_batch(black_box(&programs), &vm, &surface))
    });
}

criterion_group!(benches, benchmark_run, benchmark_batch);
criterion_main!(benches);
