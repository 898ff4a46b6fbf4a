//! Benchmarks for waveform block generation.

use std::hint::black_box;

use beep::{SynthState, Waveform};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        for waveform in Waveform::ALL {
            let mut state = SynthState::with_block_size(440.0, 0.03, size);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    state.generate(black_box(waveform));
                    black_box(state.buffer());
                })
            });
        }
    }

    group.finish();
}
