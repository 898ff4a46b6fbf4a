//! Render a one second tone of each waveform into a `Vec` sink.

use std::hint::black_box;

use beep::{play, ToneSettings, Waveform, SAMPLE_RATE};
use criterion::{BenchmarkId, Criterion};

pub fn bench_tone(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/tone");
    let mut sink: Vec<f32> = Vec::with_capacity(SAMPLE_RATE as usize);

    for waveform in Waveform::ALL {
        let settings = ToneSettings::new().waveform(waveform);
        group.bench_with_input(
            BenchmarkId::new("one_second", waveform),
            &settings,
            |b, settings| {
                b.iter(|| {
                    sink.clear();
                    black_box(play(black_box(settings), &mut sink).unwrap());
                })
            },
        );
    }

    group.finish();
}
