#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/*
Closed-Form Waveforms
=====================

Every shape below is written as a function of `cycles`: how many full periods
have elapsed since sample zero.

    cycles = t * frequency / sample_rate

where `t` is the absolute sample index. Because the caller always derives
`cycles` from the absolute index (never from a running phase accumulator),
a block rendered on its own and the same samples rendered as part of a larger
block are bit-for-bit identical. That is what keeps block boundaries free of
clicks.


The Shapes (one period, volume = 1)
-----------------------------------

  Sine        sin(2π · cycles)

       1 ┤  ╭─╮
       0 ┼─╯   ╰─╮   ╭─
      -1 ┤        ╰─╯

  Square      half-period index k = floor(2 · cycles)
              k odd  →  +1
              k even →  -1
              (k steps at 2 · cycles, so one full cycle per period: the
              played pitch is the requested frequency)

       1 ┤     ┌─────┐
      -1 ┼─────┘     └─

  Saw         2 · frac(cycles) - 1

       1 ┤    ╱│    ╱
      -1 ┼───╱ │───╱

  Triangle    f = 2 · cycles
              floor(f) even →  2 · frac(f) - 1          (rising)
              floor(f) odd  →  2 · (1 - frac(f)) - 1    (falling)

       1 ┤    ╱╲
      -1 ┼───╱  ╲───

Square, saw and triangle all start at -1 on sample zero. The square's duty
cycle is exactly 50%: it flips every sample_rate / (2 · frequency) samples.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Saw,
        Waveform::Triangle,
    ];

    /// Unit-amplitude value of this waveform after `cycles` periods.
    ///
    /// The result is always within `[-1.0, 1.0]` for finite input.
    #[inline]
    pub fn shape(self, cycles: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * cycles).sin(),
            Waveform::Square => {
                let half_period = (2.0 * cycles).floor();
                if is_odd(half_period) {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * frac(cycles) - 1.0,
            Waveform::Triangle => {
                let f = 2.0 * cycles;
                if is_odd(f.floor()) {
                    2.0 * (1.0 - frac(f)) - 1.0
                } else {
                    2.0 * frac(f) - 1.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
        }
    }
}

impl std::fmt::Display for Waveform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fractional part, `x - floor(x)`. Always in `[0, 1)` for finite `x`.
#[inline]
pub fn frac(x: f64) -> f64 {
    x - x.floor()
}

// `rem_euclid` keeps negative indices (negative frequencies) on the same parity
// pattern as positive ones.
#[inline]
fn is_odd(whole: f64) -> bool {
    whole.rem_euclid(2.0) == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frac_stays_in_unit_interval() {
        assert_eq!(frac(0.0), 0.0);
        assert_eq!(frac(3.0), 0.0);
        assert_eq!(frac(2.25), 0.25);
        assert_eq!(frac(-0.25), 0.75);
    }

    #[test]
    fn sine_quarter_points() {
        assert_eq!(Waveform::Sine.shape(0.0), 0.0);
        assert!((Waveform::Sine.shape(0.25) - 1.0).abs() < 1e-12);
        assert!((Waveform::Sine.shape(0.75) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn square_flips_every_half_period() {
        assert_eq!(Waveform::Square.shape(0.0), -1.0);
        assert_eq!(Waveform::Square.shape(0.49), -1.0);
        assert_eq!(Waveform::Square.shape(0.5), 1.0);
        assert_eq!(Waveform::Square.shape(0.99), 1.0);
        assert_eq!(Waveform::Square.shape(1.0), -1.0);
    }

    #[test]
    fn square_negative_phase_keeps_alternating() {
        assert_eq!(Waveform::Square.shape(-0.25), 1.0);
        assert_eq!(Waveform::Square.shape(-0.75), -1.0);
    }

    #[test]
    fn saw_wraps_at_period_boundary() {
        assert_eq!(Waveform::Saw.shape(0.0), -1.0);
        assert_eq!(Waveform::Saw.shape(0.5), 0.0);
        assert_eq!(Waveform::Saw.shape(1.0), -1.0);
        assert_eq!(Waveform::Saw.shape(7.0), -1.0);
    }

    #[test]
    fn triangle_ramps_up_then_down() {
        assert_eq!(Waveform::Triangle.shape(0.0), -1.0);
        assert_eq!(Waveform::Triangle.shape(0.25), 0.0);
        assert_eq!(Waveform::Triangle.shape(0.5), 1.0);
        assert_eq!(Waveform::Triangle.shape(0.75), 0.0);
        assert_eq!(Waveform::Triangle.shape(1.0), -1.0);
    }

    #[test]
    fn every_shape_is_unit_bounded() {
        for waveform in Waveform::ALL {
            for step in -400..400 {
                let value = waveform.shape(step as f64 * 0.0137);
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "{waveform} produced {value}"
                );
            }
        }
    }

    #[test]
    fn display_matches_flag_names() {
        let names: Vec<String> = Waveform::ALL.iter().map(|w| w.to_string()).collect();
        assert_eq!(names, ["sine", "square", "saw", "triangle"]);
        assert_eq!(Waveform::default(), Waveform::Sine);
    }
}
