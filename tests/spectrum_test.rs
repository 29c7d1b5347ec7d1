//! Spectral validation: renders an operator through a plain sine (standing
//! in for the excluded waveform stage) and checks that the dominant FFT
//! peak lands on the frequency programmed into the registers.

use std::f64::consts::TAU;

use num_complex::Complex;
use rustfft::FftPlanner;

use ymfop::{Operator, OperatorPatch, SAMPLE_RATE};

const FFT_SIZE: usize = 8192;

/// Renders `n` samples of a held note, discarding the attack transient.
fn render_steady_tone(fnum: u32, block: u32, mult: u8, dt: u8, n: usize) -> Vec<f64> {
    let mut op = Operator::new();
    op.apply_patch(&OperatorPatch {
        mult,
        dt,
        ar: 15,
        dr: 0,
        sl: 0,
        sr: 0,
        ..OperatorPatch::default()
    })
    .unwrap();
    op.set_frequency(fnum, block).unwrap();
    op.key_on();

    // Let the attack finish before capturing.
    for _ in 0..256 {
        op.tick(0, 0, 0.0);
    }

    (0..n)
        .map(|_| {
            let out = op.tick(0, 0, 0.0);
            (out.phase * TAU).sin() * out.envelope
        })
        .collect()
}

/// Frequency of the strongest FFT bin, refined to the bin center.
fn dominant_frequency(samples: &[f64]) -> f64 {
    let mut buf: Vec<Complex<f64>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            // Hann window against leakage.
            let w = 0.5 - 0.5 * (TAU * i as f64 / (samples.len() - 1) as f64).cos();
            Complex::new(s * w, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(buf.len()).process(&mut buf);

    let (peak_bin, _) = buf[1..buf.len() / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm()))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap();

    peak_bin as f64 * SAMPLE_RATE / samples.len() as f64
}

#[test]
fn spectral_peak_matches_programmed_frequency() {
    let bin_width = SAMPLE_RATE / FFT_SIZE as f64;
    let cases = [
        ((512, 6, 2, 0), 750.0),
        ((512, 5, 1, 0), 187.5),
        ((256, 5, 4, 0), 375.0),
        ((512, 6, 0, 0), 187.5), // MULT 0 halves the base 375 Hz
    ];

    for ((fnum, block, mult, dt), expected) in cases {
        let samples = render_steady_tone(fnum, block, mult, dt, FFT_SIZE);
        let peak = dominant_frequency(&samples);
        assert!(
            (peak - expected).abs() <= bin_width,
            "fnum={fnum} block={block} mult={mult}: expected {expected} Hz, peak at {peak} Hz"
        );
    }
}

#[test]
fn envelope_holds_the_tone_at_full_level() {
    let samples = render_steady_tone(512, 6, 2, 0, FFT_SIZE);
    let peak = samples.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
    assert!(
        0.99 < peak && peak <= 1.0,
        "held note should sit at 0 dB, peak {peak}"
    );
}