use ymfop::{PhaseGenerator, SAMPLE_RATE};

/// Measures the frequency in Hz of a freshly keyed phase generator by
/// observing the phase advance over one sample.
pub fn measure_frequency(fnum: u32, block: u32, mult: u32, dt: u32) -> f64 {
    let mut pg = PhaseGenerator::new();
    pg.set_frequency(fnum, block, mult, dt).unwrap();
    pg.key_on();
    let p0 = pg.get_phase(0, 0.0);
    assert_eq!(p0, 0.0, "key-on must start the cycle at phase 0");
    let p1 = pg.get_phase(0, 0.0);
    (p1 - p0) * SAMPLE_RATE
}

/// Rounds to two decimal places, the resolution of the reference detune
/// measurements.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
