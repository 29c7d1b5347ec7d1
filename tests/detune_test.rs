//! Verifies the detune behavior of the phase generator against the
//! reference measurement matrix: for every multiplier and key-scale number,
//! the frequency delta added by DT must equal the table entry scaled by the
//! multiplier, to two decimal places.

mod common;
use common::{measure_frequency, round2};

use ymfop::ymf::data::DT_COEF;

/// fnum/block pair that produces the given key-scale number, with the fnum
/// top bit carrying ksn bit 0.
fn pitch_for_ksn(ksn: u32) -> (u32, u32) {
    let fnum = (ksn & 1) * 512 + 256;
    let block = ksn >> 1;
    (fnum, block)
}

#[test]
fn detune_delta_is_table_entry_times_mult() {
    for mult in 1..=8u32 {
        for dt in 1..4u32 {
            let mut measured = Vec::with_capacity(16);
            let mut expected = Vec::with_capacity(16);
            for ksn in 0..16u32 {
                let (fnum, block) = pitch_for_ksn(ksn);
                let freq0 = measure_frequency(fnum, block, mult, 0);
                let freq = measure_frequency(fnum, block, mult, dt);
                measured.push(round2(freq - freq0));
                expected.push(round2(DT_COEF[dt as usize][ksn as usize] * mult as f64));
            }
            assert_eq!(measured, expected, "mult={mult} dt={dt}");
        }
    }
}

#[test]
fn negative_detune_rows_mirror_positive_ones() {
    for mult in 1..=8u32 {
        for dt in 5..8u32 {
            for ksn in 0..16u32 {
                let (fnum, block) = pitch_for_ksn(ksn);
                let freq0 = measure_frequency(fnum, block, mult, 0);
                let freq = measure_frequency(fnum, block, mult, dt);
                let expected = round2(DT_COEF[dt as usize - 4][ksn as usize] * -(mult as f64));
                assert_eq!(round2(freq - freq0), expected, "mult={mult} dt={dt} ksn={ksn}");
            }
        }
    }
}

#[test]
fn detune_zero_adds_nothing() {
    for mult in 1..=8u32 {
        for dt in [0u32, 4] {
            for ksn in 0..16u32 {
                let (fnum, block) = pitch_for_ksn(ksn);
                let freq0 = measure_frequency(fnum, block, mult, 0);
                let freq = measure_frequency(fnum, block, mult, dt);
                assert_eq!(freq, freq0, "mult={mult} dt={dt} ksn={ksn}");
            }
        }
    }
}
