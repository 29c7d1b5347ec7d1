// Copyright 2026 YMFOP Contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.
//
// See http://creativecommons.org/licenses/MIT/ for more information.

//! Coefficient tables measured from YMF-family silicon.
//!
//! The detune, key-scale and decay-speed tables are nonlinear hardware data
//! and are stored literally; fitting closed-form curves to them would lose
//! exactness against the reference measurements. Tables that the hardware
//! documentation *does* define by formula (KSL attenuation, LFO shapes,
//! attack timing) are generated once at first use from those formulas.

use std::sync::LazyLock;

use crate::SAMPLE_RATE;

/// Conversion constant between frequency in Hz and fnum units.
pub const FNUM_COEF: f64 = (1u64 << 19) as f64 / SAMPLE_RATE * 0.5;

/// 2^32 as a float, for 32.32 fixed-point conversions.
pub const POW32_OF_2: f64 = 4294967296.0;

/// 2^64 as a float, one full turn of the phase accumulator.
pub const POW64_OF_2: f64 = 18446744073709551616.0;

/// Length of the vibrato/tremolo modulation tables (one LFO cycle).
pub const MOD_TABLE_LEN: usize = 8192;

/// Index mask for the modulation tables.
pub const MOD_TABLE_MASK: usize = MOD_TABLE_LEN - 1;

/// Frequency offset in Hz added by the DT parameter, indexed by
/// `[dt][key_scale_number]`.
///
/// Rows 1-3 are the positive detunes, 5-7 their mirror images; rows 0 and 4
/// are zero. The steps are not linear in the key-scale number and must stay
/// table-driven.
pub const DT_COEF: [[f64; 16]; 8] = [
    [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
    [0.00, 0.00, 0.05, 0.05, 0.05, 0.05, 0.09, 0.09, 0.14, 0.14, 0.18, 0.23, 0.27, 0.32, 0.37, 0.37],
    [0.05, 0.05, 0.09, 0.09, 0.14, 0.14, 0.18, 0.23, 0.27, 0.32, 0.41, 0.46, 0.59, 0.64, 0.73, 0.73],
    [0.09, 0.09, 0.14, 0.14, 0.18, 0.23, 0.28, 0.32, 0.41, 0.46, 0.59, 0.64, 0.87, 0.91, 1.00, 1.00],
    [0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00, 0.00],
    [-0.00, -0.00, -0.05, -0.05, -0.05, -0.05, -0.09, -0.09, -0.14, -0.14, -0.18, -0.23, -0.27, -0.32, -0.37, -0.37],
    [-0.05, -0.05, -0.09, -0.09, -0.14, -0.14, -0.18, -0.23, -0.27, -0.32, -0.41, -0.46, -0.59, -0.64, -0.73, -0.73],
    [-0.09, -0.09, -0.14, -0.14, -0.18, -0.23, -0.28, -0.32, -0.41, -0.46, -0.59, -0.64, -0.87, -0.91, -1.00, -1.00],
];

/// Frequency multiplier selected by the MULT parameter, stored doubled so
/// that index 0 can express the hardware's x0.5 case; the phase generator
/// halves the product after applying it.
pub const MULT2: [u64; 16] = [1, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 20, 24, 24, 30, 30];

/// Amplitude coefficient applied to the signal fed back into an operator's
/// own phase input, indexed by the FB parameter.
pub const FEEDBACK_TABLE: [f64; 8] = [0.0, 1.0 / 32.0, 1.0 / 16.0, 1.0 / 8.0, 1.0 / 4.0, 1.0 / 2.0, 1.0, 2.0];

/// Additive envelope-rate boost, indexed by `[ksr][key_scale_number]`.
pub const RATE_OFFSET: [[u8; 16]; 2] = [
    [0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
];

/// Measured decay speed in amplitude dB/sec at DR/SR/RR = 4, indexed by
/// `[ksr][key_scale_number]`.
///
/// Halve before use to convert to energy dB; each +1 on the rate parameter
/// doubles the speed.
pub const DECAY_DB_PER_SEC_AT4: [[f64; 16]; 2] = [
    [
        17.9342, 17.9342, 17.9342, 17.9342, 17.9342, 22.4116, 22.4116, 22.4116,
        22.4116, 26.9076, 26.9076, 26.9076, 26.9076, 31.3661, 31.3661, 31.3661,
    ],
    [
        17.9465, 22.4376, 22.4376, 31.4026, 31.4026, 44.8696, 44.8696, 62.7959,
        62.7959, 89.6707, 89.6707, 125.5546, 125.5546, 179.2684, 179.2684, 250.9128,
    ],
];

/// Per-sample linear-level increment of the attack stage, indexed by the
/// actual (key-scale-adjusted) rate 0-63.
///
/// Actual rate 0 never advances; the remaining entries follow the chip's
/// attack period of `1.75 * 0.5^(rate/4 - 1)` seconds.
pub static ATTACK_DIFF_PER_SAMPLE: LazyLock<[f64; 64]> = LazyLock::new(|| {
    let mut table = [0.0; 64];
    for (rate, diff) in table.iter_mut().enumerate().skip(1) {
        let sec = 1.75 * 0.5_f64.powf(rate as f64 / 4.0 - 1.0);
        *diff = 1.0 / (sec * SAMPLE_RATE);
    }
    table
});

/// Key-scale-level amplitude coefficient, indexed by
/// `[ksl][block][fnum >> 5]`.
///
/// KSL 1/2/3 attenuate by roughly 3/1.5/6 dB per octave above block 2; the
/// coefficient is 1.0 (no attenuation) below that.
pub static KSL_TABLE: LazyLock<Box<[[[f64; 32]; 8]; 4]>> = LazyLock::new(|| {
    let bases = [0.0, 0.08, 1.0 / 15.0, 1.0 / 15.0];
    let block_coefs = [0.0, 3.0, 1.5, 6.01];
    let fnum5_coefs = [0.0, 0.38, 0.185, 0.75];

    let mut table = Box::new([[[0.0; 32]; 8]; 4]);
    for ksl in 0..4 {
        for block in 0..8 {
            for fnum5 in 0..32 {
                let fnum5_lim = fnum5.min(15);
                let mut db = bases[ksl]
                    - block_coefs[ksl] * (block as f64 - 2.0)
                    - fnum5_coefs[ksl] * (fnum5_lim as f64 - 7.0);
                if block < 2 || 0.0 <= db {
                    db = 0.0;
                }
                table[ksl][block][fnum5] = 10.0_f64.powf(db / 20.0);
            }
        }
    }
    table
});

/// Frequency ratio applied by vibrato, as 32.32 fixed point, indexed by
/// `[dvb][lfo_index]`.
///
/// Depths follow the YMF825 datasheet: 3.4 / 6.7 / 13.5 / 26.8 cents of
/// triangular pitch wobble.
pub static VIBRATO_TABLE: LazyLock<Box<[[u64; MOD_TABLE_LEN]; 4]>> = LazyLock::new(|| {
    let depth_cents = [3.4, 6.7, 13.5, 26.8];

    let mut table = Box::new([[0u64; MOD_TABLE_LEN]; 4]);
    for (dvb, row) in table.iter_mut().enumerate() {
        for (i, entry) in row.iter_mut().enumerate() {
            let phase = i as f64 / MOD_TABLE_LEN as f64;
            let cent = tri_sin(phase) * depth_cents[dvb];
            let ratio = 2.0_f64.powf(cent / 1200.0);
            *entry = (ratio * POW32_OF_2) as u64;
        }
    }
    table
});

/// Amplitude coefficient applied by tremolo, indexed by `[dam][lfo_index]`.
///
/// Depths follow the YMF825 datasheet: 1.3 / 2.8 / 5.8 / 11.8 dB of
/// triangular dip below unity.
pub static TREMOLO_TABLE: LazyLock<Box<[[f64; MOD_TABLE_LEN]; 4]>> = LazyLock::new(|| {
    let depth_db = [1.3, 2.8, 5.8, 11.8];

    let mut table = Box::new([[0.0; MOD_TABLE_LEN]; 4]);
    for (dam, row) in table.iter_mut().enumerate() {
        for (i, entry) in row.iter_mut().enumerate() {
            let phase = i as f64 / MOD_TABLE_LEN as f64;
            let db = (tri_cos(phase) - 1.0) * 0.5 * depth_db[dam];
            *entry = 10.0_f64.powf(db / 20.0);
        }
    }
    table
});

/// Triangle approximation of sin(2*pi*phase) for phase in [0, 1).
fn tri_sin(phase: f64) -> f64 {
    let phase = phase * 4.0;
    if phase < 1.0 {
        phase
    } else if phase < 3.0 {
        2.0 - phase
    } else {
        phase - 4.0
    }
}

/// Triangle approximation of cos(2*pi*phase) for phase in [0, 1).
fn tri_cos(phase: f64) -> f64 {
    let phase = phase * 4.0;
    if phase < 2.0 {
        1.0 - phase
    } else {
        phase - 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detune_rows_mirror() {
        for ksn in 0..16 {
            assert_eq!(DT_COEF[0][ksn], 0.0);
            assert_eq!(DT_COEF[4][ksn], 0.0);
            for dt in 1..4 {
                assert_eq!(DT_COEF[dt][ksn], -DT_COEF[dt + 4][ksn]);
            }
        }
    }

    #[test]
    fn attack_diff_doubles_every_four_rates() {
        assert_eq!(ATTACK_DIFF_PER_SAMPLE[0], 0.0);
        for rate in 1..60 {
            let ratio = ATTACK_DIFF_PER_SAMPLE[rate + 4] / ATTACK_DIFF_PER_SAMPLE[rate];
            assert!((ratio - 2.0).abs() < 1e-9, "rate {rate}: ratio {ratio}");
        }
    }

    #[test]
    fn ksl_is_transparent_below_block_two() {
        for ksl in 0..4 {
            for block in 0..2 {
                for fnum5 in 0..32 {
                    assert_eq!(KSL_TABLE[ksl][block][fnum5], 1.0);
                }
            }
        }
        // KSL 0 never attenuates anywhere.
        for block in 0..8 {
            for fnum5 in 0..32 {
                assert_eq!(KSL_TABLE[0][block][fnum5], 1.0);
            }
        }
    }

    #[test]
    fn vibrato_is_unity_at_lfo_zero_crossings() {
        for dvb in 0..4 {
            assert_eq!(VIBRATO_TABLE[dvb][0], POW32_OF_2 as u64);
            assert_eq!(VIBRATO_TABLE[dvb][MOD_TABLE_LEN / 2], POW32_OF_2 as u64);
        }
    }

    #[test]
    fn tremolo_never_amplifies() {
        for dam in 0..4 {
            for i in 0..MOD_TABLE_LEN {
                let v = TREMOLO_TABLE[dam][i];
                assert!(0.0 < v && v <= 1.0, "dam {dam} index {i}: {v}");
            }
        }
    }
}
