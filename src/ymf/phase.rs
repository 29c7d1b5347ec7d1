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

//! Per-operator phase generator.
//!
//! Keeps the oscillator's instantaneous phase in a 64-bit fixed-point
//! accumulator where one full turn of `u64` is one waveform cycle. The
//! per-sample increment is derived from the register-level frequency
//! parameters and only changes when they do; the accumulator itself wraps
//! silently and is reset only by key-on.

use crate::ymf::data;
use crate::ymf::error::{check_range, InvalidParameter};
use crate::SAMPLE_RATE;

/// Phase generator for one FM operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseGenerator {
    evb: bool,
    dvb: u8,
    phase_frac64: u64,
    phase_increment_frac64: u64,
}

impl PhaseGenerator {
    /// Creates a generator with no frequency programmed yet.
    pub fn new() -> Self {
        Self {
            evb: false,
            dvb: 0,
            phase_frac64: 0,
            phase_increment_frac64: 0,
        }
    }

    /// Programs the per-sample phase increment from register parameters.
    ///
    /// `fnum` is the 10-bit frequency number, `block` the 3-bit octave,
    /// `mult` the multiplier index (0 selects the hardware's x0.5 case) and
    /// `dt` the detune row. The accumulated phase is left untouched, so the
    /// frequency of a sounding note can be bent mid-note without a click.
    pub fn set_frequency(
        &mut self,
        fnum: u32,
        block: u32,
        mult: u32,
        dt: u32,
    ) -> Result<(), InvalidParameter> {
        check_range("fnum", fnum, 1023)?;
        check_range("block", block, 7)?;
        check_range("mult", mult, 15)?;
        check_range("dt", dt, 7)?;

        let base_frequency = ((fnum as u64) << block) as f64 / (16.0 * data::FNUM_COEF);

        let ksn = ((block << 1) | (fnum >> 9)) as usize;
        let operator_frequency = base_frequency + data::DT_COEF[dt as usize][ksn];

        // Truncate to the fixed-point increment before applying MULT;
        // multiplying first would let paired operators drift apart.
        let increment = (operator_frequency / SAMPLE_RATE * data::POW64_OF_2) as u64;
        self.phase_increment_frac64 = increment.wrapping_mul(data::MULT2[mult as usize]) >> 1;
        Ok(())
    }

    /// Enables vibrato and selects its depth row.
    pub fn set_vibrato(&mut self, evb: bool, dvb: u8) -> Result<(), InvalidParameter> {
        check_range("dvb", dvb as u32, 3)?;
        self.evb = evb;
        self.dvb = dvb;
        Ok(())
    }

    /// Restarts the waveform cycle: the next [`get_phase`](Self::get_phase)
    /// call observes phase 0.
    pub fn key_on(&mut self) {
        self.phase_frac64 = 0;
    }

    /// Produces this sample's phase and advances time by one sample.
    ///
    /// Returns the pre-advance phase as a fraction of one cycle in `[0, 1)`,
    /// with `phase_mod` (an FM modulation or feedback input, also in cycles)
    /// folded in. `vibrato_index` is the shared LFO position; it is only
    /// consulted while vibrato is enabled. Calling this once per output
    /// sample is the only way time advances for the generator.
    pub fn get_phase(&mut self, vibrato_index: usize, phase_mod: f64) -> f64 {
        let current = self.phase_frac64;

        let step = if self.evb {
            let ratio =
                data::VIBRATO_TABLE[self.dvb as usize][vibrato_index & data::MOD_TABLE_MASK];
            (self.phase_increment_frac64 >> 32).wrapping_mul(ratio)
        } else {
            self.phase_increment_frac64
        };
        self.phase_frac64 = self.phase_frac64.wrapping_add(step);

        (current as f64 / data::POW64_OF_2 + phase_mod).rem_euclid(1.0)
    }
}

impl Default for PhaseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_parameters() {
        let mut pg = PhaseGenerator::new();
        assert!(pg.set_frequency(1024, 0, 1, 0).is_err());
        assert!(pg.set_frequency(0, 8, 1, 0).is_err());
        assert!(pg.set_frequency(0, 0, 16, 0).is_err());
        assert!(pg.set_frequency(0, 0, 1, 8).is_err());
        assert!(pg.set_vibrato(true, 4).is_err());
    }

    #[test]
    fn failed_setter_leaves_state_unchanged() {
        let mut pg = PhaseGenerator::new();
        pg.set_frequency(512, 4, 2, 1).unwrap();
        let before = pg.clone();
        assert!(pg.set_frequency(512, 9, 2, 1).is_err());
        assert_eq!(pg, before);
    }

    #[test]
    fn mult_zero_halves_the_frequency() {
        let mut half = PhaseGenerator::new();
        let mut unity = PhaseGenerator::new();
        half.set_frequency(512, 4, 0, 0).unwrap();
        unity.set_frequency(512, 4, 1, 0).unwrap();
        assert_eq!(half.phase_increment_frac64 * 2, unity.phase_increment_frac64);
    }

    #[test]
    fn phase_mod_wraps_into_unit_interval() {
        let mut pg = PhaseGenerator::new();
        pg.key_on();
        let p = pg.get_phase(0, -0.25);
        assert!((p - 0.75).abs() < 1e-12);
        let p = pg.get_phase(0, 3.5);
        assert!(0.0 <= p && p < 1.0);
    }
}
