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

//! Per-operator ADSR envelope generator.
//!
//! The envelope level is kept as a linear amplitude in `[0, 1]` (0 is
//! maximum attenuation, 1 is 0 dB). Attack raises it by a fixed per-sample
//! increment taken from the per-rate table; decay, sustain and release
//! multiply it by a per-sample coefficient derived from the measured
//! dB/sec decay-speed table. All key scaling is resolved at setter time so
//! that the per-sample path is a flat branch over the current stage.

use crate::ymf::data;
use crate::ymf::error::{check_range, InvalidParameter};
use crate::SAMPLE_RATE;

/// Level below which a decaying stage is considered silent.
const EPSILON: f64 = 1.0 / 32768.0;

/// Envelope stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Silent; only key-on leaves this stage.
    Off,
    /// Rising toward 0 dB.
    Attack,
    /// Falling toward the sustain level.
    Decay,
    /// Falling at the sustain-phase rate (a hold only when that rate is 0).
    Sustain,
    /// Falling from the key-off level toward silence.
    Release,
}

/// Envelope generator for one FM operator.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeGenerator {
    stage: Stage,
    eam: bool,
    dam: u8,
    actual_ar: u8,
    ar_diff_per_sample: f64,
    dr_coef_per_sample: f64,
    sr_coef_per_sample: f64,
    rr_coef_per_sample: f64,
    ksl_coef: f64,
    tl_coef: f64,
    ksl_tl_coef: f64,
    sustain_level: f64,
    current_level: f64,
}

impl EnvelopeGenerator {
    /// Creates a silent generator with neutral level scaling.
    pub fn new() -> Self {
        Self {
            stage: Stage::Off,
            eam: false,
            dam: 0,
            actual_ar: 0,
            ar_diff_per_sample: 0.0,
            dr_coef_per_sample: 1.0,
            sr_coef_per_sample: 1.0,
            rr_coef_per_sample: 1.0,
            ksl_coef: 1.0,
            tl_coef: 1.0,
            ksl_tl_coef: 1.0,
            sustain_level: 1.0,
            current_level: 0.0,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Sets the attack rate, combined with the key-scale-rate boost into an
    /// actual rate of 0-63. An actual rate of 0 never completes the attack.
    pub fn set_actual_attack_rate(
        &mut self,
        ar: u8,
        ksr: bool,
        ksn: u8,
    ) -> Result<(), InvalidParameter> {
        check_range("ar", ar as u32, 15)?;
        check_range("ksn", ksn as u32, 15)?;
        self.actual_ar = actual_rate(ar, ksr, ksn);
        self.ar_diff_per_sample = data::ATTACK_DIFF_PER_SAMPLE[self.actual_ar as usize];
        Ok(())
    }

    /// Sets the decay rate. Rate 0 holds the level.
    pub fn set_actual_decay_rate(
        &mut self,
        dr: u8,
        ksr: bool,
        ksn: u8,
    ) -> Result<(), InvalidParameter> {
        check_range("dr", dr as u32, 15)?;
        check_range("ksn", ksn as u32, 15)?;
        self.dr_coef_per_sample = decay_coef_per_sample(dr, ksr, ksn);
        Ok(())
    }

    /// Sets the sustain-phase rate. Rate 0 holds the level, which is the
    /// only way hardware sustain behaves as a plateau.
    pub fn set_actual_sustain_rate(
        &mut self,
        sr: u8,
        ksr: bool,
        ksn: u8,
    ) -> Result<(), InvalidParameter> {
        check_range("sr", sr as u32, 15)?;
        check_range("ksn", ksn as u32, 15)?;
        self.sr_coef_per_sample = decay_coef_per_sample(sr, ksr, ksn);
        Ok(())
    }

    /// Sets the release rate. Rate 0 holds the level.
    pub fn set_actual_release_rate(
        &mut self,
        rr: u8,
        ksr: bool,
        ksn: u8,
    ) -> Result<(), InvalidParameter> {
        check_range("rr", rr as u32, 15)?;
        check_range("ksn", ksn as u32, 15)?;
        self.rr_coef_per_sample = decay_coef_per_sample(rr, ksr, ksn);
        Ok(())
    }

    /// Sets the sustain level from the 4-bit SL parameter (3 dB per step).
    /// SL 15 means no sustain floor: decay proceeds to full silence.
    pub fn set_actual_sustain_level(&mut self, sl: u8) -> Result<(), InvalidParameter> {
        check_range("sl", sl as u32, 15)?;
        if sl == 0x0f {
            self.sustain_level = 0.0;
        } else {
            let sl_db = -3.0 * sl as f64;
            self.sustain_level = 10.0_f64.powf(sl_db / 20.0);
        }
        Ok(())
    }

    /// Sets the static total-level attenuation (0.75 dB per step).
    pub fn set_total_level(&mut self, tl: u8) -> Result<(), InvalidParameter> {
        check_range("tl", tl as u32, 63)?;
        let tl_db = tl as f64 * -0.75;
        self.tl_coef = 10.0_f64.powf(tl_db / 20.0);
        self.ksl_tl_coef = self.ksl_coef * self.tl_coef;
        Ok(())
    }

    /// Sets the static key-scale-level attenuation from the pitch registers.
    pub fn set_key_scaling_level(
        &mut self,
        fnum: u32,
        block: u32,
        ksl: u8,
    ) -> Result<(), InvalidParameter> {
        check_range("fnum", fnum, 1023)?;
        check_range("block", block, 7)?;
        check_range("ksl", ksl as u32, 3)?;
        self.ksl_coef = data::KSL_TABLE[ksl as usize][block as usize][(fnum >> 5) as usize];
        self.ksl_tl_coef = self.ksl_coef * self.tl_coef;
        Ok(())
    }

    /// Enables amplitude modulation (tremolo) and selects its depth row.
    pub fn set_amplitude_modulation(&mut self, eam: bool, dam: u8) -> Result<(), InvalidParameter> {
        check_range("dam", dam as u32, 3)?;
        self.eam = eam;
        self.dam = dam;
        Ok(())
    }

    /// Starts a new note: the level is forced to maximum attenuation before
    /// the attack begins, so no residue of a previous note can leak through
    /// the key-on boundary.
    pub fn key_on(&mut self) {
        self.current_level = 0.0;
        self.stage = Stage::Attack;
    }

    /// Forces the release stage from wherever the envelope currently is,
    /// keeping the attenuation it held at the moment of key-off.
    pub fn key_off(&mut self) {
        if self.stage != Stage::Off {
            self.stage = Stage::Release;
        }
    }

    /// Silences the envelope immediately (used for voice stealing and for
    /// key-on with a zero attack rate, which can never become audible).
    pub fn silence(&mut self) {
        self.current_level = 0.0;
        self.stage = Stage::Off;
    }

    /// Advances the state machine by one sample and returns the
    /// instantaneous amplitude, tremolo and static attenuation applied.
    ///
    /// A stage that completes mid-sample immediately runs the next stage's
    /// step in the same sample, as the hardware does. Total function: no
    /// failure is possible once the setters have validated their inputs.
    pub fn get_envelope(&mut self, tremolo_index: usize) -> f64 {
        match self.stage {
            Stage::Attack => {
                self.current_level += self.ar_diff_per_sample;
                if 1.0 <= self.current_level {
                    self.current_level = 1.0;
                    self.stage = Stage::Decay;
                    self.step_decay();
                }
            }
            Stage::Decay => self.step_decay(),
            Stage::Sustain => self.step_sustain(),
            Stage::Release => {
                if EPSILON < self.current_level {
                    self.current_level *= self.rr_coef_per_sample;
                } else {
                    self.silence();
                }
            }
            Stage::Off => {}
        }

        let mut result = self.current_level;
        if self.eam {
            result *= data::TREMOLO_TABLE[self.dam as usize][tremolo_index & data::MOD_TABLE_MASK];
        }
        result * self.ksl_tl_coef
    }

    fn step_decay(&mut self) {
        if self.sustain_level < self.current_level {
            self.current_level *= self.dr_coef_per_sample;
        } else {
            self.stage = Stage::Sustain;
            self.step_sustain();
        }
    }

    fn step_sustain(&mut self) {
        if EPSILON < self.current_level {
            self.current_level *= self.sr_coef_per_sample;
        } else {
            self.silence();
        }
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Combines a 4-bit rate with the key-scale-rate boost, clamped to the
/// valid actual-rate range.
fn actual_rate(rate: u8, ksr: bool, ksn: u8) -> u8 {
    let rof = data::RATE_OFFSET[ksr as usize][ksn as usize];
    (rate * 4 + rof).min(63)
}

/// Per-sample level coefficient for the decay-shaped stages.
fn decay_coef_per_sample(rate: u8, ksr: bool, ksn: u8) -> f64 {
    if rate == 0 {
        return 1.0;
    }
    // The measured table is amplitude dB; halve for energy dB.
    let db_per_sec_at4 = data::DECAY_DB_PER_SEC_AT4[ksr as usize][ksn as usize] / 2.0;
    let db_per_sample = db_per_sec_at4 * (1u32 << rate) as f64 / 16.0 / SAMPLE_RATE;
    10.0_f64.powf(-db_per_sample / 10.0)
}
