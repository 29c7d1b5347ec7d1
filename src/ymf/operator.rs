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

//! Register-facing operator driver.
//!
//! An [`Operator`] owns one phase generator and one envelope generator and
//! keeps them consistent: the key-scale number derived from the pitch
//! registers feeds every rate and level setter, so changing fnum/block
//! mid-note re-derives all actual rates exactly as the register file does.
//! It also owns the two-sample self-feedback history that an operator needs
//! when it modulates its own phase.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ymf::data;
use crate::ymf::envelope::{EnvelopeGenerator, Stage};
use crate::ymf::error::{check_range, InvalidParameter};
use crate::ymf::phase::PhaseGenerator;

/// Register-level configuration of one operator, minus the pitch registers
/// (fnum/block are per-channel on the hardware and set separately).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorPatch {
    /// Frequency multiplier index (0 selects x0.5).
    pub mult: u8,
    /// Detune row.
    pub dt: u8,
    /// Key-scale-rate flag.
    pub ksr: bool,
    /// Key-scale-level index.
    pub ksl: u8,
    /// Attack rate.
    pub ar: u8,
    /// Decay rate.
    pub dr: u8,
    /// Sustain level.
    pub sl: u8,
    /// Sustain-phase rate.
    pub sr: u8,
    /// Release rate.
    pub rr: u8,
    /// Total level.
    pub tl: u8,
    /// Self-feedback amount.
    pub fb: u8,
    /// Ignore key-off.
    pub xof: bool,
    /// Tremolo enable.
    pub eam: bool,
    /// Tremolo depth.
    pub dam: u8,
    /// Vibrato enable.
    pub evb: bool,
    /// Vibrato depth.
    pub dvb: u8,
}

impl Default for OperatorPatch {
    fn default() -> Self {
        Self {
            mult: 1,
            dt: 0,
            ksr: false,
            ksl: 0,
            ar: 15,
            dr: 4,
            sl: 0,
            sr: 0,
            rr: 7,
            tl: 0,
            fb: 0,
            xof: false,
            eam: false,
            dam: 0,
            evb: false,
            dvb: 0,
        }
    }
}

/// One sample of operator output, consumed by the external waveform stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorOutput {
    /// Oscillator phase as a fraction of one cycle, in `[0, 1)`.
    pub phase: f64,
    /// Instantaneous amplitude in `[0, 1]`.
    pub envelope: f64,
}

/// One oscillator+envelope unit of an FM voice.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    patch: OperatorPatch,
    fnum: u32,
    block: u32,
    ksn: u8,
    feedback_coef: f64,
    feedback_prev: f64,
    feedback_curr: f64,
    phase_generator: PhaseGenerator,
    envelope_generator: EnvelopeGenerator,
}

impl Operator {
    /// Creates an idle operator with the default patch.
    pub fn new() -> Self {
        let mut op = Self {
            patch: OperatorPatch::default(),
            fnum: 0,
            block: 0,
            ksn: 0,
            feedback_coef: 0.0,
            feedback_prev: 0.0,
            feedback_curr: 0.0,
            phase_generator: PhaseGenerator::new(),
            envelope_generator: EnvelopeGenerator::new(),
        };
        // Defaults are in range; only an internal table change could break this.
        op.apply_patch(&OperatorPatch::default())
            .expect("default patch is valid");
        op
    }

    /// Applies a full operator patch, re-deriving every actual rate and
    /// coefficient. Fails without mutating anything if a field is out of
    /// its hardware range.
    pub fn apply_patch(&mut self, patch: &OperatorPatch) -> Result<(), InvalidParameter> {
        check_range("mult", patch.mult as u32, 15)?;
        check_range("dt", patch.dt as u32, 7)?;
        check_range("ksl", patch.ksl as u32, 3)?;
        check_range("ar", patch.ar as u32, 15)?;
        check_range("dr", patch.dr as u32, 15)?;
        check_range("sl", patch.sl as u32, 15)?;
        check_range("sr", patch.sr as u32, 15)?;
        check_range("rr", patch.rr as u32, 15)?;
        check_range("tl", patch.tl as u32, 63)?;
        check_range("fb", patch.fb as u32, 7)?;
        check_range("dam", patch.dam as u32, 3)?;
        check_range("dvb", patch.dvb as u32, 3)?;

        self.patch = *patch;
        self.feedback_coef = data::FEEDBACK_TABLE[patch.fb as usize];
        self.phase_generator.set_vibrato(patch.evb, patch.dvb)?;
        self.envelope_generator
            .set_amplitude_modulation(patch.eam, patch.dam)?;
        self.envelope_generator.set_total_level(patch.tl)?;
        self.envelope_generator.set_actual_sustain_level(patch.sl)?;
        self.update_frequency()?;
        self.update_envelope()?;
        debug!(
            "operator patch applied: mult={} dt={} ar={} dr={} sl={} sr={} rr={} tl={} fb={}",
            patch.mult, patch.dt, patch.ar, patch.dr, patch.sl, patch.sr, patch.rr, patch.tl, patch.fb
        );
        Ok(())
    }

    /// Sets the pitch registers and re-derives everything keyed by the
    /// key-scale number. Safe to call mid-note.
    pub fn set_frequency(&mut self, fnum: u32, block: u32) -> Result<(), InvalidParameter> {
        check_range("fnum", fnum, 1023)?;
        check_range("block", block, 7)?;
        self.fnum = fnum;
        self.block = block;
        self.ksn = ((block << 1) | (fnum >> 9)) as u8;
        self.update_frequency()?;
        self.update_envelope()?;
        self.envelope_generator
            .set_key_scaling_level(fnum, block, self.patch.ksl)?;
        debug!("operator frequency: fnum={} block={} ksn={}", fnum, block, self.ksn);
        Ok(())
    }

    /// Key-on: restart the waveform cycle and the envelope. A zero attack
    /// rate can never become audible, so the envelope is forced silent
    /// instead, as the hardware does.
    pub fn key_on(&mut self) {
        self.phase_generator.key_on();
        self.feedback_prev = 0.0;
        self.feedback_curr = 0.0;
        if 0 < self.patch.ar {
            self.envelope_generator.key_on();
        } else {
            self.envelope_generator.silence();
        }
    }

    /// Key-off: move the envelope to release, unless the XOF flag says this
    /// operator ignores key-off.
    pub fn key_off(&mut self) {
        if !self.patch.xof {
            self.envelope_generator.key_off();
        }
    }

    /// Current envelope stage.
    pub fn envelope_stage(&self) -> Stage {
        self.envelope_generator.stage()
    }

    /// Advances both generators by one sample.
    ///
    /// `phase_mod` is the external FM input in cycles; the operator's own
    /// feedback signal is added on top. The returned pair is what the
    /// excluded waveform/mixing stage consumes.
    pub fn tick(
        &mut self,
        vibrato_index: usize,
        tremolo_index: usize,
        phase_mod: f64,
    ) -> OperatorOutput {
        let phase = self
            .phase_generator
            .get_phase(vibrato_index, phase_mod + self.feedback());
        let envelope = self.envelope_generator.get_envelope(tremolo_index);
        OperatorOutput { phase, envelope }
    }

    /// Records one sample of this operator's final output for use as
    /// self-feedback. A no-op when FB is 0.
    pub fn feed_output(&mut self, output: f64) {
        if self.feedback_coef == 0.0 {
            return;
        }
        self.feedback_prev = self.feedback_curr;
        self.feedback_curr = output * self.feedback_coef;
    }

    /// Self-feedback phase offset in cycles: the average of the last two
    /// fed-back samples, which is how the chip smooths its feedback path.
    pub fn feedback(&self) -> f64 {
        (self.feedback_prev + self.feedback_curr) / 2.0
    }

    fn update_frequency(&mut self) -> Result<(), InvalidParameter> {
        self.phase_generator
            .set_frequency(self.fnum, self.block, self.patch.mult as u32, self.patch.dt as u32)
    }

    fn update_envelope(&mut self) -> Result<(), InvalidParameter> {
        let p = &self.patch;
        self.envelope_generator
            .set_actual_attack_rate(p.ar, p.ksr, self.ksn)?;
        self.envelope_generator
            .set_actual_decay_rate(p.dr, p.ksr, self.ksn)?;
        self.envelope_generator
            .set_actual_sustain_rate(p.sr, p.ksr, self.ksn)?;
        self.envelope_generator
            .set_actual_release_rate(p.rr, p.ksr, self.ksn)?;
        Ok(())
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self::new()
    }
}
