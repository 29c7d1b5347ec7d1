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

//! Hardware-faithful model of a YMF/OPL-family FM synthesizer operator.
//!
//! This crate reproduces the two per-operator signal generators of the
//! original silicon at sample-accurate precision:
//!
//! - the **phase generator**, which turns register-level frequency
//!   parameters (fnum, block, multiplier, detune) into a 64-bit fixed-point
//!   phase accumulator, and
//! - the **envelope generator**, an attack/decay/sustain/release state
//!   machine with hardware key-scaling of both rates and levels.
//!
//! Both generators are driven one call per output sample and produce the
//! inputs (phase fraction, amplitude) consumed by an external waveform and
//! mixing stage. The nonlinear hardware tables they depend on are carried
//! over as explicit constant data so that the output matches the reference
//! measurements, rather than merely sounding plausible.

#![warn(missing_docs)]

pub mod ymf;

/// Native sample rate of the modeled chip, in Hz.
///
/// All coefficient tables are defined in units of this clock; it is a
/// process-wide constant and must never be altered at runtime.
pub const SAMPLE_RATE: f64 = 48000.0;

pub use ymf::envelope::{EnvelopeGenerator, Stage};
pub use ymf::error::InvalidParameter;
pub use ymf::operator::{Operator, OperatorOutput, OperatorPatch};
pub use ymf::phase::PhaseGenerator;
