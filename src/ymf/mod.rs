//! Per-operator signal generators for YMF/OPL-family chips.
//!
//! The module splits along the hardware's own seams: [`data`] holds the
//! nonlinear coefficient tables measured from the silicon, [`phase`] and
//! [`envelope`] are the two per-sample generators, and [`operator`] is the
//! register-facing driver that keeps a paired set of them consistent.

pub mod data;
pub mod envelope;
pub mod error;
pub mod operator;
pub mod phase;
