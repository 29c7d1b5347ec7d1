use std::f64::consts::TAU;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use ymfop::{Operator, OperatorPatch, Stage, SAMPLE_RATE};

mod wav;

/// Render a single YMF operator note to a WAV file.
///
/// The operator core produces phase and amplitude; this tool previews them
/// through a plain sine so the generators can be heard and inspected without
/// the chip's waveform/mixing stage.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// 10-bit frequency number
    #[arg(long, default_value_t = 512)]
    fnum: u32,

    /// Octave block (0-7)
    #[arg(long, default_value_t = 4)]
    block: u32,

    /// Frequency multiplier index (0 means x0.5)
    #[arg(long, default_value_t = 1)]
    mult: u8,

    /// Detune row (0-7)
    #[arg(long, default_value_t = 0)]
    dt: u8,

    /// Attack rate (0-15)
    #[arg(long, default_value_t = 15)]
    ar: u8,

    /// Decay rate (0-15)
    #[arg(long, default_value_t = 4)]
    dr: u8,

    /// Sustain level (0-15, 15 = no floor)
    #[arg(long, default_value_t = 4)]
    sl: u8,

    /// Sustain-phase rate (0-15)
    #[arg(long, default_value_t = 0)]
    sr: u8,

    /// Release rate (0-15)
    #[arg(long, default_value_t = 7)]
    rr: u8,

    /// Total level (0-63)
    #[arg(long, default_value_t = 0)]
    tl: u8,

    /// Key-scale-rate flag
    #[arg(long, default_value_t = false)]
    ksr: bool,

    /// Key-scale-level index (0-3)
    #[arg(long, default_value_t = 0)]
    ksl: u8,

    /// Self-feedback amount (0-7)
    #[arg(long, default_value_t = 0)]
    fb: u8,

    /// Vibrato depth (0-3); vibrato is enabled when set
    #[arg(long)]
    dvb: Option<u8>,

    /// Tremolo depth (0-3); tremolo is enabled when set
    #[arg(long)]
    dam: Option<u8>,

    /// LFO preset (0-3 selecting 1.8/4.0/5.9/7.0 Hz)
    #[arg(long, default_value_t = 0)]
    lfo: u8,

    /// Key-on duration in milliseconds
    #[arg(long, default_value_t = 1000)]
    note_ms: u64,

    /// Output WAV path
    #[arg(short, long, default_value = "note.wav")]
    output: PathBuf,
}

/// LFO rates selectable on the chip, in Hz.
const LFO_FREQ_HZ: [f64; 4] = [1.8, 4.0, 5.9, 7.0];

/// Hard cap on rendering, for patches that never fall silent (rr=0, xof).
const MAX_RENDER_SECONDS: usize = 10;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let patch = OperatorPatch {
        mult: args.mult,
        dt: args.dt,
        ksr: args.ksr,
        ksl: args.ksl,
        ar: args.ar,
        dr: args.dr,
        sl: args.sl,
        sr: args.sr,
        rr: args.rr,
        tl: args.tl,
        fb: args.fb,
        eam: args.dam.is_some(),
        dam: args.dam.unwrap_or(0),
        evb: args.dvb.is_some(),
        dvb: args.dvb.unwrap_or(0),
        ..OperatorPatch::default()
    };

    let mut op = Operator::new();
    op.apply_patch(&patch).context("invalid operator patch")?;
    op.set_frequency(args.fnum, args.block)
        .context("invalid frequency registers")?;

    let lfo_step = LFO_FREQ_HZ[(args.lfo & 3) as usize] / SAMPLE_RATE
        * ymfop::ymf::data::MOD_TABLE_LEN as f64;

    let note_samples = (args.note_ms as f64 / 1000.0 * SAMPLE_RATE) as usize;
    let max_samples = MAX_RENDER_SECONDS * SAMPLE_RATE as usize;

    op.key_on();
    info!(
        "rendering fnum={} block={} mult={} dt={} for {} ms",
        args.fnum, args.block, args.mult, args.dt, args.note_ms
    );

    let mut buf = Vec::with_capacity(note_samples);
    let mut lfo_phase = 0.0f64;
    for i in 0..max_samples {
        if i == note_samples {
            op.key_off();
        }

        let lfo_index = lfo_phase as usize;
        let out = op.tick(lfo_index, lfo_index, 0.0);
        let sample = (out.phase * TAU).sin() * out.envelope;
        op.feed_output(sample);
        buf.push(sample as f32);

        lfo_phase += lfo_step;
        if i >= note_samples && op.envelope_stage() == Stage::Off {
            break;
        }
    }

    let bytes = wav::encode_mono(&buf, SAMPLE_RATE as u32)?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("wrote {} samples to {}", buf.len(), args.output.display());
    Ok(())
}
