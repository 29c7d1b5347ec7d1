use hound::{SampleFormat, WavSpec, WavWriter};

/// Encodes a mono float buffer as a 32-bit float WAV file, normalized with
/// a little headroom when the peak comes close to clipping.
pub fn encode_mono(buf: &[f32], sample_rate: u32) -> anyhow::Result<Vec<u8>> {
    let peak = buf.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    let normalize_factor = if peak > 0.8 { 0.8 / peak } else { 1.0 };

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut ret = vec![];
    let mut cursor = std::io::Cursor::new(&mut ret);
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for sample in buf {
        writer.write_sample(sample * normalize_factor)?;
    }
    writer.finalize()?;
    Ok(ret)
}
