//! Audio file loading
//!
//! Decodes any symphonia-supported file, averages channels down to mono and
//! resamples to the analysis rate with rubato.

use crate::analysis::features::Signal;
use crate::{Error, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded mono PCM
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl LoadedAudio {
    pub fn signal(&self) -> Signal<'_> {
        Signal::new(&self.samples, self.sample_rate)
    }
}

fn decode_err(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Decode(format!("{}: {}", context, e))
}

/// Load a file as mono samples at `target_rate`
pub fn load_mono(path: &Path, target_rate: u32) -> Result<LoadedAudio> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| decode_err("unsupported audio format", e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode(format!("no audio track in {}", path.display())))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let native_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::Decode("sample rate not specified".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| decode_err("failed to create decoder", e))?;

    let mut mono: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_err("failed to read packet", e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(decode_err("failed to decode packet", e)),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);

        mono.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    debug!(
        "Decoded {} mono frames at {} Hz from {}",
        mono.len(),
        native_rate,
        path.display()
    );

    let samples = if native_rate != target_rate {
        resample(mono, native_rate, target_rate)?
    } else {
        mono
    };

    Ok(LoadedAudio {
        samples,
        sample_rate: target_rate,
    })
}

/// Single-pass sinc resampling of a mono buffer
fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_rate as f64 / from_rate as f64;
    let frames = samples.len();

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, frames, 1)
        .map_err(|e| decode_err("failed to create resampler", e))?;
    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| decode_err("resampling failed", e))?;

    let resampled = output.pop().unwrap_or_default();
    debug!(
        "Resampled {} frames ({} Hz) to {} frames ({} Hz)",
        frames,
        from_rate,
        resampled.len(),
        to_rate
    );
    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sine(path: &Path, sample_rate: u32, channels: u16, seconds: f32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let v = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
            for _ in 0..channels {
                writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_native_rate_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_sine(&path, 22050, 1, 1.0);

        let audio = load_mono(&path, 22050).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples.len(), 22050);
        assert!(audio.samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_stereo_is_averaged_and_resampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_sine(&path, 44100, 2, 1.0);

        let audio = load_mono(&path, 22050).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        let len = audio.samples.len() as f64;
        assert!((len - 22050.0).abs() < 22050.0 * 0.05, "got {} frames", len);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_mono(Path::new("/nonexistent/tone.wav"), 22050);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(matches!(load_mono(&path, 22050), Err(Error::Decode(_))));
    }
}
