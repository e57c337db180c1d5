//! Regression tests against the real symphonia backend
//!
//! WAV fixtures are written with `hound` into temporary directories and
//! decoded end to end, checking exact sample counts and values.

use core_decoder::{
    decode_file, AudioCodec, ChannelLayout, DecodeConfig, DecodeError, DecodeProtocol,
};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_wav_i16(dir: &Path, name: &str, channels: u16, sample_rate: u32, samples: &[i16]) -> PathBuf {
    let path = dir.join(name);
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn write_wav_f32(dir: &Path, name: &str, channels: u16, sample_rate: u32, samples: &[f32]) -> PathBuf {
    let path = dir.join(name);
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}

/// A WAV as written by a recorder that cannot seek back to patch the header:
/// the RIFF and data chunk sizes are left at `u32::MAX`.
fn write_streamed_wav(dir: &Path, name: &str, channels: u16, sample_rate: u32, samples: &[i16]) -> PathBuf {
    let block_align = channels * 2;
    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Deterministic sawtooth covering most of the 16-bit range.
fn sawtooth(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| ((i as i32 * 613) % 60000 - 30000) as i16)
        .collect()
}

#[test]
fn test_mono_s16_wav_round_trips_exactly() {
    let dir = TempDir::new().unwrap();
    let samples = sawtooth(10_000);
    let path = write_wav_i16(dir.path(), "mono.wav", 1, 44100, &samples);

    for protocol in [DecodeProtocol::PushPull, DecodeProtocol::SingleCall] {
        let config = DecodeConfig::default().with_protocol(protocol);
        let audio = decode_file(&path, &config).unwrap();

        assert_eq!(audio.stream.codec, AudioCodec::Pcm);
        assert_eq!(audio.buffer.frame_rate(), 44100);
        assert_eq!(audio.buffer.channels(), 1);
        assert_eq!(audio.buffer.len(), samples.len(), "{protocol:?}");

        let expected: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();
        assert_eq!(audio.buffer.samples(), expected.as_slice());
        assert_eq!(audio.stats.frames_converted, 0);
        assert_eq!(audio.stats.bad_packets, 0);
    }
}

#[test]
fn test_stereo_s16_wav_is_interleaved() {
    let dir = TempDir::new().unwrap();
    let frames = 4_000;
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        samples.push(i as i16);
        samples.push(-(i as i16));
    }
    let path = write_wav_i16(dir.path(), "stereo.wav", 2, 48000, &samples);

    let audio = decode_file(&path, &DecodeConfig::default()).unwrap();
    assert_eq!(audio.buffer.channels(), 2);
    assert_eq!(audio.buffer.frame_rate(), 48000);
    assert_eq!(audio.buffer.frames(), frames);
    assert_eq!(audio.stream.layout, Some(ChannelLayout::STEREO));

    let expected: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();
    assert_eq!(audio.buffer.samples(), expected.as_slice());
    assert!(audio.stats.frames_converted > 0);
}

#[test]
fn test_float_wav_is_converted_to_16_bit_range() {
    let dir = TempDir::new().unwrap();
    let samples = [0.0f32, 0.25, -0.25, 0.5, -0.5];
    let path = write_wav_f32(dir.path(), "float.wav", 1, 22050, &samples);

    let audio = decode_file(&path, &DecodeConfig::default()).unwrap();
    assert_eq!(audio.buffer.len(), samples.len());

    for (decoded, original) in audio.buffer.samples().iter().zip(samples) {
        let expected = original * 32768.0;
        assert!(
            (decoded - expected).abs() <= 1.0,
            "decoded {decoded}, expected {expected}"
        );
    }
}

#[test]
fn test_capacity_hint_does_not_change_output() {
    let dir = TempDir::new().unwrap();
    let samples = sawtooth(2_048);
    let path = write_wav_i16(dir.path(), "hint.wav", 1, 8000, &samples);

    let reserved = decode_file(&path, &DecodeConfig::default()).unwrap();
    let unreserved =
        decode_file(&path, &DecodeConfig::default().with_reserve_capacity(false)).unwrap();

    assert_eq!(reserved.stream.total_frames, Some(2_048));
    assert_eq!(reserved.buffer, unreserved.buffer);
}

#[test]
fn test_streamed_wav_header_does_not_inflate_reservation() {
    let dir = TempDir::new().unwrap();
    let samples = sawtooth(44_100 * 2);
    let path = write_streamed_wav(dir.path(), "streamed.wav", 2, 44100, &samples);

    let audio = decode_file(&path, &DecodeConfig::default()).unwrap();

    // Ten minutes of stereo at most, whatever the header claims
    assert!(audio.buffer.capacity() <= 44_100 * 600 * 2);
    assert_eq!(audio.buffer.channels(), 2);
    assert_eq!(audio.buffer.frames(), 44_100);

    let expected: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();
    assert_eq!(audio.buffer.samples(), expected.as_slice());
}

#[test]
fn test_missing_file_is_open_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.mp3");

    let err = decode_file(&path, &DecodeConfig::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Open { .. }));
    assert!(err.is_input_error());
}

#[test]
fn test_garbage_file_is_open_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noise.bin");
    std::fs::write(&path, b"this is certainly not an audio container").unwrap();

    assert!(matches!(
        decode_file(&path, &DecodeConfig::default()),
        Err(DecodeError::Open { .. })
    ));
}
