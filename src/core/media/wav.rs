//! WAV container framing for raw linear PCM.

use std::io::Cursor;

use tracing::debug;

use super::MediaError;

/// Size of the canonical PCM header written by [`pcm_to_wav`].
pub const WAV_HEADER_SIZE: usize = 44;

/// Audio parameters that must agree across concatenated containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl WaveFormat {
    pub fn new(sample_rate: u32, channels: u16, bit_depth: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bit_depth,
        }
    }

    /// Truncated to the header field width for out-of-range parameters.
    pub fn byte_rate(&self) -> u32 {
        (u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bit_depth) / 8)
            as u32
    }

    /// Truncated to the header field width for out-of-range parameters.
    pub fn block_align(&self) -> u16 {
        (u32::from(self.channels) * u32::from(self.bit_depth) / 8) as u16
    }
}

/// Create a WAV header for `data_size` bytes of PCM audio.
///
/// Parameters are used as given; only the derived fields are computed.
pub fn create_header(data_size: u32, format: WaveFormat) -> [u8; WAV_HEADER_SIZE] {
    let riff_size = data_size.wrapping_add(WAV_HEADER_SIZE as u32 - 8);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // linear PCM
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Wrap raw PCM samples in a WAV container.
///
/// # Arguments
/// * `samples` - Raw PCM bytes, already in the target layout
/// * `sample_rate` - Sample rate in Hz (e.g., 16000)
/// * `channels` - Number of interleaved channels
/// * `bit_depth` - Bits per sample
pub fn pcm_to_wav(samples: &[u8], sample_rate: u32, channels: u16, bit_depth: u16) -> Vec<u8> {
    let format = WaveFormat::new(sample_rate, channels, bit_depth);
    let header = create_header(samples.len() as u32, format);
    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + samples.len());
    wav.extend_from_slice(&header);
    wav.extend_from_slice(samples);
    wav
}

/// Concatenate WAV containers into one.
///
/// Every input must share the sample rate and channel count of the first.
/// The output uses the bit depth of the first input; samples from inputs with
/// a different depth are rescaled. Nothing is produced if any input fails to
/// parse or mismatches.
pub fn concat_wavs<B: AsRef<[u8]>>(inputs: &[B]) -> Result<Vec<u8>, MediaError> {
    let mut target: Option<WaveFormat> = None;
    let mut decoded: Vec<(u16, Vec<i32>)> = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let reader = hound::WavReader::new(Cursor::new(input.as_ref()))?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int {
            return Err(MediaError::Format(format!(
                "input {index}: floating point samples are not supported"
            )));
        }

        let format = WaveFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample);
        match target {
            None => target = Some(format),
            Some(first) => {
                if first.sample_rate != format.sample_rate || first.channels != format.channels {
                    return Err(MediaError::Format(format!(
                        "input {index} is {} Hz/{} ch, expected {} Hz/{} ch",
                        format.sample_rate, format.channels, first.sample_rate, first.channels
                    )));
                }
            }
        }

        let samples = reader.into_samples::<i32>().collect::<Result<Vec<_>, _>>()?;
        decoded.push((format.bit_depth, samples));
    }

    let Some(target) = target else {
        return Err(MediaError::Format("no input containers".to_string()));
    };

    let total: usize = decoded.iter().map(|(_, s)| s.len()).sum();
    debug!(
        inputs = decoded.len(),
        samples = total,
        sample_rate = target.sample_rate,
        channels = target.channels,
        "Concatenating WAV containers"
    );

    let bytes_per_sample = usize::from(target.bit_depth / 8);
    let mut pcm = Vec::with_capacity(total * bytes_per_sample);
    for (bit_depth, samples) in &decoded {
        for &sample in samples {
            encode_sample(
                &mut pcm,
                rescale(sample, *bit_depth, target.bit_depth),
                target.bit_depth,
            )?;
        }
    }

    Ok(pcm_to_wav(
        &pcm,
        target.sample_rate,
        target.channels,
        target.bit_depth,
    ))
}

fn rescale(sample: i32, from_bits: u16, to_bits: u16) -> i32 {
    if from_bits == to_bits {
        sample
    } else if from_bits > to_bits {
        sample >> (from_bits - to_bits)
    } else {
        sample << (to_bits - from_bits)
    }
}

fn encode_sample(out: &mut Vec<u8>, sample: i32, bit_depth: u16) -> Result<(), MediaError> {
    match bit_depth {
        // 8-bit WAV is unsigned
        8 => out.push((sample + 128) as u8),
        16 => out.extend_from_slice(&(sample as i16).to_le_bytes()),
        24 => out.extend_from_slice(&sample.to_le_bytes()[..3]),
        32 => out.extend_from_slice(&sample.to_le_bytes()),
        other => {
            return Err(MediaError::Format(format!(
                "unsupported bit depth {other}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_count(wav: &[u8]) -> u32 {
        hound::WavReader::new(Cursor::new(wav)).unwrap().len()
    }

    #[test]
    fn test_header_layout() {
        let samples = vec![0u8; 320];
        let wav = pcm_to_wav(&samples, 16000, 1, 16);

        assert_eq!(wav.len(), samples.len() + 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 320 + 36);
        assert_eq!(u16::from_le_bytes(wav[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 16000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 32000);
        assert_eq!(u16::from_le_bytes(wav[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 320);
    }

    #[test]
    fn test_header_stereo_byte_rate() {
        let header = create_header(0, WaveFormat::new(44100, 2, 16));
        assert_eq!(u32::from_le_bytes(header[28..32].try_into().unwrap()), 176400);
        assert_eq!(u16::from_le_bytes(header[32..34].try_into().unwrap()), 4);
    }

    #[test]
    fn test_extreme_parameters_used_as_given() {
        let wav = pcm_to_wav(&[], 8000, 4096, 16);
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 4096);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 65_536_000);
        assert_eq!(u16::from_le_bytes(wav[32..34].try_into().unwrap()), 8192);

        // Derived fields wrap to the header field width
        let header = create_header(0, WaveFormat::new(48000, u16::MAX, u16::MAX));
        assert_eq!(u32::from_le_bytes(header[28..32].try_into().unwrap()), 3_508_541_296);
        assert_eq!(u16::from_le_bytes(header[32..34].try_into().unwrap()), 49152);
    }

    #[test]
    fn test_empty_samples() {
        let wav = pcm_to_wav(&[], 24000, 1, 16);
        assert_eq!(wav.len(), 44);
        assert_eq!(sample_count(&wav), 0);
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = pcm_to_wav(&[1, 0, 2, 0], 16000, 1, 16);
        let b = pcm_to_wav(&[3, 0], 16000, 1, 16);

        let joined = concat_wavs(&[a, b]).unwrap();
        assert_eq!(sample_count(&joined), 3);
        assert_eq!(&joined[44..], &[1, 0, 2, 0, 3, 0]);
    }

    #[test]
    fn test_concat_rejects_sample_rate_mismatch() {
        let a = pcm_to_wav(&[0; 4], 16000, 1, 16);
        let b = pcm_to_wav(&[0; 4], 44100, 1, 16);
        assert!(matches!(concat_wavs(&[a, b]), Err(MediaError::Format(_))));
    }

    #[test]
    fn test_concat_rejects_channel_mismatch() {
        let a = pcm_to_wav(&[0; 4], 16000, 1, 16);
        let b = pcm_to_wav(&[0; 4], 16000, 2, 16);
        assert!(matches!(concat_wavs(&[a, b]), Err(MediaError::Format(_))));
    }

    #[test]
    fn test_concat_uses_first_bit_depth() {
        let a = pcm_to_wav(&[0x00, 0x01], 8000, 1, 16);
        // 8-bit unsigned: 0x80 is silence, 0x81 is +1
        let b = pcm_to_wav(&[0x81], 8000, 1, 8);

        let joined = concat_wavs(&[a, b]).unwrap();
        let reader = hound::WavReader::new(Cursor::new(&joined)).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![256, 256]);
    }

    #[test]
    fn test_concat_8_bit_round_trips() {
        // 8-bit WAV is unsigned: 0x80 is silence
        let a = pcm_to_wav(&[0x80, 0x81], 8000, 1, 8);
        let b = pcm_to_wav(&[0x7f], 8000, 1, 8);

        let joined = concat_wavs(&[a, b]).unwrap();
        assert_eq!(&joined[44..], &[0x80, 0x81, 0x7f]);
    }

    #[test]
    fn test_concat_invalid_input() {
        let err = concat_wavs(&[b"not a wav file".to_vec()]).unwrap_err();
        assert!(matches!(err, MediaError::Wav(_)));
    }

    #[test]
    fn test_concat_empty_input() {
        let empty: [Vec<u8>; 0] = [];
        assert!(matches!(concat_wavs(&empty), Err(MediaError::Format(_))));
    }
}
