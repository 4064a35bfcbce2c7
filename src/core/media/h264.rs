//! H.264 Annex B repair for captures that lack in-band parameter sets.

use base64::prelude::*;

use super::MediaError;

/// Annex B start code.
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Sequence parameter set of the reference capture profile (base64).
pub const DEFAULT_SPS_BASE64: &str = "Z0LADJoFAAABMA==";

/// Picture parameter set of the reference capture profile (base64).
pub const DEFAULT_PPS_BASE64: &str = "aM48gA==";

/// Decoded SPS and PPS payloads, without start codes.
///
/// These are encoder-profile specific; the default matches the reference
/// capture device (baseline profile, level 1.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSets {
    pub sps: Vec<u8>,
    pub pps: Vec<u8>,
}

impl Default for ParameterSets {
    fn default() -> Self {
        Self {
            sps: vec![0x67, 0x42, 0xc0, 0x0c, 0x9a, 0x05, 0x00, 0x00, 0x01, 0x30],
            pps: vec![0x68, 0xce, 0x3c, 0x80],
        }
    }
}

impl ParameterSets {
    pub fn new(sps: Vec<u8>, pps: Vec<u8>) -> Self {
        Self { sps, pps }
    }

    /// Decode base64 SPS and PPS payloads.
    pub fn from_base64(sps: &str, pps: &str) -> Result<Self, MediaError> {
        let sps = BASE64_STANDARD
            .decode(sps)
            .map_err(|e| MediaError::InvalidParameterSet(format!("SPS: {e}")))?;
        let pps = BASE64_STANDARD
            .decode(pps)
            .map_err(|e| MediaError::InvalidParameterSet(format!("PPS: {e}")))?;
        Ok(Self { sps, pps })
    }

    /// Length of the prefix [`repair`] prepends.
    pub fn prefix_len(&self) -> usize {
        2 * START_CODE.len() + self.sps.len() + self.pps.len()
    }
}

/// Prefix `raw` with start-coded SPS and PPS units so a decoder can parse it
/// standalone. The stream itself is not inspected.
pub fn repair(raw: &[u8], params: &ParameterSets) -> Vec<u8> {
    let mut out = Vec::with_capacity(params.prefix_len() + raw.len());
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(&params.sps);
    out.extend_from_slice(&START_CODE);
    out.extend_from_slice(&params.pps);
    out.extend_from_slice(raw);
    out
}
