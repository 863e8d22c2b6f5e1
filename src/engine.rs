//! Cipher engine: runs the four layers forward to encrypt and backward to
//! decrypt.
//!
//! ```text
//! encrypt: normalize -> DKSS -> NRPE -> VBMD -> KDPP -> render ++ marker
//! decrypt: normalize -> pop marker -> KDPP^-1 -> VBMD^-1 -> NRPE^-1 -> DKSS^-1 -> render
//! ```
//!
//! NRPE and VBMD pad the stream, and their pad counts cannot be recovered
//! from the ciphertext length alone (a 3x3 key admits pads 0, 1 and 2 for
//! the same length). The pad record therefore travels as one trailing marker
//! letter, `A`..`H`, after the permuted residues.

use crate::alphabet::{letter_of, normalize, render, Residue};
use crate::error::CipherError;
use crate::keys::KeySchedule;
use crate::layers::{dkss, kdpp, nrpe, vbmd, Direction, Layer};
use crate::trace::Trace;

/// Pad bookkeeping carried by the ciphertext marker letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadRecord {
    /// NRPE appended one filler to an odd-length stream.
    pub nrpe: bool,
    /// Fillers VBMD appended to reach a block boundary (`< 4`).
    pub vbmd: usize,
}

const NRPE_WEIGHT: Residue = 4;

impl PadRecord {
    pub fn to_residue(self) -> Residue {
        self.vbmd as Residue + if self.nrpe { NRPE_WEIGHT } else { 0 }
    }

    pub fn from_residue(r: Residue) -> Result<Self, CipherError> {
        if r >= 2 * NRPE_WEIGHT {
            return Err(CipherError::length(format!(
                "unrecognised pad marker '{}'",
                letter_of(r)
            )));
        }
        Ok(Self {
            nrpe: r >= NRPE_WEIGHT,
            vbmd: (r % NRPE_WEIGHT) as usize,
        })
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherOutput {
    pub text: String,
    pub trace: Trace,
}

/// The AQIMC pipeline. Stateless; share it freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aqimc;

impl Aqimc {
    pub fn new() -> Self {
        Self
    }

    /// Encrypt with pre-derived keys.
    pub fn encrypt(&self, plaintext: &str, keys: &KeySchedule) -> Result<CipherOutput, CipherError> {
        let input = normalize(plaintext).map_err(|e| e.for_field("plaintext"))?;
        let mut trace = Trace::new();

        let shifted = dkss::forward(&input, keys.dkss());
        trace.record(Layer::Dkss, Direction::Forward, &input, &shifted);

        let paired = nrpe::forward(&shifted, keys.nrpe());
        trace.record(Layer::Nrpe, Direction::Forward, &shifted, &paired.residues);

        let diffused = vbmd::forward(&paired.residues, keys.vbmd());
        trace.record(Layer::Vbmd, Direction::Forward, &paired.residues, &diffused.residues);

        let permutation = keys.kdpp_permutation(diffused.residues.len());
        let permuted = kdpp::forward(&diffused.residues, &permutation)?;
        trace.record(Layer::Kdpp, Direction::Forward, &diffused.residues, &permuted);

        let marker = PadRecord {
            nrpe: paired.padded,
            vbmd: diffused.pad,
        };
        let mut text = render(&permuted);
        text.push(letter_of(marker.to_residue()));

        tracing::debug!(
            plaintext_len = input.len(),
            ciphertext_len = text.len(),
            block = keys.block_size(),
            nrpe_pad = marker.nrpe,
            vbmd_pad = marker.vbmd,
            "encrypted"
        );
        Ok(CipherOutput { text, trace })
    }

    /// Decrypt with pre-derived keys.
    ///
    /// Wrong-but-valid keys do not fail here; they yield garbled text. Only
    /// bookkeeping that cannot line up (bad marker, length not a multiple of
    /// the key3 block size) is reported, as [`CipherError::LengthMismatch`].
    pub fn decrypt(&self, ciphertext: &str, keys: &KeySchedule) -> Result<CipherOutput, CipherError> {
        let mut body = normalize(ciphertext).map_err(|e| e.for_field("ciphertext"))?;
        let marker = match body.pop() {
            Some(r) => PadRecord::from_residue(r)?,
            None => return Err(CipherError::length("ciphertext is empty")),
        };
        if body.is_empty() {
            return Err(CipherError::length("ciphertext holds a pad marker but no blocks"));
        }
        let mut trace = Trace::new();

        let permutation = keys.kdpp_permutation(body.len());
        let unpermuted = kdpp::inverse(&body, &permutation)?;
        trace.record(Layer::Kdpp, Direction::Inverse, &body, &unpermuted);

        let undiffused = vbmd::inverse(&unpermuted, keys.vbmd_inverse(), marker.vbmd)?;
        trace.record(Layer::Vbmd, Direction::Inverse, &unpermuted, &undiffused);

        let unpaired = nrpe::inverse(&undiffused, keys.nrpe(), marker.nrpe)?;
        trace.record(Layer::Nrpe, Direction::Inverse, &undiffused, &unpaired);

        let plain = dkss::inverse(&unpaired, keys.dkss());
        trace.record(Layer::Dkss, Direction::Inverse, &unpaired, &plain);

        tracing::debug!(
            ciphertext_len = body.len() + 1,
            plaintext_len = plain.len(),
            "decrypted"
        );
        Ok(CipherOutput {
            text: render(&plain),
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> KeySchedule {
        KeySchedule::derive("KEYA", "KEYB", "MATRIX", "PERMUTE").unwrap()
    }

    #[test]
    fn marker_roundtrips_all_records() {
        for nrpe in [false, true] {
            for vbmd in 0..4 {
                let rec = PadRecord { nrpe, vbmd };
                assert_eq!(PadRecord::from_residue(rec.to_residue()).unwrap(), rec);
            }
        }
        assert!(PadRecord::from_residue(8).is_err());
        assert!(PadRecord::from_residue(25).is_err());
    }

    #[test]
    fn hello_known_answer() {
        let out = Aqimc::new().encrypt("HELLO", &sample_keys()).unwrap();
        assert_eq!(out.text, "WAIRHGE");
    }

    #[test]
    fn hello_trace_layers() {
        let out = Aqimc::new().encrypt("hello", &sample_keys()).unwrap();
        let chain: Vec<(&str, &str, &str)> = out
            .trace
            .iter()
            .map(|(l, s)| (l.name(), s.input.as_str(), s.output.as_str()))
            .collect();
        assert_eq!(
            chain,
            [
                ("DKSS", "HELLO", "RJLOC"),
                ("NRPE", "RJLOC", "JINXWF"),
                ("VBMD", "JINXWF", "IWRAGH"),
                ("KDPP", "IWRAGH", "WAIRHG"),
            ]
        );
    }

    #[test]
    fn decrypt_runs_layers_backwards() {
        let engine = Aqimc::new();
        let keys = sample_keys();
        let out = engine.decrypt("WAIRHGE", &keys).unwrap();
        assert_eq!(out.text, "HELLO");
        let order: Vec<&str> = out.trace.iter().map(|(l, _)| l.name()).collect();
        assert_eq!(order, ["KDPP", "VBMD", "NRPE", "DKSS"]);
        assert_eq!(out.trace.get(Layer::Kdpp).unwrap().input, "WAIRHG");
        assert_eq!(out.trace.get(Layer::Dkss).unwrap().output, "HELLO");
    }

    #[test]
    fn bad_marker_is_length_mismatch() {
        let err = Aqimc::new().decrypt("WAIRHGZ", &sample_keys()).unwrap_err();
        assert!(matches!(err, CipherError::LengthMismatch(_)));
    }

    #[test]
    fn marker_only_is_length_mismatch() {
        let err = Aqimc::new().decrypt("E", &sample_keys()).unwrap_err();
        assert!(matches!(err, CipherError::LengthMismatch(_)));
    }

    #[test]
    fn letterless_input_names_field() {
        let engine = Aqimc::new();
        let err = engine.encrypt("1234", &sample_keys()).unwrap_err();
        assert!(err.to_string().starts_with("plaintext:"));
        let err = engine.decrypt("--", &sample_keys()).unwrap_err();
        assert!(err.to_string().starts_with("ciphertext:"));
    }
}
