//! Wire contract for request layers (HTTP, CLI `--format json`).
//!
//! Encrypt request:
//!   `{ plaintext, key1, key2, key3, key4 }`
//! Decrypt request:
//!   `{ ciphertext, key1, key2, key3, key4 }`
//!
//! Success:
//!   `{ success: true, encrypted_text | decrypted_text, steps: { DKSS, NRPE, VBMD, KDPP } }`
//! Failure:
//!   `{ success: false, error }`
//!
//! Missing request fields deserialize as empty strings and are rejected by
//! validation, so callers always get the structured failure shape.

use serde::{Deserialize, Serialize};

use crate::engine::{Aqimc, CipherOutput};
use crate::error::CipherError;
use crate::keys::KeySchedule;
use crate::trace::Trace;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptRequest {
    #[serde(default)]
    pub plaintext: String,
    #[serde(default)]
    pub key1: String,
    #[serde(default)]
    pub key2: String,
    #[serde(default)]
    pub key3: String,
    #[serde(default)]
    pub key4: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptRequest {
    #[serde(default)]
    pub ciphertext: String,
    #[serde(default)]
    pub key1: String,
    #[serde(default)]
    pub key2: String,
    #[serde(default)]
    pub key3: String,
    #[serde(default)]
    pub key4: String,
}

/// Response body for both operations; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CipherResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Trace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CipherResponse {
    pub fn encrypted(out: CipherOutput) -> Self {
        Self {
            success: true,
            encrypted_text: Some(out.text),
            decrypted_text: None,
            steps: Some(out.trace),
            error: None,
        }
    }

    pub fn decrypted(out: CipherOutput) -> Self {
        Self {
            success: true,
            encrypted_text: None,
            decrypted_text: Some(out.text),
            steps: Some(out.trace),
            error: None,
        }
    }

    pub fn failure(err: &CipherError) -> Self {
        Self::failure_message(err.to_string())
    }

    pub fn failure_message(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            encrypted_text: None,
            decrypted_text: None,
            steps: None,
            error: Some(msg.into()),
        }
    }
}

/// Trimmed field values must be non-empty.
fn require_present<'a>(fields: [(&str, &'a str); 5]) -> Result<[&'a str; 5], CipherError> {
    let mut out = [""; 5];
    for (slot, (name, value)) in out.iter_mut().zip(fields) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CipherError::invalid("must be a non-empty string").for_field(name));
        }
        *slot = trimmed;
    }
    Ok(out)
}

impl EncryptRequest {
    /// Validate and run.
    pub fn execute(&self, engine: &Aqimc) -> Result<CipherOutput, CipherError> {
        let [text, k1, k2, k3, k4] = require_present([
            ("plaintext", self.plaintext.as_str()),
            ("key1", self.key1.as_str()),
            ("key2", self.key2.as_str()),
            ("key3", self.key3.as_str()),
            ("key4", self.key4.as_str()),
        ])?;
        let keys = KeySchedule::derive(k1, k2, k3, k4)?;
        engine.encrypt(text, &keys)
    }

    pub fn respond(&self, engine: &Aqimc) -> CipherResponse {
        match self.execute(engine) {
            Ok(out) => CipherResponse::encrypted(out),
            Err(e) => CipherResponse::failure(&e),
        }
    }
}

impl DecryptRequest {
    pub fn execute(&self, engine: &Aqimc) -> Result<CipherOutput, CipherError> {
        let [text, k1, k2, k3, k4] = require_present([
            ("ciphertext", self.ciphertext.as_str()),
            ("key1", self.key1.as_str()),
            ("key2", self.key2.as_str()),
            ("key3", self.key3.as_str()),
            ("key4", self.key4.as_str()),
        ])?;
        let keys = KeySchedule::derive(k1, k2, k3, k4)?;
        engine.decrypt(text, &keys)
    }

    pub fn respond(&self, engine: &Aqimc) -> CipherResponse {
        match self.execute(engine) {
            Ok(out) => CipherResponse::decrypted(out),
            Err(e) => CipherResponse::failure(&e),
        }
    }
}

/// Fixed keys used by the self-test.
pub const SAMPLE_KEYS: [&str; 4] = ["KEYA", "KEYB", "MATRIX", "PERMUTE"];

/// Plaintext used by the self-test.
pub const SAMPLE_PLAINTEXT: &str = "HELLO";

/// Result of encrypting and decrypting [`SAMPLE_PLAINTEXT`] under
/// [`SAMPLE_KEYS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfTestReport {
    pub success: bool,
    pub message: String,
    pub test_plaintext: String,
    pub encrypted: String,
    pub decrypted: String,
    #[serde(rename = "match")]
    pub matches: bool,
}

pub fn self_test(engine: &Aqimc) -> Result<SelfTestReport, CipherError> {
    let [k1, k2, k3, k4] = SAMPLE_KEYS;
    let keys = KeySchedule::derive(k1, k2, k3, k4)?;
    let encrypted = engine.encrypt(SAMPLE_PLAINTEXT, &keys)?.text;
    let decrypted = engine.decrypt(&encrypted, &keys)?.text;
    let matches = decrypted == SAMPLE_PLAINTEXT;
    Ok(SelfTestReport {
        success: true,
        message: if matches {
            "System is working correctly".into()
        } else {
            "AQIMC round trip produced different text".into()
        },
        test_plaintext: SAMPLE_PLAINTEXT.into(),
        encrypted,
        decrypted,
        matches,
    })
}
