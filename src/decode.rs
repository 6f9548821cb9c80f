//! ERC-1155 `TransferSingle` log decoding
//!
//! `TransferSingle(address indexed operator, address indexed from,
//! address indexed to, uint256 id, uint256 value)` puts the three addresses in
//! topics 1..=3 and packs `id ‖ value` into the data field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contribution::ContributionKind;

/// keccak256("TransferSingle(address,address,address,uint256,uint256)")
pub const TRANSFER_SINGLE_TOPIC: &str =
    "0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62";

const WORD_LEN: usize = 32;
const ADDRESS_LEN: usize = 20;

/// Raw log as returned by the explorer `getLogs` action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub topics: Vec<Option<String>>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

/// A badge mint: the zero address sent `quantity` units of `kind` to `recipient`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEvent {
    /// Lowercase `0x`-prefixed address
    pub recipient: String,
    pub kind: ContributionKind,
    /// Raw uint256 value word, when the log carries one
    pub quantity: Option<[u8; WORD_LEN]>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing topic {0}")]
    MissingTopic(usize),
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },
    #[error("{field} is {len} bytes, expected {expected}")]
    BadLength {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("not a mint (from {0})")]
    NotMint(String),
    #[error("token id outside contribution range")]
    UnknownKind,
}

impl DecodeError {
    /// Expected noise from unrelated contract activity, filtered without logging
    pub fn is_benign(&self) -> bool {
        matches!(self, DecodeError::NotMint(_) | DecodeError::UnknownKind)
    }
}

fn parse_hex(field: &'static str, value: &str) -> Result<Vec<u8>, DecodeError> {
    let stripped = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(stripped).map_err(|e| DecodeError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}

fn parse_word(field: &'static str, value: &str) -> Result<[u8; WORD_LEN], DecodeError> {
    let bytes = parse_hex(field, value)?;
    <[u8; WORD_LEN]>::try_from(bytes.as_slice()).map_err(|_| DecodeError::BadLength {
        field,
        len: bytes.len(),
        expected: WORD_LEN,
    })
}

fn topic<'a>(log: &'a LogEntry, index: usize) -> Result<&'a str, DecodeError> {
    log.topics
        .get(index)
        .and_then(|t| t.as_deref())
        .ok_or(DecodeError::MissingTopic(index))
}

/// Token id from a big-endian uint256; anything above u64 is out of range anyway
fn token_id(word: &[u8; WORD_LEN]) -> Option<u64> {
    if word[..WORD_LEN - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD_LEN - 8..]);
    Some(u64::from_be_bytes(low))
}

/// Decode one log into a mint of a known contribution kind.
pub fn decode_log(log: &LogEntry) -> Result<MintEvent, DecodeError> {
    let from = parse_word("from", topic(log, 2)?)?;
    if from.iter().any(|b| *b != 0) {
        return Err(DecodeError::NotMint(format!(
            "0x{}",
            hex::encode(&from[WORD_LEN - ADDRESS_LEN..])
        )));
    }

    let to = parse_word("to", topic(log, 3)?)?;

    // Only the id word is needed to score a mint
    let data = parse_hex("data", &log.data)?;
    if data.len() < WORD_LEN {
        return Err(DecodeError::BadLength {
            field: "data",
            len: data.len(),
            expected: WORD_LEN,
        });
    }

    let mut id = [0u8; WORD_LEN];
    id.copy_from_slice(&data[..WORD_LEN]);
    let quantity = data
        .get(WORD_LEN..WORD_LEN * 2)
        .and_then(|word| <[u8; WORD_LEN]>::try_from(word).ok());

    let kind = token_id(&id)
        .and_then(ContributionKind::from_token_id)
        .ok_or(DecodeError::UnknownKind)?;

    Ok(MintEvent {
        recipient: format!("0x{}", hex::encode(&to[WORD_LEN - ADDRESS_LEN..])),
        kind,
        quantity,
    })
}
