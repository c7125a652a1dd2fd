//! Snapshot serialization.
//!
//! A snapshot is a newline separated run of JSON values:
//!
//! ```text
//! "Peerkeep Node List"
//! "1.0.0"
//! "<hex sha256 of the payload>"
//! [
//!   "10.0.0.1:9981"
//! ]
//! ```
//!
//! The header and version are checked before anything else is looked at,
//! so a file written by some other program or by an incompatible release
//! is reported as such rather than as generic corruption.

use serde_json::{Deserializer, Value};
use sha2::{Digest, Sha256};

use crate::error::PersistError;
use crate::types::{Address, AddressSet, FormatMetadata};

#[derive(Debug, Clone, Copy)]
pub struct SnapshotCodec {
    metadata: FormatMetadata,
}

impl SnapshotCodec {
    pub fn new(metadata: FormatMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> FormatMetadata {
        self.metadata
    }

    pub fn encode(&self, nodes: &AddressSet) -> Vec<u8> {
        let mut sorted: Vec<&Address> = nodes.iter().collect();
        sorted.sort();
        let payload = Value::Array(
            sorted
                .into_iter()
                .map(|addr| Value::from(addr.as_str()))
                .collect(),
        );
        let payload = format!("{:#}", payload);
        let checksum = hex::encode(Sha256::digest(payload.as_bytes()));

        format!(
            "{}\n{}\n{}\n{}\n",
            Value::from(self.metadata.header),
            Value::from(self.metadata.version),
            Value::from(checksum),
            payload
        )
        .into_bytes()
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<AddressSet, PersistError> {
        let mut values = Deserializer::from_slice(bytes).into_iter::<Value>();

        let header = next_string(&mut values);
        if header.as_deref() != Some(self.metadata.header) {
            return Err(PersistError::Format {
                expected: self.metadata.header.to_string(),
                found: header,
            });
        }

        let version = next_string(&mut values);
        if version.as_deref() != Some(self.metadata.version) {
            return Err(PersistError::VersionMismatch {
                expected: self.metadata.version.to_string(),
                found: version,
            });
        }

        let checksum = next_string(&mut values)
            .ok_or_else(|| PersistError::Corrupt("missing payload checksum".into()))?;

        let rest = &bytes[values.byte_offset()..];
        let payload = std::str::from_utf8(rest)
            .map_err(|e| PersistError::Corrupt(e.to_string()))?
            .trim();

        let actual = hex::encode(Sha256::digest(payload.as_bytes()));
        if actual != checksum {
            return Err(PersistError::Corrupt(format!(
                "checksum mismatch: recorded {}, computed {}",
                checksum, actual
            )));
        }

        let nodes: Vec<Address> =
            serde_json::from_str(payload).map_err(|e| PersistError::Corrupt(e.to_string()))?;
        Ok(nodes.into_iter().collect())
    }
}

fn next_string<I>(values: &mut I) -> Option<String>
where
    I: Iterator<Item = serde_json::Result<Value>>,
{
    match values.next() {
        Some(Ok(Value::String(s))) => Some(s),
        _ => None,
    }
}
