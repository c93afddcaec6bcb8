//! Configuration-name keyed store of calibrated mixture pairs.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::codec;
use crate::{MixtureError, MixtureRecord, MixtureRecordPair};

/// Read-only mapping from configuration name to its calibrated pair.
///
/// Built once from calibration records (or their compact encoding) and rebuilt wholesale on
/// reload.
#[derive(Debug, Clone)]
pub struct MixtureStore {
    pairs: BTreeMap<String, MixtureRecordPair>,
    serialized: String,
    disabled: MixtureRecordPair,
}

impl MixtureStore {
    /// Group `records` by name and pair them.
    ///
    /// Every name must appear exactly twice. The compact encoding is produced from the records
    /// in their original order.
    pub fn build(records: Vec<MixtureRecord>) -> Result<Self, MixtureError> {
        let serialized = codec::encode_records(&records)?;

        let mut order: Vec<String> = Vec::new();
        let mut grouped: BTreeMap<String, Vec<MixtureRecord>> = BTreeMap::new();
        for record in records {
            if !grouped.contains_key(&record.name) {
                order.push(record.name.clone());
            }
            grouped.entry(record.name.clone()).or_default().push(record);
        }

        let mut pairs = BTreeMap::new();
        for name in order {
            let group = grouped.remove(&name).unwrap_or_default();
            let count = group.len();
            let [a, b]: [MixtureRecord; 2] = group
                .try_into()
                .map_err(|_| MixtureError::MalformedCalibration {
                    name: name.clone(),
                    count,
                })?;
            let pair = MixtureRecordPair::new(a, b);
            if let Some((low, high)) = pair.range() {
                debug!("configuration '{name}': ratio {low} .. {high}");
            }
            pairs.insert(name, pair);
        }

        info!("built mixture store with {} configuration(s)", pairs.len());
        Ok(Self {
            pairs,
            serialized,
            disabled: MixtureRecordPair::disabled(),
        })
    }

    /// Rebuild a store from its compact encoding.
    pub fn deserialize(text: &str) -> Result<Self, MixtureError> {
        let records = codec::decode_records(text)?;
        debug!("deserialized {} mixture record(s)", records.len());
        Self::build(records)
    }

    /// Compact encoding of the records this store was built from.
    pub fn serialized(&self) -> &str {
        &self.serialized
    }

    /// Pair for `name`, or a disabled sentinel when unknown.
    pub fn lookup(&self, name: &str) -> &MixtureRecordPair {
        self.pairs.get(name).unwrap_or(&self.disabled)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.contains_key(name)
    }

    pub fn config_names(&self) -> impl Iterator<Item = &str> {
        self.pairs.keys().map(String::as_str)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &MixtureRecordPair)> {
        self.pairs.iter().map(|(name, pair)| (name.as_str(), pair))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
