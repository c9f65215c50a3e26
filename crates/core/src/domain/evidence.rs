use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

#[derive(Serialize)]
struct RankedEntry<'a> {
    name: &'a str,
    count: u64,
}

/// Rankings serialize as `[{name, count}]` so their order survives JSON maps that sort keys.
pub(crate) fn serialize_ranked<S: Serializer>(
    entries: &[(String, u64)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(
        entries.iter().map(|(name, count)| RankedEntry { name: name.as_str(), count: *count }),
    )
}

/// One grounded fact computed from the dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum EvidenceValue {
    Count(u64),
    Percentage(f64),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Breakdown(Vec<(String, u64)>),
}

impl EvidenceValue {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_percentage(&self) -> Option<f64> {
        match self {
            Self::Percentage(value) => Some(*value),
            _ => None,
        }
    }
}

impl Serialize for EvidenceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(value) => serializer.serialize_u64(*value),
            Self::Percentage(value) | Self::Number(value) => serializer.serialize_f64(*value),
            Self::Text(value) => serializer.serialize_str(value),
            Self::List(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Breakdown(entries) => serialize_ranked(entries, serializer),
        }
    }
}

/// Ordered metric-name to value map. Insertion order is preserved on output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evidence {
    entries: Vec<(String, EvidenceValue)>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: EvidenceValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Replaces an existing entry in place so ordering stays stable.
    pub fn insert(&mut self, key: impl Into<String>, value: EvidenceValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    pub fn count(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(EvidenceValue::as_count)
    }

    pub fn percentage(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(EvidenceValue::as_percentage)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EvidenceValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Evidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Evidence, EvidenceValue};

    #[test]
    fn serializes_in_insertion_order() {
        let evidence = Evidence::new()
            .with("total_titles", EvidenceValue::Count(1000))
            .with("matching_titles", EvidenceValue::Count(200))
            .with("percentage", EvidenceValue::Percentage(20.0))
            .with(
                "top_genres",
                EvidenceValue::Breakdown(vec![("Dramas".to_owned(), 30), ("Action".to_owned(), 2)]),
            );

        let json = serde_json::to_string(&evidence).expect("serialize evidence");
        assert_eq!(
            json,
            r#"{"total_titles":1000,"matching_titles":200,"percentage":20.0,"top_genres":[{"name":"Dramas","count":30},{"name":"Action","count":2}]}"#
        );
    }

    #[test]
    fn insert_replaces_existing_key_without_reordering() {
        let mut evidence = Evidence::new()
            .with("a", EvidenceValue::Count(1))
            .with("b", EvidenceValue::Text("x".to_owned()));
        evidence.insert("a", EvidenceValue::Count(5));

        assert_eq!(evidence.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(evidence.count("a"), Some(5));
        assert_eq!(evidence.percentage("a"), None);
    }
}
