//! Producer Type
//!
//! Selects which [`Sequencer`](crate::disruptor::Sequencer) variant is built
//! from configuration.

use serde::{Deserialize, Serialize};

/// Whether one thread or many will claim and publish sequences
///
/// # Examples
/// ```
/// use ringlane::disruptor::ProducerType;
///
/// assert!(ProducerType::Single.is_single());
/// assert!(ProducerType::Multi.is_multi());
/// assert_eq!(ProducerType::default(), ProducerType::Multi);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProducerType {
    /// Exactly one publishing thread
    ///
    /// Claiming needs no compare-and-set. The single-thread requirement is a
    /// caller contract and is not checked.
    Single,

    /// Any number of publishing threads
    ///
    /// The default, since it stays correct whatever the caller does.
    #[default]
    Multi,
}

impl ProducerType {
    pub fn is_single(&self) -> bool {
        matches!(self, ProducerType::Single)
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ProducerType::Multi)
    }
}

impl std::fmt::Display for ProducerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProducerType::Single => write!(f, "single"),
            ProducerType::Multi => write!(f, "multi"),
        }
    }
}

impl std::str::FromStr for ProducerType {
    type Err = String;

    /// Accepts `single` or `multi` in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(ProducerType::Single),
            "multi" => Ok(ProducerType::Multi),
            _ => Err(format!(
                "Invalid producer type: '{s}'. Valid values are 'single' or 'multi'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_producer_type_predicates() {
        assert!(ProducerType::Single.is_single());
        assert!(!ProducerType::Single.is_multi());
        assert!(ProducerType::Multi.is_multi());
        assert!(!ProducerType::Multi.is_single());
    }

    #[test]
    fn test_producer_type_default() {
        assert_eq!(ProducerType::default(), ProducerType::Multi);
    }

    #[test]
    fn test_producer_type_parse_and_display() {
        assert_eq!(ProducerType::from_str("SINGLE").unwrap(), ProducerType::Single);
        assert_eq!(ProducerType::from_str("multi").unwrap(), ProducerType::Multi);
        assert!(ProducerType::from_str("dual").is_err());

        for producer_type in [ProducerType::Single, ProducerType::Multi] {
            let text = producer_type.to_string();
            assert_eq!(ProducerType::from_str(&text).unwrap(), producer_type);
        }
    }

    #[test]
    fn test_producer_type_serde() {
        assert_eq!(serde_json::to_string(&ProducerType::Single).unwrap(), "\"single\"");
        let parsed: ProducerType = serde_json::from_str("\"multi\"").unwrap();
        assert_eq!(parsed, ProducerType::Multi);
        assert!(serde_json::from_str::<ProducerType>("\"both\"").is_err());
    }
}
