// Wire-model to domain-model conversion.

use tabloctl_api::models::ChannelRecord;
use tracing::debug;

use crate::model::{ChannelEntry, ChannelKind};

/// Convert one guide record into a catalog entry.
///
/// Records with an unknown kind or no number block are dropped: they
/// cannot be tuned, so carrying them would only pollute lookups.
pub(crate) fn channel_entry(record: &ChannelRecord) -> Option<ChannelEntry> {
    let kind = match record.kind.as_str() {
        "ota" => ChannelKind::Ota,
        "ott" => ChannelKind::Ott,
        other => {
            debug!(identifier = %record.identifier, kind = other, "skipping unsupported channel kind");
            return None;
        }
    };
    let numbers = record.numbers()?;

    Some(ChannelEntry {
        identifier: record.identifier.clone(),
        number: numbers.display(),
        name: record.name.clone().unwrap_or_default(),
        call_sign: numbers.call_sign.clone().unwrap_or_default(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use tabloctl_api::models::{ChannelNumbers, ChannelRecord};

    use super::*;

    fn record(kind: &str) -> ChannelRecord {
        ChannelRecord {
            identifier: "A1".into(),
            name: Some("KTVU".into()),
            kind: kind.into(),
            ota: Some(ChannelNumbers {
                major: 2,
                minor: 1,
                call_sign: Some("KTVU".into()),
            }),
            ott: None,
        }
    }

    #[test]
    fn ota_record_converts() {
        let entry = channel_entry(&record("ota")).expect("converts");
        assert_eq!(entry.number, "2.1");
        assert_eq!(entry.kind, ChannelKind::Ota);
        assert_eq!(entry.call_sign, "KTVU");
    }

    #[test]
    fn unknown_kind_is_dropped() {
        assert!(channel_entry(&record("vod")).is_none());
    }

    #[test]
    fn kind_without_matching_numbers_is_dropped() {
        // Kind says OTT but only an OTA block is present.
        assert!(channel_entry(&record("ott")).is_none());
    }
}
