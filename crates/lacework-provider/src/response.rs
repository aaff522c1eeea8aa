//! Single-record response validation
//!
//! Create and update address exactly one integration, yet the API answers
//! with a data array. Anything other than one record is a contract violation.

use crate::error::{ProviderError, Result};
use lacework_api::Integration;

/// Take the only record of a create/update response.
pub fn single_record<D>(records: Vec<Integration<D>>) -> Result<Integration<D>> {
    match records.len() {
        0 => Err(ProviderError::EmptyResponse),
        1 => records.into_iter().next().ok_or(ProviderError::EmptyResponse),
        _ => Err(ProviderError::MultipleRecords {
            records: records
                .into_iter()
                .map(|r| (r.guid, r.name))
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacework_api::IntegrationType;
    use serde_json::json;

    fn record(guid: &str, name: &str) -> Integration {
        Integration::new(name, IntegrationType::Webhook, json!({})).with_guid(guid)
    }

    #[test]
    fn test_empty() {
        let err = single_record::<serde_json::Value>(vec![]).unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
        let message = err.to_string();
        assert!(message.contains("unexpected empty response"));
        assert!(message.contains(crate::error::SUPPORT_URL));
    }

    #[test]
    fn test_multiple_lists_every_pair() {
        let err = single_record(vec![
            record("GUID_A", "first"),
            record("GUID_B", "second"),
            record("GUID_C", "third"),
        ])
        .unwrap_err();

        let message = err.to_string();
        for (guid, name) in [("GUID_A", "first"), ("GUID_B", "second"), ("GUID_C", "third")] {
            assert!(message.contains(&format!("guid: {}, name: {}", guid, name)));
        }
        assert!(message.contains(crate::error::SUPPORT_URL));
    }

    #[test]
    fn test_exactly_one() {
        let only = single_record(vec![record("GUID_A", "only")]).unwrap();
        assert_eq!(only.guid, "GUID_A");
        assert_eq!(only.name, "only");
    }
}
