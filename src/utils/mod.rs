//! Small shared helpers: wire encoding of byte fields and the protocol clock.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in Unix milliseconds, the unit of every protocol timestamp.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Current time in whole Unix seconds.
pub fn unix_secs() -> i64 {
    unix_millis() / 1000
}

/// Serde adapter for `Option<Vec<u8>>` fields carried as standard base64 strings.
///
/// Use with `#[serde(default, with = "serde_base64")]`.
pub mod serde_base64 {
    use base64::prelude::*;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&BASE64_STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) if !s.is_empty() => BASE64_STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Frame {
        #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_base64")]
        data: Option<Vec<u8>>,
    }

    #[test]
    fn test_unix_secs_matches_millis() {
        let secs = unix_secs();
        assert!(secs > 1_577_836_800 && secs < 100_000_000_000);
        assert!((unix_millis() / 1000 - secs).abs() <= 1);
    }

    #[test]
    fn test_unix_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_base64_field() {
        let frame = Frame {
            data: Some(b"hello".to_vec()),
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"data":"aGVsbG8="}"#);
        assert_eq!(serde_json::from_str::<Frame>(&json).unwrap(), frame);
    }

    #[test]
    fn test_base64_field_absent_or_empty() {
        assert_eq!(serde_json::from_str::<Frame>("{}").unwrap().data, None);
        assert_eq!(
            serde_json::from_str::<Frame>(r#"{"data":""}"#).unwrap().data,
            None
        );
        assert!(serde_json::from_str::<Frame>(r#"{"data":"***"}"#).is_err());
    }
}
