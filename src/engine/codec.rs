//! `UserApps` payload, protobuf-encoded as consumers of the store expect:
//!
//! ```text
//! message UserApps {
//!     repeated uint32 apps = 1 [packed=true];
//!     optional double lat = 2;
//!     optional double lon = 3;
//! }
//! ```

use crate::Record;

/// Value stored under `"{category}:{device_id}"`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct UserApps {
    #[prost(uint32, repeated, packed = "true", tag = "1")]
    pub apps: Vec<u32>,
    #[prost(double, optional, tag = "2")]
    pub lat: Option<f64>,
    #[prost(double, optional, tag = "3")]
    pub lon: Option<f64>,
}

impl From<&Record> for UserApps {
    fn from(r: &Record) -> Self {
        UserApps {
            apps: r.apps.clone(),
            lat: Some(r.lat),
            lon: Some(r.lon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    fn msg(apps: Vec<u32>, lat: f64, lon: f64) -> UserApps {
        UserApps {
            apps,
            lat: Some(lat),
            lon: Some(lon),
        }
    }

    #[test]
    fn known_bytes() {
        let enc = msg(vec![1, 300], 0.0, 0.0).encode_to_vec();
        // apps: key 0x0a, len 3, 0x01, 0xac 0x02
        assert_eq!(&enc[..5], &[0x0a, 0x03, 0x01, 0xac, 0x02]);
        assert_eq!(enc[5], 0x11);
        assert_eq!(enc[14], 0x19);
        assert_eq!(enc.len(), 5 + 9 + 9);
    }

    #[test]
    fn empty_apps_omit_field() {
        let enc = msg(vec![], 1.5, -2.5).encode_to_vec();
        assert_eq!(enc[0], 0x11);
        let dec = UserApps::decode(enc.as_slice()).unwrap();
        assert!(dec.apps.is_empty());
        assert_eq!(dec.lat, Some(1.5));
        assert_eq!(dec.lon, Some(-2.5));
    }

    #[test]
    fn decode_unpacked_apps_and_unknown_fields() {
        // apps=7 unpacked, field 9 varint 1, apps=8 unpacked
        let buf: &[u8] = &[0x08, 0x07, 0x48, 0x01, 0x08, 0x08];
        let dec = UserApps::decode(buf).unwrap();
        assert_eq!(dec.apps, vec![7, 8]);
        assert_eq!(dec.lat, None);
    }

    #[test]
    fn decode_truncated_fails() {
        let enc = msg(vec![1, 2, 3], 55.5, 37.5).encode_to_vec();
        assert!(UserApps::decode(&enc[..enc.len() - 1]).is_err());
    }
}
