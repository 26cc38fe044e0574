//! Row parsing: one TSV row → [`Record`].
//!
//! Lenient policy: a row with the right field count and non-empty category and
//! device id is always accepted. Coordinates that don't parse become 0.0; app ids
//! that don't parse are dropped from the list.

use anyhow::{Result, bail};
use csv::StringRecord;

use crate::Record;
use crate::utils::config::RowFormat;

/// Parse one scanned row. Fails only on a wrong field count or an empty key field.
pub fn parse_row(row: &StringRecord) -> Result<Record> {
    if row.len() != RowFormat::FIELD_COUNT {
        bail!(
            "expected {} fields, got {}",
            RowFormat::FIELD_COUNT,
            row.len()
        );
    }
    let field = |i: usize| row.get(i).unwrap_or("");

    let category = field(0);
    let device_id = field(1);
    if category.is_empty() || device_id.is_empty() {
        bail!("empty category or device id");
    }

    Ok(Record {
        category: category.to_string(),
        device_id: device_id.to_string(),
        lat: parse_coord(field(2)),
        lon: parse_coord(field(3)),
        apps: parse_apps(field(4)),
    })
}

fn parse_coord(s: &str) -> f64 {
    s.parse::<f64>().unwrap_or(0.0)
}

/// Comma-separated app ids; entries that are not a u32 are skipped.
pub fn parse_apps(s: &str) -> Vec<u32> {
    s.split(RowFormat::APPS_SEPARATOR)
        .filter_map(|a| a.parse::<u32>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn well_formed_row() {
        let r = parse_row(&row(&["idfa", "id1", "55.5", "37.5", "1,2,3"])).unwrap();
        assert_eq!(r.category, "idfa");
        assert_eq!(r.device_id, "id1");
        assert_eq!(r.lat, 55.5);
        assert_eq!(r.lon, 37.5);
        assert_eq!(r.apps, vec![1, 2, 3]);
        assert_eq!(r.key(), "idfa:id1");
    }

    #[test]
    fn bad_coords_default_to_zero() {
        let r = parse_row(&row(&["gaid", "x", "", "north", "7"])).unwrap();
        assert_eq!(r.lat, 0.0);
        assert_eq!(r.lon, 0.0);
        assert_eq!(r.apps, vec![7]);
    }

    #[test]
    fn bad_app_ids_are_dropped() {
        assert_eq!(parse_apps("1,a,,-3,4294967296,42"), vec![1, 42]);
        assert!(parse_apps("").is_empty());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert!(parse_row(&row(&["idfa", "id1", "1.0", "2.0"])).is_err());
        assert!(parse_row(&row(&["idfa", "id1", "1.0", "2.0", "1", "extra"])).is_err());
    }

    #[test]
    fn empty_key_fields_are_rejected() {
        assert!(parse_row(&row(&["", "id1", "1.0", "2.0", "1"])).is_err());
        assert!(parse_row(&row(&["idfa", "", "1.0", "2.0", "1"])).is_err());
    }
}
