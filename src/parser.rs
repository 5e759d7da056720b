//! Biometric record parsing
//!
//! Records are comma-separated `key:value` fields, e.g. `BPM:72,SpO2:98`.
//! Keys are matched by case-sensitive substring; malformed fields are skipped
//! individually and a record with no recognized field yields `None`. Parsing
//! never fails hard.

use crate::types::Reading;

/// Decode one framed record into a reading.
pub fn parse_record(record: &str) -> Option<Reading> {
    let record = record.trim();
    if record.is_empty() {
        return None;
    }

    let mut reading = Reading::default();
    let mut recognized = false;

    for field in record.split(',') {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let Ok(value) = value.parse::<f64>() else {
            continue;
        };

        if key.contains("BPM") || key.contains("HR") {
            reading.heart_rate = value.max(0.0);
            recognized = true;
        } else if key.contains("SpO2") || key.contains("O2") {
            reading.spo2 = value.clamp(0.0, 100.0);
            recognized = true;
        } else if key.contains("BEAT") {
            reading.beat = value > 0.0;
            recognized = true;
        }
    }

    recognized.then_some(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_typical_record() {
        assert_eq!(
            parse_record("BPM:72,SpO2:98"),
            Some(Reading {
                heart_rate: 72.0,
                spo2: 98.0,
                beat: false,
            })
        );
    }

    #[test]
    fn test_parse_garbage_yields_none() {
        assert_eq!(parse_record("garbage"), None);
        assert_eq!(parse_record(""), None);
        assert_eq!(parse_record("   "), None);
        assert_eq!(parse_record("TEMP:36.6,PRESSURE:1013"), None);
    }

    #[test]
    fn test_malformed_fields_skipped_individually() {
        // Missing value, missing key, non-numeric value: each skipped alone.
        assert_eq!(
            parse_record("BPM:,:98,SpO2:abc,HR:64"),
            Some(Reading {
                heart_rate: 64.0,
                spo2: 0.0,
                beat: false,
            })
        );
    }

    #[test]
    fn test_explicit_beat_flag() {
        let reading = parse_record("BEAT:1").unwrap();
        assert!(reading.beat);
        assert_eq!(reading.heart_rate, 0.0);

        let reading = parse_record("BEAT:0,BPM:70").unwrap();
        assert!(!reading.beat);
        assert_eq!(reading.heart_rate, 70.0);
    }

    #[test]
    fn test_substring_key_matching() {
        // Firmware variants prefix or suffix the recognized tokens.
        let reading = parse_record("sensorBPM:80,rawSpO2:95").unwrap();
        assert_eq!(reading.heart_rate, 80.0);
        assert_eq!(reading.spo2, 95.0);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let reading = parse_record("BPM:-10,SpO2:150").unwrap();
        assert_eq!(reading.heart_rate, 0.0);
        assert_eq!(reading.spo2, 100.0);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let reading = parse_record("  BPM : 72 , SpO2 : 98  ").unwrap();
        assert_eq!(reading.heart_rate, 72.0);
        assert_eq!(reading.spo2, 98.0);
    }
}
