// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for duration parsing (Go-style duration format)

#[cfg(test)]
mod tests {
    use super::super::{format_duration, parse_duration};
    use std::time::Duration;

    // ========================================================================
    // Valid Duration Parsing Tests
    // ========================================================================

    #[test]
    fn test_parse_duration_bare_integer_is_seconds() {
        assert_eq!(
            parse_duration("120").unwrap(),
            Duration::from_secs(120),
            "bare integers should be read as seconds"
        );
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration(" 30 ").unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_duration_single_units() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("1w").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("15us").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_duration("15µs").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn test_parse_duration_chained_components() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::from_secs(5400),
            "1h30m should be 5400 seconds"
        );
        assert_eq!(
            parse_duration("2m30s500ms").unwrap(),
            Duration::from_millis(150_500)
        );
    }

    #[test]
    fn test_parse_duration_fraction() {
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_duration_bare_decimal_is_seconds() {
        assert_eq!(parse_duration("1.5").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(" 0.25 ").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("1.2.3").is_err());
        assert!(parse_duration(".").is_err());
    }

    // ========================================================================
    // Invalid Duration Tests
    // ========================================================================

    #[test]
    fn test_parse_duration_rejects_empty() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("   ").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_unknown_unit() {
        let err = parse_duration("10x").unwrap_err();
        assert!(err.to_string().contains("Unsupported duration unit 'x'"));
    }

    #[test]
    fn test_parse_duration_rejects_missing_value() {
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10s m").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_negative() {
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        assert!(parse_duration("99999999999999999999h").is_err());
        assert!(parse_duration("9999999999999w").is_err());
    }

    // ========================================================================
    // Formatting Tests
    // ========================================================================

    #[test]
    fn test_format_duration_round_trips_through_parser() {
        for duration in [
            Duration::from_secs(60),
            Duration::from_secs(0),
            Duration::from_millis(1500),
        ] {
            assert_eq!(parse_duration(&format_duration(duration)).unwrap(), duration);
        }
        assert_eq!(format_duration(Duration::from_secs(120)), "120s");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    }
}
