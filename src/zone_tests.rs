// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for zone and subdomain resolution.

#[cfg(test)]
mod tests {
    use crate::errors::ZoneError;
    use crate::zone::*;

    // ========================================================================
    // Candidate Walk Tests
    // ========================================================================

    #[test]
    fn test_candidate_zones_longest_first() {
        assert_eq!(
            candidate_zones("_acme-challenge.foo.bar.example.com."),
            vec![
                "_acme-challenge.foo.bar.example.com",
                "foo.bar.example.com",
                "bar.example.com",
                "example.com",
                "com",
            ]
        );
    }

    #[test]
    fn test_candidate_zones_of_root_is_empty() {
        assert!(candidate_zones(".").is_empty());
        assert!(candidate_zones("").is_empty());
    }

    // ========================================================================
    // Longest Match Tests
    // ========================================================================

    #[test]
    fn test_longest_match_wins() {
        let zones = vec![Zone::named("example.com"), Zone::named("bar.example.com")];

        let resolved = resolve("_acme-challenge.foo.bar.example.com.", &zones).unwrap();

        assert_eq!(resolved.zone.name, "bar.example.com");
        assert_eq!(resolved.subdomain, "_acme-challenge.foo");
    }

    #[test]
    fn test_longest_match_independent_of_listing_order() {
        let forward = vec![Zone::named("example.com"), Zone::named("b.example.com")];
        let reverse = vec![Zone::named("b.example.com"), Zone::named("example.com")];
        let fqdn = "_acme-challenge.sub.b.example.com.";

        assert_eq!(
            find_longest_match(fqdn, &forward).unwrap(),
            find_longest_match(fqdn, &reverse).unwrap()
        );
    }

    #[test]
    fn test_suffix_without_label_boundary_does_not_match() {
        let zones = vec![Zone::named("ample.com")];

        let err = find_longest_match("_acme-challenge.example.com.", &zones).unwrap_err();

        assert!(matches!(err, ZoneError::NotFound { .. }));
    }

    #[test]
    fn test_match_is_case_insensitive_and_keeps_zone_id() {
        let zones = vec![Zone::with_id("Example.COM.", "42")];

        let zone = find_longest_match("_acme-challenge.www.example.com.", &zones).unwrap();

        assert_eq!(zone.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_identical_duplicates_are_not_ambiguous() {
        let zones = vec![Zone::with_id("example.com", "1"), Zone::with_id("example.com", "1")];

        assert!(find_longest_match("_acme-challenge.example.com.", &zones).is_ok());
    }

    #[test]
    fn test_equal_length_tie_is_ambiguous() {
        let zones = vec![Zone::with_id("example.com", "1"), Zone::with_id("EXAMPLE.com", "2")];

        let err = find_longest_match("_acme-challenge.example.com.", &zones).unwrap_err();

        assert_eq!(
            err,
            ZoneError::Ambiguous {
                zone: "example.com".to_string()
            }
        );
    }

    #[test]
    fn test_shorter_duplicates_do_not_matter_when_longer_zone_matches() {
        let zones = vec![
            Zone::with_id("example.com", "1"),
            Zone::with_id("example.com", "2"),
            Zone::with_id("bar.example.com", "3"),
        ];

        let zone = find_longest_match("_acme-challenge.bar.example.com.", &zones).unwrap();

        assert_eq!(zone.id.as_deref(), Some("3"));
    }

    // ========================================================================
    // Subdomain Extraction Tests
    // ========================================================================

    #[test]
    fn test_extract_subdomain_apex_is_empty() {
        assert_eq!(extract_subdomain("example.com.", "example.com").unwrap(), "");
        assert_eq!(extract_subdomain("Example.com", "example.com.").unwrap(), "");
    }

    #[test]
    fn test_extract_subdomain_preserves_label_case() {
        assert_eq!(
            extract_subdomain("_acme-challenge.WWW.example.com.", "EXAMPLE.com").unwrap(),
            "_acme-challenge.WWW"
        );
    }

    #[test]
    fn test_extract_subdomain_rejects_outside_zone() {
        for (fqdn, zone) in [
            ("_acme-challenge.example.org.", "example.com"),
            ("_acme-challenge.myexample.com.", "example.com"),
            ("com.", "example.com"),
            ("example.com.", ""),
        ] {
            let err = extract_subdomain(fqdn, zone).unwrap_err();
            assert!(
                matches!(err, ZoneError::OutsideZone { .. }),
                "{fqdn} in {zone} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolved_zone_within_selected_zone() {
        let resolved =
            ResolvedZone::within("_acme-challenge.Foo.example.com.", Zone::named("example.com"))
                .unwrap();
        assert_eq!(resolved.zone.name, "example.com");
        assert_eq!(resolved.subdomain, "_acme-challenge.Foo");

        let err =
            ResolvedZone::within("_acme-challenge.example.org.", Zone::named("example.com"))
                .unwrap_err();
        assert!(matches!(err, ZoneError::OutsideZone { .. }));
    }

    // ========================================================================
    // Resolver Trait Tests
    // ========================================================================

    #[tokio::test]
    async fn test_static_zones_resolver() {
        let resolver = StaticZones::from_names(&["example.com", "bar.example.com"]);

        let zone = resolver
            .find_zone("_acme-challenge.foo.bar.example.com.")
            .await
            .unwrap();
        assert_eq!(zone.name, "bar.example.com");

        let err = resolver
            .find_zone("_acme-challenge.example.net.")
            .await
            .unwrap_err();
        assert!(matches!(err, ZoneError::NotFound { .. }));
    }
}
