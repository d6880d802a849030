//! Property-based tests for statistics and report helpers.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use benchdiff::core::types::Oid;
use benchdiff::report::{csv_to_markdown, normalize_float};
use benchdiff::stats::delta::{mann_whitney_u, welch_t_test};
use benchdiff::stats::{Metrics, Scaler};

/// Strategy for generating valid hex OIDs.
fn valid_oid_string() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
        ]),
        40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Plausible benchmark samples.
fn samples() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1f64..1e9, 1..25)
}

proptest! {
    /// Any valid OID round-trips through serde.
    #[test]
    fn oid_serde_roundtrip(oid_str in valid_oid_string()) {
        let oid = Oid::new(&oid_str).unwrap();
        let json = serde_json::to_string(&oid).unwrap();
        let parsed: Oid = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(oid, parsed);
    }

    /// OIDs are normalized to lowercase.
    #[test]
    fn oid_normalized_to_lowercase(oid_str in valid_oid_string()) {
        let oid = Oid::new(oid_str.to_uppercase()).unwrap();
        prop_assert_eq!(oid.as_str(), oid_str.as_str());
    }

    /// Normalizing a fixed-precision number keeps its value exactly.
    #[test]
    fn normalize_float_preserves_value(x in -1e12f64..1e12) {
        let fixed = format!("{:.6}", x);
        let normalized = normalize_float(&fixed);
        prop_assert_eq!(normalized.parse::<f64>().unwrap(), fixed.parse::<f64>().unwrap());
        prop_assert!(normalized.len() <= fixed.len());
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn normalize_float_idempotent(s in "[-+]?[0-9]{0,6}(\\.[0-9]{0,6})?%?") {
        let once = normalize_float(&s);
        prop_assert_eq!(normalize_float(&once), once.clone());
    }

    /// Every CSV row becomes exactly one Markdown row.
    #[test]
    fn markdown_row_count(rows in prop::collection::vec(prop::collection::vec("[a-z0-9.]{1,8}", 1..5), 1..10)) {
        let csv: String = rows.iter().map(|r| format!("{}\n", r.join(","))).collect();
        let tables = csv_to_markdown(&csv).unwrap();
        prop_assert_eq!(tables.len(), 1);
        // header + separator + body rows
        prop_assert_eq!(tables[0].lines().count(), rows.len() + 1);
    }

    /// The U-test p-value is a probability.
    #[test]
    fn utest_p_in_unit_interval(x in samples(), y in samples()) {
        if let Ok(p) = mann_whitney_u(&x, &y) {
            prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
        }
    }

    /// The U-test is symmetric in its arguments.
    #[test]
    fn utest_symmetric(x in samples(), y in samples()) {
        match (mann_whitney_u(&x, &y), mann_whitney_u(&y, &x)) {
            (Ok(a), Ok(b)) => prop_assert!((a - b).abs() < 1e-9),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "asymmetric outcome"),
        }
    }

    /// Welch's t-test p-value is a probability.
    #[test]
    fn ttest_p_in_unit_interval(x in samples(), y in samples()) {
        if let Ok(p) = welch_t_test(&x, &y) {
            prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
        }
    }

    /// Outlier removal keeps the mean inside the sample range.
    #[test]
    fn metrics_mean_within_bounds(values in samples()) {
        let m = Metrics::new("ns/op", values.clone());
        prop_assert!(!m.rvalues.is_empty());
        prop_assert!(m.rvalues.iter().all(|v| values.contains(v)));
        prop_assert!(m.min <= m.mean * (1.0 + 1e-12) && m.mean <= m.max * (1.0 + 1e-12));
    }

    /// Scaled values always render with a unit suffix.
    #[test]
    fn scaler_renders_suffix(x in 0.001f64..1e13) {
        let scaler = Scaler::new(x, "ns/op");
        let text = scaler.format(x);
        prop_assert!(text.ends_with('s'), "{}", text);
        prop_assert!(text.chars().next().unwrap().is_ascii_digit(), "{}", text);
    }
}
