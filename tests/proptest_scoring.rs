//! Property-based tests for candidate scoring and BOM reconciliation.
//!
//! Ensures scores stay in range and that reconciliation is monotonic and
//! idempotent across random manifests and BOMs.

use proptest::prelude::*;
use sbomgen::{
    model::{Bom, Component, DeclaredManifest, Metadata, PackageCoordinate},
    reconcile::{similarity, version_similarity, BomReconciler, INELIGIBLE},
};

fn coordinate(name: &str, version: &str) -> PackageCoordinate {
    PackageCoordinate::maven("org.acme", name, Some(version.to_string()), Some("jar"), None)
}

fn coordinate_strategy() -> impl Strategy<Value = PackageCoordinate> {
    (
        prop::sample::select(vec!["core", "util", "lib", "api"]),
        "[0-3]\\.[0-3]\\.[0-3]",
    )
        .prop_map(|(name, version)| coordinate(name, &version))
}

fn distinct(coordinates: Vec<PackageCoordinate>) -> Vec<PackageCoordinate> {
    let mut out: Vec<PackageCoordinate> = Vec::new();
    for c in coordinates {
        if !out.iter().any(|o| o.matches_exactly(&c)) {
            out.push(c);
        }
    }
    out
}

fn bom_of(components: &[PackageCoordinate]) -> Bom {
    let root = PackageCoordinate::maven("org.acme", "app", Some("1.0".to_string()), Some("pom"), None);
    Bom {
        metadata: Some(Metadata {
            component: Some(Component::library(&root)),
            ..Metadata::default()
        }),
        components: components.iter().map(Component::library).collect(),
        ..Bom::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn version_score_in_range(a in "\\PC{0,20}", b in "\\PC{0,20}") {
        let score = version_similarity(Some(a.as_str()), Some(b.as_str()));
        prop_assert!((0..=6).contains(&score));
        prop_assert_eq!(score, version_similarity(Some(b.as_str()), Some(a.as_str())));
    }

    #[test]
    fn similarity_in_range(a in coordinate_strategy(), b in coordinate_strategy()) {
        let score = similarity(&a, &b);
        prop_assert!(score == INELIGIBLE || (0..=6).contains(&score));
        prop_assert_eq!(score, similarity(&a, &b));
        if a.name != b.name {
            prop_assert_eq!(score, INELIGIBLE);
        }
    }

    #[test]
    fn identical_coordinates_score_highest(c in coordinate_strategy()) {
        prop_assert_eq!(similarity(&c, &c), 6);
    }

    #[test]
    fn reconcile_never_removes_components(
        declared in prop::collection::vec(coordinate_strategy(), 0..8),
        generated in prop::collection::vec(coordinate_strategy(), 0..8),
    ) {
        let manifest = DeclaredManifest { root: None, dependencies: distinct(declared) };
        let bom = bom_of(&distinct(generated));

        let (reconciled, report) = BomReconciler::new().reconcile(&manifest, &bom);

        prop_assert!(reconciled.components.len() >= bom.components.len());
        prop_assert_eq!(&reconciled.components[..bom.components.len()], &bom.components[..]);
        prop_assert_eq!(
            reconciled.components.len(),
            bom.components.len() + report.added.len()
        );
        if !report.fast_path {
            prop_assert_eq!(
                report.matched + report.added.len() + report.skipped.len(),
                manifest.len()
            );
        }
    }

    #[test]
    fn reconcile_is_idempotent(
        declared in prop::collection::vec(coordinate_strategy(), 0..8),
        generated in prop::collection::vec(coordinate_strategy(), 0..8),
    ) {
        let manifest = DeclaredManifest { root: None, dependencies: distinct(declared) };
        let bom = bom_of(&distinct(generated));
        let engine = BomReconciler::new();

        let (once, _) = engine.reconcile(&manifest, &bom);
        let (twice, report) = engine.reconcile(&manifest, &once);

        prop_assert!(!report.changed());
        prop_assert_eq!(once, twice);
    }
}
