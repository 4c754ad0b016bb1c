//! BOM reconciliation engine.
//!
//! Repairs a generated BOM so every declared dependency is represented.
//! Declared coordinates without an exact component get a clone of the most
//! similar eligible component, re-identified with the declared coordinate and
//! wired under the root component.

use super::scoring::{similarity, INELIGIBLE};
use crate::error::{Result, SbomGenError};
use crate::model::{Bom, Component, DeclaredManifest, Dependency, PackageCoordinate};
use crate::parsers::{self, write_bom_file};
use serde::Serialize;
use std::path::Path;

/// A component added for a declared coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClonedComponent {
    /// Declared coordinate the clone was created for
    pub declared: String,
    /// Reference of the component it was cloned from
    pub source: String,
    pub score: i32,
}

/// A declared coordinate that could not be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDependency {
    pub declared: String,
    pub reason: String,
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub declared: usize,
    pub components_before: usize,
    pub components_after: usize,
    /// Declared coordinates already present in the BOM
    pub matched: usize,
    pub added: Vec<ClonedComponent>,
    pub skipped: Vec<SkippedDependency>,
    /// Counts agreed, nothing was inspected
    pub fast_path: bool,
}

impl ReconcileReport {
    /// Whether the pass changed the BOM.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }

    /// Log a one-line summary plus details at debug level.
    pub fn log_summary(&self) {
        if self.fast_path {
            tracing::info!(
                "BOM has {} components for {} declared dependencies, no adjustment needed",
                self.components_before,
                self.declared
            );
            return;
        }
        tracing::info!(
            "Reconciled BOM: {} declared, {} matched, {} added, {} skipped ({} -> {} components)",
            self.declared,
            self.matched,
            self.added.len(),
            self.skipped.len(),
            self.components_before,
            self.components_after
        );
        for added in &self.added {
            tracing::debug!(
                "  + {} (from {}, score {})",
                added.declared,
                added.source,
                added.score
            );
        }
        for skipped in &self.skipped {
            tracing::debug!("  ! {}: {}", skipped.declared, skipped.reason);
        }
    }
}

/// Reconciles generated BOMs against declared manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct BomReconciler;

impl BomReconciler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Produce a reconciled copy of `bom`. The input is left untouched.
    #[must_use]
    pub fn reconcile(&self, manifest: &DeclaredManifest, bom: &Bom) -> (Bom, ReconcileReport) {
        let mut report = ReconcileReport {
            declared: manifest.len(),
            components_before: bom.components.len(),
            components_after: bom.components.len(),
            ..ReconcileReport::default()
        };
        let mut reconciled = bom.clone();

        if manifest.len() == bom.components.len() {
            report.fast_path = true;
            return (reconciled, report);
        }

        tracing::info!(
            "The BOM has {} components but the manifest declares {} dependencies, adjusting",
            bom.components.len(),
            manifest.len()
        );

        // Candidates come from the generated components only; clones are
        // derived and never serve as a source.
        let candidates: Vec<(usize, PackageCoordinate)> = bom
            .components
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.coordinate().map(|coord| (i, coord)))
            .collect();
        let mut present: Vec<PackageCoordinate> =
            candidates.iter().map(|(_, c)| c.clone()).collect();

        let root_ref = bom.root_ref().map(ToString::to_string);
        if root_ref.is_none() {
            let err = SbomGenError::DataInconsistency(
                "BOM has no root component; added components will not be linked".to_string(),
            );
            tracing::warn!("{}", err);
        }

        for declared in &manifest.dependencies {
            if present.iter().any(|p| p.matches_exactly(declared)) {
                report.matched += 1;
                continue;
            }

            tracing::info!(
                "The dependency '{}' was not found in the generated BOM, adding it",
                declared
            );

            let Some((index, score)) = best_candidate(declared, &candidates) else {
                tracing::warn!(
                    "No eligible component to clone for '{}', it cannot be added",
                    declared
                );
                report.skipped.push(SkippedDependency {
                    declared: declared.to_string(),
                    reason: "no eligible component".to_string(),
                });
                continue;
            };

            let source = &bom.components[index];
            let clone = source.clone_with_coordinate(declared);
            let clone_ref = declared.to_string();
            tracing::debug!(
                "Cloning '{}' as '{}' (score {})",
                source.reference().unwrap_or(&source.name),
                clone_ref,
                score
            );

            add_component(&mut reconciled, clone, &clone_ref, root_ref.as_deref());
            present.push(declared.clone());
            report.added.push(ClonedComponent {
                declared: clone_ref,
                source: source
                    .reference()
                    .map_or_else(|| source.name.clone(), ToString::to_string),
                score,
            });
        }

        report.components_after = reconciled.components.len();
        (reconciled, report)
    }

    /// Read a manifest and a raw BOM, write the reconciled BOM to `output`.
    pub fn reconcile_files(
        &self,
        manifest_path: &Path,
        bom_path: &Path,
        output: &Path,
    ) -> Result<ReconcileReport> {
        if output == bom_path {
            return Err(SbomGenError::validation(format!(
                "reconciled BOM must not overwrite the raw BOM '{}'",
                bom_path.display()
            )));
        }
        let manifest = parsers::parse_manifest(manifest_path)?;
        let bom = parsers::parse_bom(bom_path)?;

        let (reconciled, report) = self.reconcile(&manifest, &bom);
        write_bom_file(&reconciled, output)?;
        report.log_summary();
        Ok(report)
    }
}

/// Highest-scoring eligible candidate; ties keep the earliest.
fn best_candidate(
    declared: &PackageCoordinate,
    candidates: &[(usize, PackageCoordinate)],
) -> Option<(usize, i32)> {
    let mut best: Option<(usize, i32)> = None;
    for (index, candidate) in candidates {
        let score = similarity(declared, candidate);
        if score == INELIGIBLE {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((*index, score));
        }
    }
    best
}

fn add_component(bom: &mut Bom, component: Component, reference: &str, root: Option<&str>) {
    bom.components.push(component);
    let deps = bom.dependencies.get_or_insert_with(Vec::new);
    if !deps.iter().any(|d| d.ref_field == reference) {
        deps.push(Dependency::new(reference));
    }
    if let Some(root) = root {
        bom.add_edge(root, reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;

    fn coord(purl: &str) -> PackageCoordinate {
        PackageCoordinate::parse(purl).unwrap()
    }

    fn bom_with(purls: &[&str]) -> Bom {
        let mut root = Component::library(&coord("pkg:maven/org.acme/app@1.0?type=pom"));
        root.component_type = "application".to_string();
        Bom {
            metadata: Some(Metadata {
                component: Some(root),
                ..Metadata::default()
            }),
            components: purls.iter().map(|p| Component::library(&coord(p))).collect(),
            ..Bom::default()
        }
    }

    fn manifest(purls: &[&str]) -> DeclaredManifest {
        DeclaredManifest {
            root: None,
            dependencies: purls.iter().map(|p| coord(p)).collect(),
        }
    }

    #[test]
    fn test_fast_path_on_equal_counts() {
        let bom = bom_with(&["pkg:maven/org.acme/lib@2.4.0?type=jar"]);
        let (out, report) = BomReconciler::new()
            .reconcile(&manifest(&["pkg:maven/org.acme/other@1.0?type=jar"]), &bom);
        assert!(report.fast_path);
        assert_eq!(out, bom);
    }

    #[test]
    fn test_selects_closest_version() {
        let bom = bom_with(&[
            "pkg:maven/org.other/lib@2.4.1?type=jar",
            "pkg:maven/org.acme/lib@1.9.9?type=jar",
            "pkg:maven/org.acme/lib@2.4.0?type=jar",
        ]);
        let (out, report) = BomReconciler::new()
            .reconcile(&manifest(&["pkg:maven/org.acme/lib@2.4.1?type=jar"]), &bom);

        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].source, "pkg:maven/org.acme/lib@2.4.0?type=jar");
        assert_eq!(report.added[0].score, 5);
        assert_eq!(out.components.len(), 4);
        assert_eq!(out.components[3].version.as_deref(), Some("2.4.1"));
    }

    #[test]
    fn test_tie_keeps_first_in_bom_order() {
        let bom = bom_with(&[
            "pkg:maven/org.acme/lib@3.0.0?type=jar",
            "pkg:maven/org.acme/lib@3.1.0?type=jar",
        ]);
        let (_, report) = BomReconciler::new()
            .reconcile(&manifest(&["pkg:maven/org.acme/lib@3.2.0?type=jar"]), &bom);
        assert_eq!(report.added[0].source, "pkg:maven/org.acme/lib@3.0.0?type=jar");
        assert_eq!(report.added[0].score, 3);
    }

    #[test]
    fn test_unmatched_declaration_is_skipped() {
        let bom = bom_with(&["pkg:maven/org.acme/lib@2.4.0?type=jar"]);
        let (out, report) = BomReconciler::new().reconcile(
            &manifest(&[
                "pkg:maven/org.acme/lib@2.4.0?type=jar",
                "pkg:maven/org.acme/unrelated@1.0?type=jar",
            ]),
            &bom,
        );
        assert_eq!(report.matched, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(!report.changed());
        assert_eq!(out.components.len(), 1);
    }

    #[test]
    fn test_root_edge_created() {
        let bom = bom_with(&["pkg:maven/org.acme/lib@2.4.0?type=jar"]);
        let (out, _) = BomReconciler::new().reconcile(
            &manifest(&[
                "pkg:maven/org.acme/lib@2.4.1?type=jar",
                "pkg:maven/org.acme/lib@2.4.2?type=jar",
            ]),
            &bom,
        );
        let deps = out.dependencies.unwrap();
        let root = deps
            .iter()
            .find(|d| d.ref_field == "pkg:maven/org.acme/app@1.0?type=pom")
            .unwrap();
        assert_eq!(root.depends_on.len(), 2);
        assert!(deps.iter().any(|d| d.ref_field == "pkg:maven/org.acme/lib@2.4.2?type=jar"));
    }

    #[test]
    fn test_missing_root_still_adds_component() {
        let mut bom = bom_with(&["pkg:maven/org.acme/lib@2.4.0?type=jar"]);
        bom.metadata = None;
        let (out, report) = BomReconciler::new().reconcile(
            &manifest(&[
                "pkg:maven/org.acme/lib@2.4.1?type=jar",
                "pkg:maven/org.acme/lib@2.4.0?type=jar",
                "pkg:maven/org.acme/lib@2.4.2?type=jar",
            ]),
            &bom,
        );
        assert_eq!(report.added.len(), 2);
        assert!(out.dependencies.unwrap().iter().all(|d| d.depends_on.is_empty()));
    }

    #[test]
    fn test_reconcile_files_refuses_overwrite() {
        let path = Path::new("bom.json");
        let err = BomReconciler::new()
            .reconcile_files(Path::new("pom.xml"), path, path)
            .unwrap_err();
        assert!(matches!(err, SbomGenError::Validation(_)));
    }
}
