//! Coordinate similarity scoring.
//!
//! A candidate is eligible only when it names the same artifact as the
//! declared coordinate (ecosystem, namespace, name, packaging, classifier).
//! Eligible candidates score by how many leading version segments agree:
//! major is worth 3, minor 2 and patch 1, each counted only when every
//! earlier segment matched.

use crate::model::PackageCoordinate;

/// Score of a candidate that can never be selected.
pub const INELIGIBLE: i32 = -1;

const SEGMENT_WEIGHTS: [i32; 3] = [3, 2, 1];

/// Similarity between a declared coordinate and a candidate.
#[must_use]
pub fn similarity(declared: &PackageCoordinate, candidate: &PackageCoordinate) -> i32 {
    if !declared.same_artifact(candidate) {
        return INELIGIBLE;
    }
    version_similarity(declared.version.as_deref(), candidate.version.as_deref())
}

/// Tiered version score in `0..=6`. Absent segments never match.
#[must_use]
pub fn version_similarity(left: Option<&str>, right: Option<&str>) -> i32 {
    let (Some(left), Some(right)) = (left, right) else {
        return 0;
    };
    let mut left = left.split('.');
    let mut right = right.split('.');

    let mut score = 0;
    for weight in SEGMENT_WEIGHTS {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) if !a.is_empty() && a == b => score += weight,
            _ => break,
        }
    }
    score
}
