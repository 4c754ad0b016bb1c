//! Package coordinates in package-URL form.
//!
//! Coordinates are compared structurally rather than by their string form,
//! so `pkg:maven/g/a@1?type=jar` and `pkg:maven/g/a@1` are the same artifact.

use crate::error::{Result, SbomGenError};
use packageurl::PackageUrl;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default Maven packaging when a coordinate carries no `type` qualifier.
pub const DEFAULT_MAVEN_PACKAGING: &str = "jar";

const MAVEN: &str = "maven";
const TYPE_QUALIFIER: &str = "type";
const CLASSIFIER_QUALIFIER: &str = "classifier";

/// A parsed package-URL.
///
/// Qualifiers are kept sorted so the rendered form is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageCoordinate {
    /// Ecosystem (`maven`, `npm`, ...)
    pub ecosystem: String,
    /// Group / namespace
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub qualifiers: BTreeMap<String, String>,
    pub subpath: Option<String>,
}

impl PackageCoordinate {
    /// Parse a package-URL string.
    pub fn parse(purl: &str) -> Result<Self> {
        let parsed = PackageUrl::from_str(purl)
            .map_err(|e| SbomGenError::invalid_purl(purl, e.to_string()))?;

        let mut qualifiers = BTreeMap::new();
        for (key, value) in parsed.qualifiers() {
            qualifiers.insert(key.to_string(), value.to_string());
        }

        Ok(Self {
            ecosystem: parsed.ty().to_string(),
            namespace: parsed
                .namespace()
                .filter(|ns| !ns.is_empty())
                .map(ToString::to_string),
            name: parsed.name().to_string(),
            version: parsed
                .version()
                .filter(|v| !v.is_empty())
                .map(ToString::to_string),
            qualifiers,
            subpath: parsed
                .subpath()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        })
    }

    /// Build a Maven coordinate. The `type` qualifier is always set so the
    /// rendered form is explicit about packaging.
    pub fn maven(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: Option<String>,
        packaging: Option<&str>,
        classifier: Option<&str>,
    ) -> Self {
        let mut qualifiers = BTreeMap::new();
        qualifiers.insert(
            TYPE_QUALIFIER.to_string(),
            packaging
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_MAVEN_PACKAGING)
                .to_string(),
        );
        if let Some(classifier) = classifier.filter(|c| !c.is_empty()) {
            qualifiers.insert(CLASSIFIER_QUALIFIER.to_string(), classifier.to_string());
        }
        Self {
            ecosystem: MAVEN.to_string(),
            namespace: Some(group.into()),
            name: artifact.into(),
            version: version.filter(|v| !v.is_empty()),
            qualifiers,
            subpath: None,
        }
    }

    /// Whether this is a Maven coordinate.
    #[must_use]
    pub fn is_maven(&self) -> bool {
        self.ecosystem == MAVEN
    }

    /// Packaging type qualifier; Maven coordinates default to `jar`.
    #[must_use]
    pub fn packaging(&self) -> Option<&str> {
        match self.qualifiers.get(TYPE_QUALIFIER) {
            Some(t) => Some(t.as_str()),
            None if self.is_maven() => Some(DEFAULT_MAVEN_PACKAGING),
            None => None,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.qualifiers.get(CLASSIFIER_QUALIFIER).map(String::as_str)
    }

    /// Identity ignoring version: ecosystem, namespace, name, packaging and classifier.
    #[must_use]
    pub fn same_artifact(&self, other: &Self) -> bool {
        self.ecosystem == other.ecosystem
            && self.namespace == other.namespace
            && self.name == other.name
            && self.packaging() == other.packaging()
            && self.classifier() == other.classifier()
    }

    /// Exact identity, treating a missing Maven `type` qualifier as `jar`.
    #[must_use]
    pub fn matches_exactly(&self, other: &Self) -> bool {
        self.same_artifact(other)
            && self.version == other.version
            && self.subpath == other.subpath
            && self.extra_qualifiers().eq(other.extra_qualifiers())
    }

    fn extra_qualifiers(&self) -> impl Iterator<Item = (&String, &String)> {
        self.qualifiers
            .iter()
            .filter(|(k, _)| k.as_str() != TYPE_QUALIFIER && k.as_str() != CLASSIFIER_QUALIFIER)
    }

    /// `group:artifact:version` style label used in logs.
    #[must_use]
    pub fn gav(&self) -> String {
        format!(
            "{}:{}:{}",
            self.namespace.as_deref().unwrap_or_default(),
            self.name,
            self.version.as_deref().unwrap_or_default()
        )
    }
}

fn encode_segment(value: &str, keep: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        let c = b as char;
        if b.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~') || keep.contains(&c) {
            out.push(c);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg:{}/", self.ecosystem)?;
        if let Some(ns) = &self.namespace {
            let segments: Vec<String> = ns.split('/').map(|s| encode_segment(s, &[])).collect();
            write!(f, "{}/", segments.join("/"))?;
        }
        f.write_str(&encode_segment(&self.name, &[]))?;
        if let Some(version) = &self.version {
            write!(f, "@{}", encode_segment(version, &[]))?;
        }
        if !self.qualifiers.is_empty() {
            let pairs: Vec<String> = self
                .qualifiers
                .iter()
                .map(|(k, v)| format!("{k}={}", encode_segment(v, &[':', '/'])))
                .collect();
            write!(f, "?{}", pairs.join("&"))?;
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "#{}", encode_segment(subpath, &['/']))?;
        }
        Ok(())
    }
}

impl FromStr for PackageCoordinate {
    type Err = SbomGenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maven_purl() {
        let c = PackageCoordinate::parse(
            "pkg:maven/org.apache.commons/commons-lang3@3.12.0?type=jar&classifier=sources",
        )
        .unwrap();
        assert_eq!(c.ecosystem, "maven");
        assert_eq!(c.namespace.as_deref(), Some("org.apache.commons"));
        assert_eq!(c.name, "commons-lang3");
        assert_eq!(c.version.as_deref(), Some("3.12.0"));
        assert_eq!(c.packaging(), Some("jar"));
        assert_eq!(c.classifier(), Some("sources"));
    }

    #[test]
    fn test_default_packaging() {
        let c = PackageCoordinate::parse("pkg:maven/g/a@1.0").unwrap();
        assert_eq!(c.packaging(), Some("jar"));

        let npm = PackageCoordinate::parse("pkg:npm/lodash@4.17.21").unwrap();
        assert_eq!(npm.packaging(), None);
    }

    #[test]
    fn test_exact_match_ignores_implicit_jar() {
        let a = PackageCoordinate::parse("pkg:maven/g/a@1.0").unwrap();
        let b = PackageCoordinate::parse("pkg:maven/g/a@1.0?type=jar").unwrap();
        assert!(a.matches_exactly(&b));

        let pom = PackageCoordinate::parse("pkg:maven/g/a@1.0?type=pom").unwrap();
        assert!(!a.matches_exactly(&pom));
        assert!(!a.same_artifact(&pom));
    }

    #[test]
    fn test_maven_case_is_significant() {
        let a = PackageCoordinate::parse("pkg:maven/org.Foo/Bar@1.0").unwrap();
        let b = PackageCoordinate::parse("pkg:maven/org.foo/bar@1.0").unwrap();
        assert!(!a.same_artifact(&b));
    }

    #[test]
    fn test_render_canonical() {
        let c = PackageCoordinate::maven("org.acme", "lib", Some("2.4.1".into()), None, Some("tests"));
        assert_eq!(
            c.to_string(),
            "pkg:maven/org.acme/lib@2.4.1?classifier=tests&type=jar"
        );
        let reparsed = PackageCoordinate::parse(&c.to_string()).unwrap();
        assert_eq!(reparsed, c);
    }

    #[test]
    fn test_render_encodes_plus() {
        let c = PackageCoordinate::maven("g", "a", Some("1.0+build".into()), None, None);
        assert!(c.to_string().contains("@1.0%2Bbuild"));
    }

    #[test]
    fn test_invalid_purl() {
        assert!(PackageCoordinate::parse("not-a-purl").is_err());
    }
}
