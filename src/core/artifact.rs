//! Artifact pattern table.
//!
//! The fixed catalog of file patterns that make up a package. Headers and the
//! license are linkage-independent; the static and shared sets are disjoint by
//! category, so a package only ever materializes one of them.

use std::fmt;

use serde::Serialize;

use crate::core::target::Linkage;

/// What kind of build output a pattern captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactCategory {
    Header,
    StaticLib,
    /// Windows import library accompanying a DLL
    ImportLib,
    SharedObject,
    License,
}

impl ArtifactCategory {
    /// Whether this category counts as "a library" for completeness checks.
    pub fn is_library(&self) -> bool {
        matches!(
            self,
            ArtifactCategory::StaticLib | ArtifactCategory::ImportLib | ArtifactCategory::SharedObject
        )
    }
}

/// Package layout directory a pattern is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Include,
    Lib,
    Bin,
    Licenses,
}

impl Destination {
    pub const ALL: [Destination; 4] = [
        Destination::Include,
        Destination::Lib,
        Destination::Bin,
        Destination::Licenses,
    ];

    pub const fn dir_name(&self) -> &'static str {
        match self {
            Destination::Include => "include",
            Destination::Lib => "lib",
            Destination::Bin => "bin",
            Destination::Licenses => "licenses",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Where a pattern looks for its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchRoot {
    /// `<source>/include`, relative structure preserved
    SourceInclude,
    /// Top level of the source tree only
    SourceRoot,
    /// Anywhere under the build tree, flattened
    BuildTree,
}

/// A single entry of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactPattern {
    pub category: ArtifactCategory,
    /// File-name glob
    pub glob: &'static str,
    pub destination: Destination,
    pub root: SearchRoot,
}

impl ArtifactPattern {
    const fn new(
        category: ArtifactCategory,
        glob: &'static str,
        destination: Destination,
        root: SearchRoot,
    ) -> Self {
        ArtifactPattern {
            category,
            glob,
            destination,
            root,
        }
    }

    /// Whether the matched file keeps its path relative to the search root.
    pub fn keeps_path(&self) -> bool {
        self.category == ArtifactCategory::Header
    }
}

use ArtifactCategory::*;
use SearchRoot::*;

const COMMON: &[ArtifactPattern] = &[
    ArtifactPattern::new(Header, "*.h", Destination::Include, SourceInclude),
    ArtifactPattern::new(Header, "*.hpp", Destination::Include, SourceInclude),
    ArtifactPattern::new(License, "LICENSE", Destination::Licenses, SourceRoot),
    ArtifactPattern::new(License, "LICENSE.*", Destination::Licenses, SourceRoot),
];

const STATIC: &[ArtifactPattern] = &[
    ArtifactPattern::new(StaticLib, "*.a", Destination::Lib, BuildTree),
    ArtifactPattern::new(StaticLib, "*.lib", Destination::Lib, BuildTree),
];

const SHARED: &[ArtifactPattern] = &[
    ArtifactPattern::new(ImportLib, "*.lib", Destination::Lib, BuildTree),
    ArtifactPattern::new(SharedObject, "*.so", Destination::Lib, BuildTree),
    ArtifactPattern::new(SharedObject, "*.dylib", Destination::Lib, BuildTree),
    ArtifactPattern::new(SharedObject, "*.dll", Destination::Bin, BuildTree),
];

/// The patterns a package of the given linkage is made of.
///
/// Patterns are not filtered by platform: one that matches nothing on the
/// current target (a `*.dll` on Linux) is simply skipped during collection.
pub fn patterns_for(linkage: Linkage) -> Vec<ArtifactPattern> {
    let specific = match linkage {
        Linkage::Static => STATIC,
        Linkage::Shared => SHARED,
    };
    COMMON.iter().chain(specific).copied().collect()
}
