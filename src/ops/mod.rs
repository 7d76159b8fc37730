//! High-level operations.
//!
//! This module contains the implementation of smelt-pack commands.

pub mod collect;
pub mod matrix;
pub mod package;
pub mod publish;

pub use collect::{collect_package, CollectReport, CollectedArtifact};
pub use matrix::{expand, run_matrix};
pub use package::{package, package_with_cmake, PackageOptions, PackageResult, VariantPaths};
pub use publish::{publish, write_descriptor};
