//! smelt-pack - build, test and package the SMELT time-history library
//!
//! This crate turns a CMake source tree into a relocatable binary package
//! for one build target (OS, compiler, build type, linkage): it plans the
//! CMake configuration, drives the native build and test run, collects the
//! artifacts into a canonical layout and publishes a descriptor telling
//! consumers how to compile and link against it.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for smelt-pack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides scripted build tools, test runners and
/// on-disk source/build fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    descriptor::ConsumptionDescriptor, error::PackageError, layout::PackageLayout,
    target::BuildTarget,
};
pub use ops::package::{package, PackageOptions, PackageResult};
