//! Core data structures for smelt-pack.
//!
//! This module contains the foundational types used throughout the crate:
//! - Build targets (OS, compiler family, build type, linkage)
//! - The artifact pattern table and package layout
//! - Runtime environment patches and scoped application
//! - The consumption descriptor and error taxonomy

pub mod artifact;
pub mod descriptor;
pub mod environment;
pub mod error;
pub mod layout;
pub mod target;

pub use artifact::{ArtifactCategory, ArtifactPattern, Destination};
pub use descriptor::{ConsumptionDescriptor, PackageInfo};
pub use environment::{Environment, RuntimeEnvironmentPatch, ScopedEnv};
pub use error::PackageError;
pub use layout::PackageLayout;
pub use target::{BuildTarget, BuildType, CompilerFamily, Linkage, Os};
