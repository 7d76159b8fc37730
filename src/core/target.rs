//! Build target - the (OS, compiler, build type, linkage) tuple that drives
//! every packaging decision.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::PackageError;

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    /// The operating system this binary was compiled for.
    #[cfg(target_os = "macos")]
    pub const fn host() -> Self {
        Os::Macos
    }

    #[cfg(target_os = "windows")]
    pub const fn host() -> Self {
        Os::Windows
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    pub const fn host() -> Self {
        Os::Linux
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Macos => "macos",
            Os::Windows => "windows",
        }
    }

    /// Separator used between entries of PATH-like variables.
    pub const fn path_separator(&self) -> char {
        match self {
            Os::Windows => ';',
            Os::Linux | Os::Macos => ':',
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "macos" | "darwin" | "osx" => Ok(Os::Macos),
            "windows" | "win" => Ok(Os::Windows),
            _ => Err(PackageError::invalid(format!(
                "unknown operating system '{}', valid values: linux, macos, windows",
                s
            ))),
        }
    }
}

/// Optimization/debug-symbol configuration of the native build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    /// CMake spelling, also used as the multi-config `--config`/`-C` value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            _ => Err(PackageError::invalid(format!(
                "unknown build type '{}', valid values: Debug, Release",
                s
            ))),
        }
    }
}

/// Library linkage of the produced package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Static archive bound at link time
    Static,
    /// Shared object loaded at runtime
    Shared,
}

impl Linkage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Linkage::Static => "static",
            Linkage::Shared => "shared",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Linkage {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(Linkage::Static),
            "shared" | "dynamic" => Ok(Linkage::Shared),
            _ => Err(PackageError::invalid(format!(
                "invalid linkage '{}', valid values: static, shared",
                s
            ))),
        }
    }
}

/// Compiler family used for the native build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
    /// Anything else, kept verbatim
    Other(String),
}

impl CompilerFamily {
    pub fn as_str(&self) -> &str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::AppleClang => "apple-clang",
            CompilerFamily::Msvc => "msvc",
            CompilerFamily::Other(name) => name,
        }
    }

    /// Default compiler family for an operating system.
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Linux => CompilerFamily::Gcc,
            Os::Macos => CompilerFamily::AppleClang,
            Os::Windows => CompilerFamily::Msvc,
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PackageError::invalid("compiler family must not be empty"));
        }
        Ok(match trimmed.to_lowercase().as_str() {
            "gcc" | "gnu" => CompilerFamily::Gcc,
            "clang" | "llvm" => CompilerFamily::Clang,
            "apple-clang" | "apple_clang" | "appleclang" => CompilerFamily::AppleClang,
            "msvc" | "cl" | "visual studio" => CompilerFamily::Msvc,
            other => CompilerFamily::Other(other.to_string()),
        })
    }
}

impl Serialize for CompilerFamily {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CompilerFamily {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fully resolved build target.
///
/// Constructed once per package build and never mutated. Use
/// [`BuildTarget::validate`] before handing it to any external process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildTarget {
    pub os: Os,
    pub compiler: CompilerFamily,
    pub build_type: BuildType,
    pub linkage: Linkage,
}

impl BuildTarget {
    pub fn new(os: Os, compiler: CompilerFamily, build_type: BuildType, linkage: Linkage) -> Self {
        BuildTarget {
            os,
            compiler,
            build_type,
            linkage,
        }
    }

    /// Target for the host OS with its default compiler.
    pub fn host(build_type: BuildType, linkage: Linkage) -> Self {
        let os = Os::host();
        BuildTarget::new(os, CompilerFamily::default_for(os), build_type, linkage)
    }

    /// Reject combinations no toolchain can produce.
    pub fn validate(&self) -> Result<(), PackageError> {
        match (&self.compiler, self.os) {
            (CompilerFamily::Msvc, Os::Linux | Os::Macos) => Err(PackageError::invalid(format!(
                "compiler 'msvc' cannot target {}",
                self.os
            ))),
            (CompilerFamily::AppleClang, Os::Linux | Os::Windows) => Err(PackageError::invalid(
                format!("compiler 'apple-clang' cannot target {}", self.os),
            )),
            _ => Ok(()),
        }
    }

    /// Short name identifying this variant, used for per-variant output trees.
    pub fn variant_name(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.os,
            self.compiler,
            self.build_type.as_str().to_lowercase(),
            self.linkage
        )
    }

    pub fn is_shared(&self) -> bool {
        self.linkage == Linkage::Shared
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.os, self.compiler, self.build_type, self.linkage
        )
    }
}
