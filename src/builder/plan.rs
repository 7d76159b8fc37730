//! Build configuration planning.
//!
//! Translates a [`BuildTarget`] into the configuration options handed to the
//! native build tool. Pure: nothing here touches the filesystem or spawns a
//! process, so invalid targets are rejected before any build starts.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::error::PackageError;
use crate::core::target::{BuildTarget, Linkage};

/// Ordered mapping of configuration option name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOptions {
    entries: Vec<(String, String)>,
}

impl ConfigOptions {
    pub fn new() -> Self {
        ConfigOptions::default()
    }

    /// Set an option, replacing any earlier value but keeping its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `-DNAME=VALUE` arguments.
    pub fn to_define_args(&self) -> Vec<String> {
        self.iter()
            .map(|(n, v)| format!("-D{}={}", n, v))
            .collect()
    }
}

/// Serialized as a map in insertion order.
impl Serialize for ConfigOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for ConfigOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Plan the configuration options for a target.
pub fn plan_configuration(target: &BuildTarget) -> Result<ConfigOptions, PackageError> {
    target.validate()?;

    let shared = match target.linkage {
        Linkage::Shared => true,
        Linkage::Static => false,
    };

    let mut options = ConfigOptions::new();
    options.set("BUILD_SHARED_LIBS", on_off(shared));
    options.set("BUILD_STATIC_LIBS", on_off(!shared));
    options.set("CMAKE_BUILD_TYPE", target.build_type.as_str());
    if shared {
        options.set("CMAKE_POSITION_INDEPENDENT_CODE", "ON");
    }

    tracing::debug!("Planned {} option(s) for {}", options.len(), target);
    Ok(options)
}

/// Plan from raw setting strings, as supplied by a host.
pub fn plan_from_settings(
    os: &str,
    compiler: &str,
    build_type: &str,
    linkage: &str,
) -> Result<(BuildTarget, ConfigOptions), PackageError> {
    let target = BuildTarget::new(
        os.parse()?,
        compiler.parse()?,
        build_type.parse()?,
        linkage.parse()?,
    );
    let options = plan_configuration(&target)?;
    Ok((target, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::target::{BuildType, CompilerFamily, Os};

    fn all_targets() -> Vec<BuildTarget> {
        let mut targets = Vec::new();
        for os in [Os::Linux, Os::Macos, Os::Windows] {
            for build_type in [BuildType::Debug, BuildType::Release] {
                for linkage in [Linkage::Static, Linkage::Shared] {
                    for compiler in [
                        CompilerFamily::default_for(os),
                        CompilerFamily::Clang,
                        CompilerFamily::Other("intel".to_string()),
                    ] {
                        targets.push(BuildTarget::new(os, compiler, build_type, linkage));
                    }
                }
            }
        }
        targets
    }

    #[test]
    fn test_exactly_one_linkage_toggle_on() {
        for target in all_targets() {
            let options = plan_configuration(&target).unwrap();
            let shared = options.get("BUILD_SHARED_LIBS").unwrap();
            let stat = options.get("BUILD_STATIC_LIBS").unwrap();

            assert_ne!(shared, stat, "{}", target);
            assert_eq!(shared == "ON", target.linkage == Linkage::Shared);
            assert_eq!(stat == "ON", target.linkage == Linkage::Static);
        }
    }

    #[test]
    fn test_build_type_forwarded() {
        let target = BuildTarget::new(
            Os::Linux,
            CompilerFamily::Gcc,
            BuildType::Debug,
            Linkage::Static,
        );
        let options = plan_configuration(&target).unwrap();
        assert_eq!(options.get("CMAKE_BUILD_TYPE"), Some("Debug"));
        assert_eq!(options.get("CMAKE_POSITION_INDEPENDENT_CODE"), None);
    }

    #[test]
    fn test_option_order_is_stable() {
        let target = BuildTarget::new(
            Os::Linux,
            CompilerFamily::Gcc,
            BuildType::Release,
            Linkage::Shared,
        );
        let args = plan_configuration(&target).unwrap().to_define_args();
        assert_eq!(
            args,
            vec![
                "-DBUILD_SHARED_LIBS=ON",
                "-DBUILD_STATIC_LIBS=OFF",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_POSITION_INDEPENDENT_CODE=ON",
            ]
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut options = ConfigOptions::new();
        options.set("A", "1");
        options.set("B", "2");
        options.set("A", "3");
        let entries: Vec<_> = options.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn test_invalid_linkage_setting_fails_fast() {
        let err = plan_from_settings("linux", "gcc", "Release", "both").unwrap_err();
        assert!(matches!(err, PackageError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_unsupported_combination_fails_fast() {
        let err = plan_from_settings("linux", "msvc", "Release", "static").unwrap_err();
        assert!(matches!(err, PackageError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_json_keeps_planned_order() {
        let target = BuildTarget::new(
            Os::Linux,
            CompilerFamily::Gcc,
            BuildType::Debug,
            Linkage::Shared,
        );
        let options = plan_configuration(&target).unwrap();

        assert_eq!(
            serde_json::to_string(&options).unwrap(),
            r#"{"BUILD_SHARED_LIBS":"ON","BUILD_STATIC_LIBS":"OFF","CMAKE_BUILD_TYPE":"Debug","CMAKE_POSITION_INDEPENDENT_CODE":"ON"}"#
        );
    }

    #[test]
    fn test_json_is_insertion_ordered() {
        let mut options = ConfigOptions::new();
        options.set("ZLIB_ROOT", "/opt/zlib");
        options.set("BUILD_TESTING", "OFF");

        assert_eq!(
            serde_json::to_string(&options).unwrap(),
            r#"{"ZLIB_ROOT":"/opt/zlib","BUILD_TESTING":"OFF"}"#
        );
    }
}
