//! Runtime environment patches and scoped environment augmentation.
//!
//! A [`RuntimeEnvironmentPatch`] lists path fragments to append to
//! environment variables. It is applied through the [`Environment`] trait so
//! the same code drives the real process environment and an in-memory one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::target::Os;

/// Path fragments to append, keyed by environment variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEnvironmentPatch {
    #[serde(skip, default = "host_separator")]
    separator: char,
    #[serde(flatten)]
    vars: BTreeMap<String, Vec<PathBuf>>,
}

fn host_separator() -> char {
    Os::host().path_separator()
}

impl Default for RuntimeEnvironmentPatch {
    fn default() -> Self {
        RuntimeEnvironmentPatch {
            separator: host_separator(),
            vars: BTreeMap::new(),
        }
    }
}

impl RuntimeEnvironmentPatch {
    /// Empty patch joining values with the separator of `os`.
    pub fn new(os: Os) -> Self {
        RuntimeEnvironmentPatch {
            separator: os.path_separator(),
            vars: BTreeMap::new(),
        }
    }

    /// Append a path fragment to a variable. A fragment already listed for
    /// the variable is not added twice.
    pub fn append(&mut self, var: impl Into<String>, fragment: impl AsRef<Path>) {
        let fragments = self.vars.entry(var.into()).or_default();
        let fragment = fragment.as_ref();
        if !fragments.iter().any(|f| f == fragment) {
            fragments.push(fragment.to_path_buf());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.values().all(|f| f.is_empty())
    }

    pub fn get(&self, var: &str) -> Option<&[PathBuf]> {
        self.vars.get(var).map(|f| f.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Join values the way `os` does. The separator is not serialized, so a
    /// loaded patch takes it from the target it was published for.
    pub fn set_os(&mut self, os: Os) {
        self.separator = os.path_separator();
    }

    /// The value `var` takes once this patch is appended to `existing`.
    pub fn appended_value(&self, var: &str, existing: Option<&str>) -> Option<String> {
        let fragments = self.vars.get(var)?;
        let mut parts: Vec<String> = Vec::new();
        if let Some(existing) = existing.filter(|v| !v.is_empty()) {
            parts.push(existing.to_string());
        }
        parts.extend(fragments.iter().map(|f| f.display().to_string()));
        Some(parts.join(&self.separator.to_string()))
    }
}

/// A mutable set of environment variables.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    fn set_var(&mut self, key: &str, value: &str);

    fn remove_var(&mut self, key: &str);

    /// All variables, sorted by name.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set_var(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove_var(&mut self, key: &str) {
        std::env::remove_var(key);
    }

    fn vars(&self) -> Vec<(String, String)> {
        // Variables that are not valid UTF-8 cannot be forwarded through
        // the string-based interface and are dropped
        let mut vars: Vec<_> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        vars.sort();
        vars
    }
}

/// An in-memory environment, detached from the process.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnvironment {
    vars: BTreeMap<String, String>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        MemoryEnvironment::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for MemoryEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set_var(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn remove_var(&mut self, key: &str) {
        self.vars.remove(key);
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Applies a patch on creation and restores every touched variable on drop.
///
/// Restoration also happens while unwinding, so the environment is left as it
/// was found whether the guarded work succeeds, fails or panics.
pub struct ScopedEnv<'a> {
    env: &'a mut dyn Environment,
    saved: Vec<(String, Option<String>)>,
}

impl<'a> ScopedEnv<'a> {
    pub fn apply(env: &'a mut dyn Environment, patch: &RuntimeEnvironmentPatch) -> Self {
        let mut saved = Vec::new();

        for (key, _) in patch.iter() {
            let previous = env.var(key);
            if let Some(value) = patch.appended_value(key, previous.as_deref()) {
                tracing::debug!("Setting {}={}", key, value);
                env.set_var(key, &value);
                saved.push((key.to_string(), previous));
            }
        }

        ScopedEnv { env, saved }
    }

    /// The augmented environment.
    pub fn env(&self) -> &dyn Environment {
        &*self.env
    }
}

impl Drop for ScopedEnv<'_> {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            match previous {
                Some(value) => self.env.set_var(&key, &value),
                None => self.env.remove_var(&key),
            }
            tracing::debug!("Restored {}", key);
        }
    }
}

/// Run `f` with `patch` applied to `env`, restoring it afterwards.
pub fn with_patch<R>(
    env: &mut dyn Environment,
    patch: &RuntimeEnvironmentPatch,
    f: impl FnOnce(&dyn Environment) -> R,
) -> R {
    let scoped = ScopedEnv::apply(env, patch);
    f(scoped.env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn loader_patch() -> RuntimeEnvironmentPatch {
        let mut patch = RuntimeEnvironmentPatch::new(Os::Macos);
        patch.append("DYLD_LIBRARY_PATH", "/build/lib");
        patch
    }

    #[test]
    fn test_appended_value_keeps_existing() {
        let patch = loader_patch();
        assert_eq!(
            patch.appended_value("DYLD_LIBRARY_PATH", Some("/opt/lib")),
            Some("/opt/lib:/build/lib".to_string())
        );
        assert_eq!(
            patch.appended_value("DYLD_LIBRARY_PATH", None),
            Some("/build/lib".to_string())
        );
        assert_eq!(patch.appended_value("PATH", Some("/bin")), None);
    }

    #[test]
    fn test_windows_patch_uses_semicolon() {
        let mut patch = RuntimeEnvironmentPatch::new(Os::Windows);
        patch.append("PATH", "C:/pkg/bin");
        assert_eq!(
            patch.appended_value("PATH", Some("C:/Windows")),
            Some("C:/Windows;C:/pkg/bin".to_string())
        );
    }

    #[test]
    fn test_append_deduplicates_fragments() {
        let mut patch = RuntimeEnvironmentPatch::new(Os::Linux);
        patch.append("PATH", "/pkg/bin");
        patch.append("PATH", "/pkg/bin");
        assert_eq!(patch.get("PATH").unwrap().len(), 1);
    }

    #[test]
    fn test_scoped_env_round_trips() {
        let mut env = MemoryEnvironment::new().with("DYLD_LIBRARY_PATH", "/opt/lib");
        let before = env.clone();

        let seen = with_patch(&mut env, &loader_patch(), |env| {
            env.var("DYLD_LIBRARY_PATH")
        });

        assert_eq!(seen.as_deref(), Some("/opt/lib:/build/lib"));
        assert_eq!(env, before);
    }

    #[test]
    fn test_scoped_env_removes_variables_it_created() {
        let mut env = MemoryEnvironment::new();

        {
            let scoped = ScopedEnv::apply(&mut env, &loader_patch());
            assert_eq!(
                scoped.env().var("DYLD_LIBRARY_PATH").as_deref(),
                Some("/build/lib")
            );
        }

        assert_eq!(env.var("DYLD_LIBRARY_PATH"), None);
    }

    #[test]
    fn test_scoped_env_restores_after_panic() {
        let mut env = MemoryEnvironment::new().with("DYLD_LIBRARY_PATH", "/opt/lib");
        let before = env.clone();

        let result = catch_unwind(AssertUnwindSafe(|| {
            with_patch(&mut env, &loader_patch(), |_| panic!("test runner crashed"))
        }));

        assert!(result.is_err());
        assert_eq!(env, before);
    }

    #[test]
    #[serial]
    fn test_scoped_process_env_round_trips() {
        const KEY: &str = "SMELT_PACK_SCOPED_ENV_TEST";
        std::env::set_var(KEY, "/ambient");

        let mut patch = RuntimeEnvironmentPatch::new(Os::Linux);
        patch.append(KEY, "/pkg/lib");

        let mut env = ProcessEnvironment;
        with_patch(&mut env, &patch, |env| {
            assert_eq!(env.var(KEY).as_deref(), Some("/ambient:/pkg/lib"));
        });

        assert_eq!(std::env::var(KEY).as_deref(), Ok("/ambient"));
        std::env::remove_var(KEY);
    }
}
