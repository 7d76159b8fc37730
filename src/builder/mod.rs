//! Native build driving.
//!
//! This module plans the CMake configuration for a target and runs the
//! configure/build/test sequence through pluggable collaborators.

pub mod cmake;
pub mod env_resolver;
pub mod executor;
pub mod plan;
pub mod tool;

pub use cmake::{CMakeTool, CTestRunner};
pub use env_resolver::resolve_runtime_env;
pub use executor::{BuildExecutor, BuildState, TestInvocation};
pub use plan::{plan_configuration, plan_from_settings, ConfigOptions};
pub use tool::{BuildTool, NoTestRunner, TestRunner};
