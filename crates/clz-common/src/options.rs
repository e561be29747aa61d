//! Engine configuration.
//!
//! Flag parsing lives outside the engine; this is only the effect surface.

use serde::{Deserialize, Serialize};

/// Options recognized by the annotation engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitOptions {
    /// Attempt real annotations. When false every synthesized type is the
    /// unknown marker and no degradation diagnostics are recorded.
    pub typed: bool,
    /// Promote degradation warnings to a run-aborting fatal result.
    pub fatal_warnings: bool,
    /// Produce the aggregated ambient/externs artifact.
    pub externs_output: bool,
    /// Prefix prepended to every rewritten module namespace, e.g.
    /// `myproject` turns `goog.module('src.foo')` into
    /// `goog.module('myproject.src.foo')`. Applies to requires and
    /// resolutions as well.
    pub module_prefix: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            typed: true,
            fatal_warnings: false,
            externs_output: true,
            module_prefix: String::new(),
        }
    }
}

impl EmitOptions {
    pub fn untyped() -> Self {
        EmitOptions {
            typed: false,
            ..Default::default()
        }
    }
}
