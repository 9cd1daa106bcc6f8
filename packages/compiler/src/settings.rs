//! Compilation settings shared by the walker and both code generators.

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Which code paths a build produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Client side rendering only.
    Client,
    /// Server string rendering plus client hydration.
    Isomorphic,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileSettings {
    pub context: Context,
    pub minify: bool,
    pub do_client_side_routing: bool,
    /// Interactive elements are rendered `disabled` on the server until
    /// hydration attaches their handlers.
    pub add_disable_to_element_with_events: bool,
    /// When true a data point with no server side getter is a compile error
    /// in isomorphic builds. When false the gap is tolerated.
    pub strict_server_getters: bool,
    /// Prefix for bundle references injected into the shell document.
    pub relative_base_path: String,
    pub output_script_name: String,
    pub output_style_name: String,
}

impl Default for CompileSettings {
    fn default() -> Self {
        CompileSettings {
            context: Context::Isomorphic,
            minify: false,
            do_client_side_routing: true,
            add_disable_to_element_with_events: true,
            strict_server_getters: false,
            relative_base_path: "/".to_string(),
            output_script_name: "bundle.js".to_string(),
            output_style_name: "bundle.css".to_string(),
        }
    }
}

impl CompileSettings {
    /// Settings as read from a build configuration file. Absent fields take
    /// their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|error| CompileError::Configuration {
            message: error.to_string(),
        })
    }

    pub fn is_isomorphic(&self) -> bool {
        self.context == Context::Isomorphic
    }
}
