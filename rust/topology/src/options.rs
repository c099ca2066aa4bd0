// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder configuration.

use serde::{Deserialize, Serialize};

/// Options controlling quantization, simplification and feature ids.
///
/// All numeric options use `0` to mean "disabled".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopologyOptions {
    /// Grid resolution applied to the input before topology construction.
    pub pre_quantize: f64,
    /// Grid resolution of the emitted arcs. Enables delta encoding.
    pub post_quantize: f64,
    /// Visvalingam-Whyatt area threshold.
    pub simplify: f64,
    /// Property consulted for the feature id when a feature has no own id.
    pub id_property: String,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            pre_quantize: 0.0,
            post_quantize: 0.0,
            simplify: 0.0,
            id_property: "id".into(),
        }
    }
}

impl TopologyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the same grid for topology construction and output.
    pub fn with_quantization(self, quantize: f64) -> Self {
        self.with_pre_quantize(quantize).with_post_quantize(quantize)
    }

    pub fn with_pre_quantize(mut self, pre_quantize: f64) -> Self {
        self.pre_quantize = pre_quantize;
        self
    }

    pub fn with_post_quantize(mut self, post_quantize: f64) -> Self {
        self.post_quantize = post_quantize;
        self
    }

    pub fn with_simplify(mut self, simplify: f64) -> Self {
        self.simplify = simplify;
        self
    }

    pub fn with_id_property(mut self, id_property: impl Into<String>) -> Self {
        self.id_property = id_property.into();
        self
    }

    /// Load options from environment variables, falling back to defaults.
    ///
    /// Reads `TOPOLITE_PRE_QUANTIZE`, `TOPOLITE_POST_QUANTIZE`,
    /// `TOPOLITE_SIMPLIFY` and `TOPOLITE_ID_PROPERTY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            pre_quantize: env_f64("TOPOLITE_PRE_QUANTIZE", defaults.pre_quantize),
            post_quantize: env_f64("TOPOLITE_POST_QUANTIZE", defaults.post_quantize),
            simplify: env_f64("TOPOLITE_SIMPLIFY", defaults.simplify),
            id_property: std::env::var("TOPOLITE_ID_PROPERTY")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.id_property),
        }
    }

    /// Returns the options the pipeline actually runs with.
    ///
    /// Negative or non-finite values disable their stage.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            pre_quantize: enabled(self.pre_quantize),
            post_quantize: enabled(self.post_quantize),
            simplify: enabled(self.simplify),
            id_property: self.id_property.clone(),
        }
    }
}

fn enabled(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
