// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print job options and their resolution from defaults plus overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LabelwerkError, Result};
use crate::types::LabelType;

/// Fully resolved options for one print job.
///
/// Built once when the job is constructed and never changed afterwards.
/// Values are not range-checked here; that is up to the printer protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Media loaded in the printer.
    pub label_type: LabelType,
    /// Print darkness.
    pub density: u32,
    /// How many pages the job will print in total.
    pub total_pages: u32,
    /// Delay between status queries while waiting for completion.
    pub status_poll_interval_ms: u64,
    /// Deadline for the whole completion wait.
    pub status_timeout_ms: u64,
    /// Deadline for sending a single page.
    pub page_timeout_ms: u64,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            label_type: LabelType::WithGaps,
            density: 2,
            total_pages: 1,
            status_poll_interval_ms: 300,
            status_timeout_ms: 5_000,
            page_timeout_ms: 10_000,
        }
    }
}

impl PrintOptions {
    /// Overlay `overrides` onto `defaults`, field by field.
    pub fn resolve(defaults: PrintOptions, overrides: &PrintOptionsOverrides) -> Self {
        Self {
            label_type: overrides.label_type.unwrap_or(defaults.label_type),
            density: overrides.density.unwrap_or(defaults.density),
            total_pages: overrides.total_pages.unwrap_or(defaults.total_pages),
            status_poll_interval_ms: overrides
                .status_poll_interval_ms
                .unwrap_or(defaults.status_poll_interval_ms),
            status_timeout_ms: overrides
                .status_timeout_ms
                .unwrap_or(defaults.status_timeout_ms),
            page_timeout_ms: overrides.page_timeout_ms.unwrap_or(defaults.page_timeout_ms),
        }
    }

    /// Resolve `overrides` against the documented defaults.
    pub fn with_overrides(overrides: &PrintOptionsOverrides) -> Self {
        Self::resolve(Self::default(), overrides)
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_millis(self.status_poll_interval_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }
}

/// Caller-supplied subset of [`PrintOptions`]. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintOptionsOverrides {
    pub label_type: Option<LabelType>,
    pub density: Option<u32>,
    pub total_pages: Option<u32>,
    pub status_poll_interval_ms: Option<u64>,
    pub status_timeout_ms: Option<u64>,
    pub page_timeout_ms: Option<u64>,
}

impl PrintOptionsOverrides {
    /// Parse overrides from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LabelwerkError::Config(format!("invalid print options: {e}")))
    }

    /// Read and parse an overrides file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| LabelwerkError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn label_type(mut self, label_type: LabelType) -> Self {
        self.label_type = Some(label_type);
        self
    }

    pub fn density(mut self, density: u32) -> Self {
        self.density = Some(density);
        self
    }

    pub fn status_poll_interval_ms(mut self, ms: u64) -> Self {
        self.status_poll_interval_ms = Some(ms);
        self
    }

    pub fn status_timeout_ms(mut self, ms: u64) -> Self {
        self.status_timeout_ms = Some(ms);
        self
    }

    pub fn page_timeout_ms(mut self, ms: u64) -> Self {
        self.page_timeout_ms = Some(ms);
        self
    }
}

impl From<PrintOptions> for PrintOptionsOverrides {
    fn from(options: PrintOptions) -> Self {
        Self {
            label_type: Some(options.label_type),
            density: Some(options.density),
            total_pages: Some(options.total_pages),
            status_poll_interval_ms: Some(options.status_poll_interval_ms),
            status_timeout_ms: Some(options.status_timeout_ms),
            page_timeout_ms: Some(options.page_timeout_ms),
        }
    }
}
