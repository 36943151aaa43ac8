// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Labelwerk print jobs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label media loaded in the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    /// Die-cut labels separated by gaps.
    WithGaps,
    /// Labels with black registration marks.
    Black,
    /// Continuous roll, no separation.
    Continuous,
    Perforated,
    Transparent,
    PvcTag,
    BlackMarkGap,
    HeatShrinkTube,
}

impl LabelType {
    /// Numeric code sent to the printer when selecting this media.
    pub fn code(&self) -> u8 {
        match self {
            Self::WithGaps => 1,
            Self::Black => 2,
            Self::Continuous => 3,
            Self::Perforated => 4,
            Self::Transparent => 5,
            Self::PvcTag => 6,
            Self::BlackMarkGap => 10,
            Self::HeatShrinkTube => 11,
        }
    }
}

/// An already-encoded page image.
///
/// The payload layout belongs to the encoder that produced it; the job
/// lifecycle only carries it through to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    width_px: u32,
    height_px: u32,
    payload: Vec<u8>,
}

impl EncodedImage {
    pub fn new(width_px: u32, height_px: u32, payload: Vec<u8>) -> Self {
        Self {
            width_px,
            height_px,
            payload,
        }
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn height_px(&self) -> u32 {
        self.height_px
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Static facts about the connected printer model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Marketing model name, e.g. "B1".
    pub model: String,
    /// Printhead width in dots.
    pub printhead_pixels: u32,
    pub dpi: u32,
}

/// What a single status query reports about the job in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// Still printing. `page` is the number of pages completed so far.
    Printing { page: u32, progress: u8 },
    /// All pages have been printed.
    Finished,
    /// The printer stopped with an error.
    Error(String),
}

/// Lifecycle phases of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    /// Options resolved, nothing sent yet.
    Created,
    /// Label type, density and print start have been sent.
    Initialized,
    /// At least one page has been submitted.
    Printing,
    /// Polling the device for completion.
    AwaitingCompletion,
    Finished,
    Failed,
}

impl JobPhase {
    /// Whether the job has reached an outcome and can no longer be used.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Printing => "printing",
            Self::AwaitingCompletion => "awaiting completion",
            Self::Finished => "finished",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Classification of errors for retry decisions made by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Timeout or communication blip, safe to retry.
    Transient,
    /// User must act (fix page counts, close cover, load labels).
    UserAction,
    /// Retrying will not help.
    Permanent,
}
