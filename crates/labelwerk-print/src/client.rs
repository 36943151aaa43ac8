// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device abstraction consumed by print tasks.
//
// The transport (BLE, serial, USB) and packet framing live behind this trait.
// A print task only issues job-scoped commands and reads model metadata; it
// never opens, closes, or reconfigures the connection.

use async_trait::async_trait;

use labelwerk_core::error::Result;
use labelwerk_core::types::{DeviceStatus, EncodedImage, LabelType, ModelMetadata};

/// Connected label printer, shared by reference for the duration of a job.
#[async_trait]
pub trait PrinterClient: Send + Sync {
    /// Metadata for the connected model, or `None` when the model is unknown.
    fn model_metadata(&self) -> Option<ModelMetadata>;

    /// Select the media loaded in the printer.
    async fn set_label_type(&self, label_type: LabelType) -> Result<()>;

    /// Select print darkness.
    async fn set_density(&self, density: u32) -> Result<()>;

    /// Tell the printer a job of `total_pages` pages is starting.
    async fn start_print(&self, total_pages: u32) -> Result<()>;

    /// Transmit one page image to be printed `quantity` times.
    async fn send_page(&self, image: &EncodedImage, quantity: u32) -> Result<()>;

    /// Query the progress of the current job.
    async fn print_status(&self) -> Result<DeviceStatus>;

    /// Close the job on the printer side.
    async fn end_print(&self) -> Result<()>;
}
