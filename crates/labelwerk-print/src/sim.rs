// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory printer for tests, benchmarks, and dry runs.
//
// Status replies follow a script; once the script runs out the last reply
// repeats. Any command can be made to fail, and page sends can be slowed down
// to exercise the page timeout.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::{DeviceStatus, EncodedImage, LabelType, ModelMetadata};

use crate::client::PrinterClient;

/// Commands understood by the simulated printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimCommand {
    SetLabelType,
    SetDensity,
    StartPrint,
    SendPage,
    PrintStatus,
    EndPrint,
}

#[derive(Debug)]
struct SimState {
    script: VecDeque<DeviceStatus>,
    last_status: DeviceStatus,
    failures: HashMap<SimCommand, String>,
    commands: Vec<SimCommand>,
    label_type: Option<LabelType>,
    density: Option<u32>,
    polls: u32,
    pages_sent: u32,
}

/// Scriptable stand-in for a connected label printer.
#[derive(Debug)]
pub struct SimulatedPrinter {
    metadata: Option<ModelMetadata>,
    page_delay: Duration,
    state: Mutex<SimState>,
}

impl Default for SimulatedPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPrinter {
    /// A 203 dpi, 384-dot printer that reports finished on the first poll.
    pub fn new() -> Self {
        Self {
            metadata: Some(ModelMetadata {
                model: "SIM-384".into(),
                printhead_pixels: 384,
                dpi: 203,
            }),
            page_delay: Duration::ZERO,
            state: Mutex::new(SimState {
                script: VecDeque::new(),
                last_status: DeviceStatus::Finished,
                failures: HashMap::new(),
                commands: Vec::new(),
                label_type: None,
                density: None,
                polls: 0,
                pages_sent: 0,
            }),
        }
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Behave like a model the client could not identify.
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    /// Reply to status queries with `statuses`, in order.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = DeviceStatus>) -> Self {
        {
            let mut state = self.lock();
            state.script = statuses.into_iter().collect();
            if let Some(last) = state.script.back() {
                state.last_status = last.clone();
            }
        }
        self
    }

    /// Report busy until the `polls`-th status query, which reports finished.
    pub fn finishing_after(self, polls: u32) -> Self {
        let busy = (1..polls).map(|i| DeviceStatus::Printing {
            page: 0,
            progress: (i * 100 / polls.max(1)) as u8,
        });
        self.with_statuses(busy.chain(std::iter::once(DeviceStatus::Finished)))
    }

    /// Report busy forever.
    pub fn never_finishing(self) -> Self {
        self.with_statuses([DeviceStatus::Printing {
            page: 0,
            progress: 0,
        }])
    }

    /// Make every `command` fail with a device error carrying `detail`.
    pub fn failing(self, command: SimCommand, detail: impl Into<String>) -> Self {
        self.lock().failures.insert(command, detail.into());
        self
    }

    /// Delay each page send by `delay`.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Number of status queries answered.
    pub fn polls(&self) -> u32 {
        self.lock().polls
    }

    /// Total copies sent by successful page sends.
    pub fn pages_sent(&self) -> u32 {
        self.lock().pages_sent
    }

    /// Every command received, in order, including failed ones.
    pub fn commands(&self) -> Vec<SimCommand> {
        self.lock().commands.clone()
    }

    pub fn label_type(&self) -> Option<LabelType> {
        self.lock().label_type
    }

    pub fn density(&self) -> Option<u32> {
        self.lock().density
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log `command` and return its injected failure, if any.
    fn receive(&self, command: SimCommand) -> Result<()> {
        let mut state = self.lock();
        state.commands.push(command);
        match state.failures.get(&command) {
            Some(detail) => {
                warn!(?command, detail = %detail, "simulated printer failing command");
                Err(LabelwerkError::Device(detail.clone()))
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PrinterClient for SimulatedPrinter {
    fn model_metadata(&self) -> Option<ModelMetadata> {
        self.metadata.clone()
    }

    async fn set_label_type(&self, label_type: LabelType) -> Result<()> {
        self.receive(SimCommand::SetLabelType)?;
        self.lock().label_type = Some(label_type);
        Ok(())
    }

    async fn set_density(&self, density: u32) -> Result<()> {
        self.receive(SimCommand::SetDensity)?;
        self.lock().density = Some(density);
        Ok(())
    }

    async fn start_print(&self, total_pages: u32) -> Result<()> {
        self.receive(SimCommand::StartPrint)?;
        debug!(total_pages, "simulated print start");
        Ok(())
    }

    async fn send_page(&self, image: &EncodedImage, quantity: u32) -> Result<()> {
        self.receive(SimCommand::SendPage)?;
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        let mut state = self.lock();
        state.pages_sent += quantity;
        debug!(
            width = image.width_px(),
            height = image.height_px(),
            quantity,
            pages_sent = state.pages_sent,
            "simulated page received"
        );
        Ok(())
    }

    async fn print_status(&self) -> Result<DeviceStatus> {
        self.receive(SimCommand::PrintStatus)?;
        let mut state = self.lock();
        state.polls += 1;
        let status = match state.script.pop_front() {
            Some(status) => status,
            None => state.last_status.clone(),
        };
        Ok(status)
    }

    async fn end_print(&self) -> Result<()> {
        self.receive(SimCommand::EndPrint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_runs_then_last_status_repeats() {
        let printer = SimulatedPrinter::new().finishing_after(3);

        assert!(matches!(
            printer.print_status().await,
            Ok(DeviceStatus::Printing { .. })
        ));
        assert!(matches!(
            printer.print_status().await,
            Ok(DeviceStatus::Printing { .. })
        ));
        assert_eq!(printer.print_status().await, Ok(DeviceStatus::Finished));
        assert_eq!(printer.print_status().await, Ok(DeviceStatus::Finished));
        assert_eq!(printer.polls(), 4);
    }

    #[tokio::test]
    async fn injected_failure_is_logged_and_returned() {
        let printer = SimulatedPrinter::new().failing(SimCommand::SetDensity, "density out of range");

        let err = printer.set_density(9).await.unwrap_err();
        assert_eq!(err, LabelwerkError::Device("density out of range".into()));
        assert_eq!(printer.commands(), vec![SimCommand::SetDensity]);
        assert_eq!(printer.density(), None);
    }

    #[tokio::test]
    async fn pages_are_counted_per_copy() {
        let printer = SimulatedPrinter::new();
        let image = EncodedImage::new(384, 100, vec![0; 8]);

        printer.send_page(&image, 3).await.expect("send");
        assert_eq!(printer.pages_sent(), 3);
    }

    #[test]
    fn metadata_can_be_removed() {
        assert!(SimulatedPrinter::new().model_metadata().is_some());
        assert!(SimulatedPrinter::new().without_metadata().model_metadata().is_none());
    }
}
