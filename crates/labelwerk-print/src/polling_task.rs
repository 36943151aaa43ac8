// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print task for printers that report completion only through status polling.
//
// Sequence: label type → density → print start → page(s) → poll status until
// finished → print end.

use std::sync::Arc;

use async_trait::async_trait;

use labelwerk_core::config::PrintOptionsOverrides;
use labelwerk_core::error::Result;
use labelwerk_core::types::EncodedImage;

use crate::client::PrinterClient;
use crate::poller::PollReport;
use crate::task::{JobProgress, PrintTask, TaskState};

pub struct StatusPollingTask<C: PrinterClient + ?Sized> {
    state: TaskState<C>,
}

impl<C: PrinterClient + ?Sized> StatusPollingTask<C> {
    pub fn new(client: Arc<C>, overrides: Option<PrintOptionsOverrides>) -> Self {
        Self {
            state: TaskState::new(client, overrides),
        }
    }
}

#[async_trait]
impl<C: PrinterClient + ?Sized> PrintTask for StatusPollingTask<C> {
    async fn initialize(&mut self) -> Result<()> {
        let client = Arc::clone(self.state.client());
        let options = *self.state.options();
        self.state
            .run_initialize(async move {
                client.set_label_type(options.label_type).await?;
                client.set_density(options.density).await?;
                client.start_print(options.total_pages).await
            })
            .await
    }

    async fn submit_page(&mut self, image: &EncodedImage, quantity: Option<u32>) -> Result<()> {
        let quantity = quantity.unwrap_or(1);
        let client = Arc::clone(self.state.client());
        self.state
            .run_page(quantity, async move { client.send_page(image, quantity).await })
            .await
    }

    async fn wait_for_finished(&mut self) -> Result<PollReport> {
        let client = Arc::clone(self.state.client());
        self.state
            .run_completion(|| client.print_status(), client.end_print())
            .await
    }

    fn progress(&self) -> &JobProgress {
        self.state.progress()
    }

    fn printhead_pixels(&self) -> Option<u32> {
        self.state.printhead_pixels()
    }
}
