// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print task lifecycle: the capability set every printer family implements,
// and the shared state machine those implementations compose.
//
// Lifecycle: Created → Initialized → Printing ⇄ Printing → AwaitingCompletion
// → Finished | Failed. A device error in any phase moves the job to Failed.
// Page accounting and deadlines are enforced here so that printer families
// only supply the commands for each phase.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use labelwerk_core::config::{PrintOptions, PrintOptionsOverrides};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::{DeviceStatus, EncodedImage, JobId, JobPhase};

use crate::client::PrinterClient;
use crate::poller::{PollReport, poll_until_finished};

/// Operation name used in page timeout errors.
pub const PAGE_PRINT: &str = "page print";

/// A single print job against one printer.
///
/// Callers sequence the calls: `initialize` once, `submit_page` zero or more
/// times, then `wait_for_finished`. A job is never reused after it resolves.
#[async_trait]
pub trait PrintTask: Send {
    /// Prepare the printer (label type, density, print start).
    async fn initialize(&mut self) -> Result<()>;

    /// Print `image` `quantity` times (1 when `None`).
    async fn submit_page(&mut self, image: &EncodedImage, quantity: Option<u32>) -> Result<()>;

    /// Wait until the printer reports the job finished.
    async fn wait_for_finished(&mut self) -> Result<PollReport>;

    /// Shared job bookkeeping.
    fn progress(&self) -> &JobProgress;

    /// Printhead width of the connected model, if known.
    fn printhead_pixels(&self) -> Option<u32>;

    fn job_id(&self) -> JobId {
        self.progress().job_id()
    }

    fn options(&self) -> &PrintOptions {
        self.progress().options()
    }

    fn phase(&self) -> JobPhase {
        self.progress().phase()
    }

    fn pages_printed(&self) -> u32 {
        self.progress().pages_printed()
    }
}

/// Page accounting and phase tracking for one job.
#[derive(Debug, Clone)]
pub struct JobProgress {
    job_id: JobId,
    options: PrintOptions,
    pages_printed: u32,
    phase: JobPhase,
    outcome: Option<Result<PollReport>>,
}

impl JobProgress {
    pub fn new(options: PrintOptions) -> Self {
        Self {
            job_id: JobId::new(),
            options,
            pages_printed: 0,
            phase: JobPhase::Created,
            outcome: None,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn pages_printed(&self) -> u32 {
        self.pages_printed
    }

    pub fn pages_remaining(&self) -> u32 {
        self.options.total_pages.saturating_sub(self.pages_printed)
    }

    /// Outcome of the completion wait, once it has run.
    pub fn outcome(&self) -> Option<&Result<PollReport>> {
        self.outcome.as_ref()
    }

    /// Verify that `quantity` more pages fit within `total_pages`.
    ///
    /// Does not change any state.
    pub fn check_add_page(&self, quantity: u32) -> Result<()> {
        if self.pages_printed.saturating_add(quantity) > self.options.total_pages {
            return Err(LabelwerkError::InvariantViolation(
                "Trying to print too many pages (task total_pages may not be set correctly)"
                    .into(),
            ));
        }
        Ok(())
    }

    fn require(&self, operation: &'static str, allowed: &[JobPhase]) -> Result<()> {
        if self.phase.is_resolved() {
            debug!(operation, phase = %self.phase, "job already resolved");
        } else if allowed.contains(&self.phase) {
            return Ok(());
        }
        Err(LabelwerkError::InvalidState {
            operation,
            phase: self.phase,
        })
    }
}

/// Shared state a printer family embeds to implement [`PrintTask`].
///
/// Each `run_*` method takes the family's device commands as a future and
/// wraps them with the lifecycle checks. Futures are lazy, so commands built
/// before a rejected check are never sent.
pub struct TaskState<C: PrinterClient + ?Sized> {
    progress: JobProgress,
    client: Arc<C>,
}

impl<C: PrinterClient + ?Sized> TaskState<C> {
    /// Resolve `overrides` against the defaults and start in `Created`.
    pub fn new(client: Arc<C>, overrides: Option<PrintOptionsOverrides>) -> Self {
        let options = PrintOptions::with_overrides(&overrides.unwrap_or_default());
        Self {
            progress: JobProgress::new(options),
            client,
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn progress(&self) -> &JobProgress {
        &self.progress
    }

    pub fn options(&self) -> &PrintOptions {
        self.progress.options()
    }

    pub fn check_add_page(&self, quantity: u32) -> Result<()> {
        self.progress.check_add_page(quantity)
    }

    pub fn printhead_pixels(&self) -> Option<u32> {
        self.client.model_metadata().map(|m| m.printhead_pixels)
    }

    /// Run one-time printer setup.
    #[instrument(skip_all, fields(job_id = %self.progress.job_id))]
    pub async fn run_initialize<Fut>(&mut self, setup: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        self.progress.require("initialize", &[JobPhase::Created])?;

        match setup.await {
            Ok(()) => {
                self.progress.phase = JobPhase::Initialized;
                info!(
                    label_type = ?self.progress.options.label_type,
                    label_code = self.progress.options.label_type.code(),
                    density = self.progress.options.density,
                    total_pages = self.progress.options.total_pages,
                    "print job initialized"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "print job setup failed");
                self.progress.phase = JobPhase::Failed;
                Err(e)
            }
        }
    }

    /// Send one page, `quantity` copies, bounded by the page timeout.
    ///
    /// `pages_printed` grows by `quantity` only if `send` succeeds in time.
    #[instrument(skip_all, fields(job_id = %self.progress.job_id, quantity = quantity))]
    pub async fn run_page<Fut>(&mut self, quantity: u32, send: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        self.progress
            .require("submit page", &[JobPhase::Initialized, JobPhase::Printing])?;
        if quantity == 0 {
            return Err(LabelwerkError::InvariantViolation(
                "page quantity must be at least 1".into(),
            ));
        }
        self.progress.check_add_page(quantity)?;

        self.progress.phase = JobPhase::Printing;
        let page_timeout = self.progress.options.page_timeout();

        match tokio::time::timeout(page_timeout, send).await {
            Ok(Ok(())) => {
                self.progress.pages_printed += quantity;
                debug!(
                    pages_printed = self.progress.pages_printed,
                    total_pages = self.progress.options.total_pages,
                    "page sent"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "page send failed");
                self.progress.phase = JobPhase::Failed;
                Err(e)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.progress.options.page_timeout_ms,
                    "page send timed out"
                );
                self.progress.phase = JobPhase::Failed;
                Err(LabelwerkError::Timeout {
                    operation: PAGE_PRINT,
                    after_ms: self.progress.options.page_timeout_ms,
                })
            }
        }
    }

    /// Poll `check` until the printer is done, then run `finish`.
    ///
    /// Once resolved, later calls return the recorded outcome without polling
    /// or running `finish` again.
    #[instrument(skip_all, fields(job_id = %self.progress.job_id))]
    pub async fn run_completion<F, CheckFut, FinishFut>(
        &mut self,
        check: F,
        finish: FinishFut,
    ) -> Result<PollReport>
    where
        F: FnMut() -> CheckFut,
        CheckFut: Future<Output = Result<DeviceStatus>>,
        FinishFut: Future<Output = Result<()>>,
    {
        if let Some(outcome) = &self.progress.outcome {
            debug!("completion already resolved, replaying outcome");
            return outcome.clone();
        }
        self.progress.require(
            "wait for finished",
            &[JobPhase::Initialized, JobPhase::Printing],
        )?;

        self.progress.phase = JobPhase::AwaitingCompletion;
        let options = self.progress.options;
        let polled =
            poll_until_finished(options.status_poll_interval(), options.status_timeout(), check)
                .await;

        let outcome = match polled {
            Ok(report) => finish.await.map(|()| report),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(report) => {
                self.progress.phase = JobPhase::Finished;
                info!(
                    polls = report.polls,
                    pages_printed = self.progress.pages_printed,
                    "print job finished"
                );
            }
            Err(e) => {
                self.progress.phase = JobPhase::Failed;
                warn!(error = %e, pages_printed = self.progress.pages_printed, "print job failed");
            }
        }
        self.progress.outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sim::SimulatedPrinter;

    fn image() -> EncodedImage {
        EncodedImage::new(384, 240, vec![0xAA; 64])
    }

    fn state_with(
        printer: SimulatedPrinter,
        total_pages: u32,
    ) -> (Arc<SimulatedPrinter>, TaskState<SimulatedPrinter>) {
        let printer = Arc::new(printer);
        let overrides = PrintOptionsOverrides::default().total_pages(total_pages);
        let state = TaskState::new(Arc::clone(&printer), Some(overrides));
        (printer, state)
    }

    async fn send(state: &mut TaskState<SimulatedPrinter>, quantity: u32) -> Result<()> {
        let client = Arc::clone(state.client());
        let img = image();
        state.run_page(quantity, async move { client.send_page(&img, quantity).await }).await
    }

    #[test]
    fn new_state_uses_defaults() {
        let state = TaskState::new(Arc::new(SimulatedPrinter::new()), None);
        assert_eq!(*state.options(), PrintOptions::default());
        assert_eq!(state.progress().phase(), JobPhase::Created);
        assert_eq!(state.progress().pages_printed(), 0);
        assert_eq!(state.progress().pages_remaining(), 1);
    }

    #[test]
    fn check_add_page_does_not_mutate() {
        let (_printer, state) = state_with(SimulatedPrinter::new(), 2);
        assert!(state.check_add_page(2).is_ok());
        assert!(state.check_add_page(2).is_ok());
        assert!(matches!(
            state.check_add_page(3),
            Err(LabelwerkError::InvariantViolation(_))
        ));
        assert_eq!(state.progress().pages_printed(), 0);
    }

    #[test]
    fn check_add_page_does_not_overflow() {
        let (_printer, state) = state_with(SimulatedPrinter::new(), 1);
        assert!(state.check_add_page(u32::MAX).is_err());
    }

    #[test]
    fn printhead_pixels_absent_for_unknown_model() {
        let (_printer, state) = state_with(SimulatedPrinter::new().without_metadata(), 1);
        assert_eq!(state.printhead_pixels(), None);
    }

    #[test]
    fn printhead_pixels_from_metadata() {
        let (_printer, state) = state_with(SimulatedPrinter::new(), 1);
        assert_eq!(state.printhead_pixels(), Some(384));
    }

    #[tokio::test]
    async fn failed_setup_does_not_initialize() {
        let (_printer, mut state) =
            state_with(SimulatedPrinter::new(), 1);

        let err = state
            .run_initialize(async { Err(LabelwerkError::Device("nack".into())) })
            .await
            .unwrap_err();

        assert_eq!(err, LabelwerkError::Device("nack".into()));
        assert_eq!(state.progress().phase(), JobPhase::Failed);
    }

    #[tokio::test]
    async fn page_before_initialize_is_rejected_without_sending() {
        let (printer, mut state) = state_with(SimulatedPrinter::new(), 1);

        let err = send(&mut state, 1).await.unwrap_err();
        assert!(matches!(err, LabelwerkError::InvalidState { .. }));
        assert_eq!(printer.pages_sent(), 0);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (printer, mut state) = state_with(SimulatedPrinter::new(), 1);
        state.run_initialize(async { Ok(()) }).await.expect("init");

        let err = send(&mut state, 0).await.unwrap_err();
        assert!(matches!(err, LabelwerkError::InvariantViolation(_)));
        assert_eq!(printer.pages_sent(), 0);
        assert_eq!(state.progress().phase(), JobPhase::Initialized);
    }

    #[tokio::test]
    async fn overflowing_page_is_rejected_before_device_call() {
        let (printer, mut state) = state_with(SimulatedPrinter::new(), 1);
        state.run_initialize(async { Ok(()) }).await.expect("init");

        send(&mut state, 1).await.expect("first page");
        let err = send(&mut state, 1).await.unwrap_err();

        assert!(matches!(err, LabelwerkError::InvariantViolation(_)));
        assert_eq!(printer.pages_sent(), 1);
        assert_eq!(state.progress().pages_printed(), 1);
        // Page overflow is the caller's mistake, the job itself is still usable.
        assert_eq!(state.progress().phase(), JobPhase::Printing);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_page_times_out_without_counting() {
        let printer = SimulatedPrinter::new().with_page_delay(Duration::from_secs(30));
        let (_printer, mut state) = state_with(printer, 1);
        state.run_initialize(async { Ok(()) }).await.expect("init");

        let err = send(&mut state, 1).await.unwrap_err();

        assert_eq!(
            err,
            LabelwerkError::Timeout {
                operation: PAGE_PRINT,
                after_ms: 10_000,
            }
        );
        assert_eq!(state.progress().pages_printed(), 0);
        assert_eq!(state.progress().phase(), JobPhase::Failed);
    }

    #[tokio::test]
    async fn completion_before_initialize_is_rejected() {
        let (printer, mut state) = state_with(SimulatedPrinter::new(), 1);
        let client = Arc::clone(state.client());

        let err = state
            .run_completion(|| client.print_status(), async { Ok(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, LabelwerkError::InvalidState { .. }));
        assert_eq!(printer.polls(), 0);
        assert!(state.progress().outcome().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_finish_fails_the_job() {
        let (_printer, mut state) = state_with(SimulatedPrinter::new().finishing_after(1), 1);
        state.run_initialize(async { Ok(()) }).await.expect("init");
        let client = Arc::clone(state.client());

        let err = state
            .run_completion(|| client.print_status(), async {
                Err(LabelwerkError::Device("end rejected".into()))
            })
            .await
            .unwrap_err();

        assert_eq!(err, LabelwerkError::Device("end rejected".into()));
        assert_eq!(state.progress().phase(), JobPhase::Failed);
    }
}
