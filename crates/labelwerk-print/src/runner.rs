// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Drive a print task through its whole lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use labelwerk_core::error::Result;
use labelwerk_core::types::{EncodedImage, JobId};

use crate::task::PrintTask;

/// One page of a job and how many copies of it to print.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub image: EncodedImage,
    pub quantity: u32,
}

impl PageRequest {
    pub fn new(image: EncodedImage, quantity: u32) -> Self {
        Self { image, quantity }
    }
}

/// Record of a job that printed successfully.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub pages_printed: u32,
    /// Status queries needed to observe completion.
    pub polls: u32,
    /// Time spent waiting for completion.
    pub wait_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Initialize `task`, submit every page in order, and wait for completion.
///
/// Stops at the first failure and returns it unchanged.
#[instrument(skip_all, fields(job_id = %task.job_id(), pages = pages.len()))]
pub async fn run_job(task: &mut dyn PrintTask, pages: &[PageRequest]) -> Result<JobSummary> {
    let started_at = Utc::now();

    task.initialize().await?;
    for page in pages {
        task.submit_page(&page.image, Some(page.quantity)).await?;
    }
    let report = task.wait_for_finished().await?;

    let summary = JobSummary {
        job_id: task.job_id(),
        pages_printed: task.pages_printed(),
        polls: report.polls,
        wait_ms: report.elapsed.as_millis() as u64,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        pages_printed = summary.pages_printed,
        polls = summary.polls,
        "job complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use labelwerk_core::config::PrintOptionsOverrides;
    use labelwerk_core::error::LabelwerkError;
    use labelwerk_core::types::JobPhase;

    use super::*;
    use crate::polling_task::StatusPollingTask;
    use crate::sim::SimulatedPrinter;

    fn page(quantity: u32) -> PageRequest {
        PageRequest::new(EncodedImage::new(384, 200, vec![1, 2, 3]), quantity)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_full_job() {
        let printer = Arc::new(SimulatedPrinter::new().finishing_after(3));
        let mut task = StatusPollingTask::new(
            Arc::clone(&printer),
            Some(PrintOptionsOverrides::default().total_pages(3)),
        );

        let summary = run_job(&mut task, &[page(1), page(2)]).await.expect("job");

        assert_eq!(summary.job_id, task.job_id());
        assert_eq!(summary.pages_printed, 3);
        assert_eq!(summary.polls, 3);
        assert!((600..610).contains(&summary.wait_ms), "{}", summary.wait_ms);
        assert!(summary.finished_at >= summary.started_at);
        assert_eq!(printer.pages_sent(), 3);
    }

    #[tokio::test]
    async fn stops_at_first_overflowing_page() {
        let printer = Arc::new(SimulatedPrinter::new());
        let mut task = StatusPollingTask::new(Arc::clone(&printer), None);

        let err = run_job(&mut task, &[page(1), page(1)]).await.unwrap_err();

        assert!(matches!(err, LabelwerkError::InvariantViolation(_)));
        assert_eq!(printer.pages_sent(), 1);
        assert_eq!(printer.polls(), 0);
        assert_eq!(task.phase(), JobPhase::Printing);
    }
}
