// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk: dry-run a label print job against the simulated printer.
//
// Usage: labelwerk [OPTIONS_JSON]
//
// OPTIONS_JSON is an optional file of print option overrides, e.g.
// {"total_pages": 3, "label_type": "continuous"}. The job prints one copy of
// a blank label per declared page and reports the summary as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use labelwerk_core::config::PrintOptionsOverrides;
use labelwerk_core::error::Result;
use labelwerk_core::human_errors::humanize_error;
use labelwerk_core::types::EncodedImage;
use labelwerk_print::{
    JobSummary, PageRequest, PrintTask, SimulatedPrinter, StatusPollingTask, run_job,
};

/// Status query on which the simulated printer reports finished.
const SIMULATED_FINISH_POLL: u32 = 3;

/// Blank label height in dots.
const LABEL_HEIGHT_PX: u32 = 240;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Labelwerk starting");

    match run(std::env::args().nth(1)).await {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to render job summary");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            let human = humanize_error(&e);
            tracing::error!(error = %e, retriable = human.retriable, "print job failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(options_path: Option<String>) -> Result<JobSummary> {
    let overrides = match options_path {
        Some(path) => PrintOptionsOverrides::load(&path)?,
        None => PrintOptionsOverrides::default(),
    };

    let printer = Arc::new(SimulatedPrinter::new().finishing_after(SIMULATED_FINISH_POLL));
    let mut task = StatusPollingTask::new(printer, Some(overrides));

    let width = task.printhead_pixels().unwrap_or(384);
    tracing::info!(
        job_id = %task.job_id(),
        printhead_pixels = width,
        total_pages = task.options().total_pages,
        "prepared print job"
    );

    let row_bytes = width.div_ceil(8) as usize;
    let blank = EncodedImage::new(
        width,
        LABEL_HEIGHT_PX,
        vec![0u8; row_bytes * LABEL_HEIGHT_PX as usize],
    );
    let pages: Vec<PageRequest> = (0..task.options().total_pages)
        .map(|_| PageRequest::new(blank.clone(), 1))
        .collect();

    run_job(&mut task, &pages).await
}
