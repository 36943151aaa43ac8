// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print: the print job lifecycle shared by every label printer
// family. Covers page accounting, page and completion deadlines, and status polling.
// Printer families plug in their device commands through `TaskState`.

pub mod client;
pub mod poller;
pub mod polling_task;
pub mod runner;
pub mod sim;
pub mod task;

pub use client::PrinterClient;
pub use poller::{PollReport, poll_until_finished};
pub use polling_task::StatusPollingTask;
pub use runner::{JobSummary, PageRequest, run_job};
pub use sim::SimulatedPrinter;
pub use task::{JobProgress, PrintTask, TaskState};
