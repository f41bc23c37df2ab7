// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr-batch — record to verified image, for one record or a whole vault.

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{BatchOrchestrator, BatchOutcome, JobFailure};
pub use pipeline::QrConverter;
