// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator — converts every record of a vault on a worker pool.
//
// Workers pull jobs from one shared FIFO queue. Results, failures and job
// statuses each sit behind their own mutex, and no lock is held while a
// record is being converted. A failing record is recorded and its
// siblings carry on; the caller decides what a partial batch means.

use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Mutex;

use tracing::{debug, info, instrument, warn};

use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{IconSource, JobStatus, Record, RenderedImage};

use crate::pipeline::QrConverter;

/// One queued conversion.
#[derive(Debug)]
struct Job<'a> {
    index: usize,
    key: String,
    record: &'a Record,
}

/// A record that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    /// Position of the record in the input.
    pub index: usize,
    /// Unique result key of the record.
    pub name: String,
    pub message: String,
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Result key to input position and image.
    pub results: HashMap<String, (usize, RenderedImage)>,
    /// Failures in input order.
    pub failures: Vec<JobFailure>,
    /// Final status of every job, by input position.
    pub statuses: Vec<JobStatus>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Images with their keys, in input order.
    pub fn images(&self) -> Vec<(&str, &RenderedImage)> {
        let mut images: Vec<_> = self
            .results
            .iter()
            .map(|(key, (index, image))| (*index, key.as_str(), image))
            .collect();
        images.sort_by_key(|(index, _, _)| *index);
        images.into_iter().map(|(_, key, image)| (key, image)).collect()
    }

    /// The images in input order, or `BatchFailed` listing every failure.
    pub fn into_result(self) -> Result<Vec<(String, RenderedImage)>> {
        if !self.failures.is_empty() {
            return Err(Bw2QrError::BatchFailed(
                self.failures.into_iter().map(|f| f.message).collect(),
            ));
        }
        let mut images: Vec<_> = self
            .results
            .into_iter()
            .map(|(key, (index, image))| (index, key, image))
            .collect();
        images.sort_by_key(|(index, _, _)| *index);
        Ok(images.into_iter().map(|(_, key, image)| (key, image)).collect())
    }
}

/// Runs a [`QrConverter`] over many records in parallel.
#[derive(Debug)]
pub struct BatchOrchestrator<I> {
    converter: QrConverter<I>,
    /// Requested pool size; `None` uses the available parallelism.
    workers: Option<NonZeroUsize>,
}

impl<I: IconSource> BatchOrchestrator<I> {
    pub fn new(converter: QrConverter<I>) -> Self {
        Self {
            converter,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: Option<NonZeroUsize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn converter(&self) -> &QrConverter<I> {
        &self.converter
    }

    /// Number of threads used for `jobs` jobs.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let pool = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
        });
        pool.get().min(jobs).max(1)
    }

    /// Convert every record. Each record is processed exactly once.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn run(&self, records: &[Record]) -> BatchOutcome {
        let keys = unique_keys(records);
        let total = records.len();
        let queue: Mutex<VecDeque<Job<'_>>> = Mutex::new(
            records
                .iter()
                .zip(keys)
                .enumerate()
                .map(|(index, (record, key))| Job { index, key, record })
                .collect(),
        );
        let results = Mutex::new(HashMap::with_capacity(total));
        let failures = Mutex::new(Vec::new());
        let statuses = Mutex::new(vec![JobStatus::Queued; total]);

        let workers = self.worker_count(total);
        info!(records = total, workers, "Starting batch conversion");

        std::thread::scope(|scope| {
            for worker in 0..workers {
                let (queue, results, failures, statuses) = (&queue, &results, &failures, &statuses);
                scope.spawn(move || {
                    self.work(worker, total, queue, results, failures, statuses);
                });
            }
        });

        let mut failures = failures.into_inner().unwrap_or_else(|e| e.into_inner());
        failures.sort_by_key(|f: &JobFailure| f.index);
        let outcome = BatchOutcome {
            results: results.into_inner().unwrap_or_else(|e| e.into_inner()),
            failures,
            statuses: statuses.into_inner().unwrap_or_else(|e| e.into_inner()),
        };
        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "Batch conversion finished"
        );
        outcome
    }

    fn work(
        &self,
        worker: usize,
        total: usize,
        queue: &Mutex<VecDeque<Job<'_>>>,
        results: &Mutex<HashMap<String, (usize, RenderedImage)>>,
        failures: &Mutex<Vec<JobFailure>>,
        statuses: &Mutex<Vec<JobStatus>>,
    ) {
        loop {
            // Released before the conversion starts.
            let Some(job) = queue.lock().ok().and_then(|mut q| q.pop_front()) else {
                break;
            };
            set_status(statuses, job.index, JobStatus::InProgress);
            debug!(worker, index = job.index, name = %job.key, "job started");

            match self.converter.convert_record(job.record) {
                Ok(image) => {
                    if let Ok(mut results) = results.lock() {
                        results.insert(job.key, (job.index, image));
                    }
                    set_status(statuses, job.index, JobStatus::Succeeded);
                }
                Err(err) => {
                    warn!(worker, name = %job.key, scope = ?err.scope(), %err, "record failed");
                    if let Ok(mut failures) = failures.lock() {
                        failures.push(JobFailure {
                            index: job.index,
                            name: job.key,
                            message: err.to_string(),
                        });
                    }
                    set_status(statuses, job.index, JobStatus::Failed);
                }
            }

            let done = statuses
                .lock()
                .map(|s| s.iter().filter(|status| status.is_done()).count())
                .unwrap_or(0);
            info!(done, total, "progress");
        }
    }
}

fn set_status(statuses: &Mutex<Vec<JobStatus>>, index: usize, status: JobStatus) {
    if let Ok(mut statuses) = statuses.lock() {
        statuses[index] = status;
    }
}

/// Result keys for `records`: the record name, with ` (2)`, ` (3)`, ...
/// appended to later records sharing a name.
fn unique_keys(records: &[Record]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut taken: HashSet<String> = records.iter().map(|r| r.name.clone()).collect();
    records
        .iter()
        .map(|record| {
            let count = seen.entry(record.name.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                return record.name.clone();
            }
            let mut n = *count;
            loop {
                let key = format!("{} ({n})", record.name);
                if taken.insert(key.clone()) {
                    break key;
                }
                n += 1;
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{SolidIcon, style};
    use bw2qr_core::{NoIcons, StyleConfig};
    use bw2qr_document::{PayloadEncoder, Verifier};

    fn orchestrator() -> BatchOrchestrator<NoIcons> {
        let converter = QrConverter::new(style(), PayloadEncoder::new(), NoIcons).unwrap();
        BatchOrchestrator::new(converter)
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("site-{i}")).with_login(format!("user{i}"), "pw", ""))
            .collect()
    }

    #[test]
    fn every_job_is_done_exactly_once() {
        let records = records(6);
        let outcome = orchestrator()
            .with_workers(NonZeroUsize::new(3))
            .run(&records);
        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded(), 6);
        assert!(outcome.statuses.iter().all(|s| *s == JobStatus::Succeeded));

        let images = outcome.into_result().unwrap();
        let names: Vec<_> = images.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["site-0", "site-1", "site-2", "site-3", "site-4", "site-5"]);
    }

    #[test]
    fn one_bad_record_does_not_stop_the_others() {
        let mut records = records(3);
        records[1].set_field("notes", "n".repeat(1000));
        let outcome = orchestrator()
            .with_workers(NonZeroUsize::new(2))
            .run(&records);

        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].name, "site-1");
        assert!(outcome.failures[0].message.contains("site-1"));
        assert_eq!(outcome.statuses[1], JobStatus::Failed);

        match outcome.into_result() {
            Err(Bw2QrError::BatchFailed(messages)) => assert_eq!(messages.len(), 1),
            other => panic!("expected BatchFailed, got {other:?}"),
        }
    }

    #[test]
    fn logo_fallback_still_yields_verified_images() {
        let style = StyleConfig {
            frame_logo_size: 300,
            ..style()
        };
        let converter = QrConverter::new(style, PayloadEncoder::new(), SolidIcon::default()).unwrap();
        let orchestrator = BatchOrchestrator::new(converter);
        let records: Vec<_> = records(2)
            .into_iter()
            .map(|r| r.with_url("https://example.org"))
            .collect();

        let outcome = orchestrator.run(&records);
        assert!(outcome.is_success());
        for (index, (name, image)) in outcome.images().into_iter().enumerate() {
            assert!(!image.has_logo);
            let payload = orchestrator
                .converter()
                .encoder()
                .encode_record(&records[index])
                .unwrap();
            assert_eq!(name, records[index].name);
            assert!(Verifier::new().verify(image, payload.as_str()));
        }
    }

    #[test]
    fn duplicate_names_keep_every_image() {
        let records = vec![
            Record::new("mail").with_login("a", "1", ""),
            Record::new("mail").with_login("b", "2", ""),
            Record::new("mail (2)").with_login("c", "3", ""),
        ];
        assert_eq!(unique_keys(&records), ["mail", "mail (3)", "mail (2)"]);

        let outcome = orchestrator().run(&records);
        assert_eq!(outcome.succeeded(), 3);
    }

    #[test]
    fn empty_input_is_an_empty_success() {
        let outcome = orchestrator().run(&[]);
        assert!(outcome.is_success());
        assert!(outcome.into_result().unwrap().is_empty());
    }

    #[test]
    fn pool_never_exceeds_the_job_count() {
        let orchestrator = orchestrator().with_workers(NonZeroUsize::new(8));
        assert_eq!(orchestrator.worker_count(3), 3);
        assert_eq!(orchestrator.worker_count(20), 8);
        assert_eq!(orchestrator.worker_count(0), 1);
    }
}
