use super::handle::{MatcherHandle, QueuedTask, SharedTaskStates, TaskEntry};
use super::task::{MatchJob, TaskState, TaskStatus};
use anyhow::{bail, Result};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct MatcherSettings {
    /// Number of concurrent workers consuming the queue.
    pub workers: usize,
    /// How long the fake analysis takes.
    pub analysis_delay: Duration,
    /// Backpressure limit for the broker channel.
    pub queue_capacity: usize,
    /// Inclusive bounds for the drawn compatibility score.
    pub score_min: u8,
    pub score_max: u8,
    /// How long finished results stay readable before they are pruned.
    pub result_retention: Duration,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        MatcherSettings {
            workers: 2,
            analysis_delay: Duration::from_secs(10),
            queue_capacity: 128,
            score_min: 50,
            score_max: 99,
            result_retention: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Pool of background workers executing match jobs.
pub struct MatchWorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown_token: CancellationToken,
}

impl MatchWorkerPool {
    /// Starts the workers and returns the handle used to feed them.
    pub fn start(
        settings: MatcherSettings,
        shutdown_token: CancellationToken,
    ) -> (MatcherHandle, MatchWorkerPool) {
        let (job_tx, job_rx) = mpsc::channel(settings.queue_capacity);
        let task_states: SharedTaskStates = Arc::new(RwLock::new(HashMap::new()));
        let job_rx = Arc::new(Mutex::new(job_rx));

        info!("Starting {} match workers", settings.workers);
        let mut workers: Vec<JoinHandle<()>> = (0..settings.workers)
            .map(|worker_index| {
                tokio::spawn(worker_loop(
                    worker_index,
                    settings.clone(),
                    job_rx.clone(),
                    task_states.clone(),
                    shutdown_token.clone(),
                ))
            })
            .collect();
        workers.push(tokio::spawn(sweeper_loop(
            settings.result_retention,
            task_states.clone(),
            shutdown_token.clone(),
        )));

        (
            MatcherHandle::new(job_tx, task_states),
            MatchWorkerPool {
                workers,
                shutdown_token,
            },
        )
    }

    /// Cancels all workers and waits for them to stop.
    ///
    /// A job in flight finishes its current task before the worker exits.
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
        info!("Match worker pool stopped");
    }
}

async fn worker_loop(
    worker_index: usize,
    settings: MatcherSettings,
    job_rx: Arc<Mutex<mpsc::Receiver<QueuedTask>>>,
    task_states: SharedTaskStates,
    shutdown_token: CancellationToken,
) {
    debug!("Match worker {} started", worker_index);
    loop {
        let task = tokio::select! {
            _ = shutdown_token.cancelled() => break,
            task = async { job_rx.lock().await.recv().await } => match task {
                Some(task) => task,
                None => break,
            },
        };

        debug!("Worker {} picked up task {}", worker_index, task.id);
        task_states.write().await.insert(
            task.id.clone(),
            TaskEntry::new(TaskState {
                status: TaskStatus::Started,
                result: None,
            }),
        );

        let state = match analyze(&task.job, &settings).await {
            Ok(result_text) => TaskState {
                status: TaskStatus::Success,
                result: Some(result_text),
            },
            Err(err) => {
                error!("Task {} failed: {}", task.id, err);
                TaskState {
                    status: TaskStatus::Failure,
                    result: Some(err.to_string()),
                }
            }
        };
        task_states.write().await.insert(task.id, TaskEntry::new(state));
    }
    debug!("Match worker {} stopped", worker_index);
}

/// Drops finished entries once they outlive the retention window, so the
/// result map does not grow without bound.
async fn sweeper_loop(
    retention: Duration,
    task_states: SharedTaskStates,
    shutdown_token: CancellationToken,
) {
    let sweep_interval = (retention / 4).clamp(Duration::from_millis(25), Duration::from_secs(60));
    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => break,
            _ = tokio::time::sleep(sweep_interval) => {}
        }

        let mut states = task_states.write().await;
        let before = states.len();
        states.retain(|_, entry| match entry.finished_at {
            Some(finished_at) => finished_at.elapsed() < retention,
            None => true,
        });
        let pruned = before - states.len();
        if pruned > 0 {
            debug!("Pruned {} expired task results", pruned);
        }
    }
}

/// Pretend AI: sleep, then draw a score and format a verdict.
async fn analyze(job: &MatchJob, settings: &MatcherSettings) -> Result<String> {
    if job.resume_text.trim().is_empty() {
        bail!("Cannot score an empty resume");
    }
    if job.vacancy_text.trim().is_empty() {
        bail!("Cannot score against an empty vacancy description");
    }

    tokio::time::sleep(settings.analysis_delay).await;

    let score = rand::rng().random_range(settings.score_min..=settings.score_max);
    let vacancy_preview: String = job.vacancy_text.chars().take(30).collect();

    Ok(format!(
        "[AI ANALYZED ASYNC]\n\
         Compatibility: {}%\n\
         \n\
         Resume analysis (ran in the background):\n\
         The candidate is a fit.\n\
         Vacancy text: {}...",
        score, vacancy_preview
    ))
}
