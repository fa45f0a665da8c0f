//! Grading a batch of tasks

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, instrument};

use crate::runner::{Judge, JudgeError};
use crate::types::{SessionResult, Task, TaskResult};

impl Judge {
    /// Grade every task and collect the results in the order given
    ///
    /// With `jobs = 1` tasks are graded one after another. Higher values
    /// grade up to that many tasks at once; test points within a task always
    /// run sequentially.
    #[instrument(skip_all, fields(tasks = tasks.len(), jobs = self.config().jobs))]
    pub async fn run_session(&self, tasks: &[Task]) -> Result<SessionResult, JudgeError> {
        let results = if self.config().jobs <= 1 {
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                results.push(self.score_task(task).await?);
            }
            results
        } else {
            self.score_concurrently(tasks).await?
        };

        let session = SessionResult {
            tasks: tasks.iter().cloned().zip(results).collect(),
        };

        info!(
            score = session.total_score(),
            ready = session.ready_to_submit(),
            "session graded"
        );

        Ok(session)
    }

    async fn score_concurrently(&self, tasks: &[Task]) -> Result<Vec<TaskResult>, JudgeError> {
        let permits = Arc::new(Semaphore::new(self.config().jobs));
        let mut set = JoinSet::new();

        for (slot, task) in tasks.iter().enumerate() {
            let judge = self.clone();
            let task = task.clone();
            let permits = Arc::clone(&permits);
            set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| JudgeError::Interrupted)?;
                let result = judge.score_task(&task).await?;
                Ok::<_, JudgeError>((slot, result))
            });
        }

        let mut results: Vec<Option<TaskResult>> = vec![None; tasks.len()];
        while let Some(joined) = set.join_next().await {
            let (slot, result) = joined??;
            results[slot] = Some(result);
        }

        results
            .into_iter()
            .map(|result| result.ok_or(JudgeError::Interrupted))
            .collect()
    }
}
