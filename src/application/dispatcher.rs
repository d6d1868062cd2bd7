use crate::application::pipeline::DecisionPipeline;
use crate::domain::entities::news_item::NewsItem;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Hands a stored item to the decision pipeline. Must not block.
pub trait NewsDispatch: Send + Sync {
    fn dispatch(&self, item: NewsItem);
}

/// Cloneable producer side of the dispatch queue.
#[derive(Clone)]
pub struct DispatchSender {
    tx: mpsc::UnboundedSender<NewsItem>,
}

impl NewsDispatch for DispatchSender {
    fn dispatch(&self, item: NewsItem) {
        let link = item.link.clone();
        if self.tx.send(item).is_err() {
            tracing::warn!(link = %link, "dispatcher stopped, item not analyzed");
        }
    }
}

/// Fixed pool of workers draining an unbounded queue, so dispatching never
/// waits while at most `workers` runs execute at once.
pub struct PipelineDispatcher {
    tx: mpsc::UnboundedSender<NewsItem>,
    workers: JoinSet<()>,
}

type SharedReceiver = Arc<Mutex<mpsc::UnboundedReceiver<NewsItem>>>;

impl PipelineDispatcher {
    pub fn start(pipeline: Arc<DecisionPipeline>, workers: usize, cancel: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let rx: SharedReceiver = Arc::new(Mutex::new(rx));
        let mut set = JoinSet::new();
        for worker_id in 0..workers.max(1) {
            set.spawn(worker_loop(
                worker_id,
                rx.clone(),
                pipeline.clone(),
                cancel.clone(),
            ));
        }
        tracing::info!(workers = workers.max(1), "pipeline dispatcher started");
        Self { tx, workers: set }
    }

    pub fn sender(&self) -> DispatchSender {
        DispatchSender {
            tx: self.tx.clone(),
        }
    }

    /// Stops accepting items and waits until the queue is drained. Returns
    /// early if the workers were cancelled. Other live senders keep the
    /// queue open.
    pub async fn shutdown(self) {
        let Self { tx, mut workers } = self;
        drop(tx);
        while let Some(res) = workers.join_next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "dispatcher worker failed");
            }
        }
    }
}

impl NewsDispatch for PipelineDispatcher {
    fn dispatch(&self, item: NewsItem) {
        self.sender().dispatch(item);
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: SharedReceiver,
    pipeline: Arc<DecisionPipeline>,
    cancel: CancellationToken,
) {
    loop {
        let next = {
            let mut rx = rx.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                item = rx.recv() => item,
            }
        };
        let Some(item) = next else {
            break;
        };
        if !run_job(&pipeline, item, &cancel).await {
            break;
        }
    }
    tracing::debug!(worker_id, "dispatcher worker stopped");
}

/// Runs one item on its own task so a panic is contained. Returns false
/// when cancelled mid-run.
async fn run_job(pipeline: &Arc<DecisionPipeline>, item: NewsItem, cancel: &CancellationToken) -> bool {
    let mut job = {
        let pipeline = pipeline.clone();
        let item = item.clone();
        tokio::spawn(async move { pipeline.process(&item).await })
    };

    let joined = tokio::select! {
        res = &mut job => res,
        _ = cancel.cancelled() => {
            job.abort();
            tracing::info!(link = %item.link, "in-flight run dropped on shutdown");
            return false;
        }
    };

    match joined {
        Ok(Ok(decision)) => {
            tracing::debug!(link = %item.link, action = %decision.action, "run finished");
        }
        Ok(Err(e)) => {
            tracing::error!(link = %item.link, error = %e, "decision could not be stored");
        }
        Err(e) => {
            tracing::error!(link = %item.link, error = %e, "pipeline run aborted");
            if let Err(store_err) = pipeline.record_failure(&item, &format!("pipeline run aborted: {e}")) {
                tracing::error!(link = %item.link, error = %store_err, "failed to store ERROR decision");
            }
        }
    }
    true
}
