//! # Pipeline Driver
//!
//! Runs the pipeline on a single task fed by the stream consumer.
//!
//! ```text
//! Stream Consumer ──StreamEvent──→ [mpsc] ──→ PipelineDriver ──→ TokenIndexingPipeline
//!                                                   ↑
//!                               shutdown [watch] ───┘
//! ```
//!
//! The recency windows and the ownership registry are only mutated from
//! this task, so producers on other tasks never race on them.

use shared_types::StreamEvent;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument};

use crate::ports::{EventOutcome, RecordSink, TokenIndexingApi, TokenValidator};
use crate::service::TokenIndexingPipeline;

/// Single coordinating task for a [`TokenIndexingPipeline`].
pub struct PipelineDriver<V, S> {
    pipeline: TokenIndexingPipeline<V, S>,
    events: mpsc::Receiver<StreamEvent>,
    shutdown: watch::Receiver<bool>,
}

impl<V, S> PipelineDriver<V, S>
where
    V: TokenValidator,
    S: RecordSink,
{
    pub fn new(
        pipeline: TokenIndexingPipeline<V, S>,
        events: mpsc::Receiver<StreamEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            pipeline,
            events,
            shutdown,
        }
    }

    /// Create a driver together with its event sender and shutdown sender.
    pub fn channel(
        pipeline: TokenIndexingPipeline<V, S>,
        buffer: usize,
    ) -> (mpsc::Sender<StreamEvent>, watch::Sender<bool>, Self) {
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (event_tx, shutdown_tx, Self::new(pipeline, event_rx, shutdown_rx))
    }

    /// Process events until shutdown is signalled, the shutdown sender is
    /// dropped, or every event sender is dropped. Returns the pipeline.
    ///
    /// Events still queued when shutdown is signalled are not processed.
    #[instrument(skip_all, name = "token_pipeline_driver")]
    pub async fn run(mut self) -> TokenIndexingPipeline<V, S> {
        info!("Token pipeline driver started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    let stop = changed.is_err() || *self.shutdown.borrow();
                    if stop {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                event = self.events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        info!("Event channel closed, exiting");
                        break;
                    }
                },
            }
        }

        let stats = self.pipeline.stats();
        info!(
            transactions_indexed = stats.transactions_indexed,
            blocks_processed = stats.blocks_processed,
            tracked_outputs = stats.tracked_outputs,
            errors = stats.errors,
            "Token pipeline driver stopped"
        );
        self.pipeline
    }

    fn dispatch(&mut self, event: StreamEvent) {
        match self.pipeline.handle_event(event) {
            Ok(EventOutcome::Transaction(outcome)) => {
                debug!(outcome = ?outcome, "Handled mempool transaction");
            }
            Ok(EventOutcome::Block(outcome)) => {
                debug!(outcome = ?outcome, "Handled block");
            }
            Err(err) => {
                error!(error = %err, "Failed to handle stream event");
            }
        }
    }
}
