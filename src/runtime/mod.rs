use crate::aggregator::{Aggregator, Ready};
use crate::imports::*;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

mod sources;

pub use sources::{ChannelSource, JsonEventSource};

/*
    Host adapter that drives an Aggregator from live inputs.

    Types:
    * RecordSource - One upstream topic. `recv` must be cancel safe, a timed out call is dropped mid-flight.
    * CycleRunner - Collects one record per open source into a Batch, aggregates it and sends the OutputBatch on
*/
#[async_trait]
pub trait RecordSource: Send {
    fn topic(&self) -> &str;

    // None once the source is exhausted or disconnected.
    async fn recv(&mut self) -> Option<Record>;
}

pub struct CycleRunner {
    aggregator: Arc<Aggregator<Ready>>,
    sources: Vec<Box<dyn RecordSource>>,
    cycle_timeout: Duration,
    cancel: CancellationToken,
}

impl CycleRunner {
    pub fn new(aggregator: Arc<Aggregator<Ready>>, cycle_timeout: Duration) -> Self {
        CycleRunner {
            aggregator,
            sources: Vec::new(),
            cycle_timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_source(mut self, source: impl RecordSource + 'static) -> Self {
        self.add_source(Box::new(source));
        self
    }

    pub fn add_source(&mut self, source: Box<dyn RecordSource>) {
        if self.sources.iter().any(|s| s.topic() == source.topic()) {
            tracing::warn!(topic = %source.topic(), "Duplicate source topic, later source overwrites earlier records");
        }
        self.sources.push(source);
    }

    // Cancelling the returned token stops `run` after the cycle in flight.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /*
        Waits for one record from each open source, all sharing a single deadline. A source that
        misses the deadline is present in the batch as None; a closed source is dropped for good.
        Returns None when no open source is left and nothing was received.
    */
    pub async fn next_cycle(&mut self) -> Option<Batch> {
        if self.sources.is_empty() {
            return None;
        }

        let deadline = Instant::now() + self.cycle_timeout;
        let mut batch = Batch::with_capacity(self.sources.len());
        let mut closed = Vec::new();

        for (index, source) in self.sources.iter_mut().enumerate() {
            let topic = source.topic().to_string();
            match tokio::time::timeout_at(deadline, source.recv()).await {
                Ok(Some(record)) => {
                    batch.insert(topic, Some(record));
                }
                Ok(None) => {
                    tracing::info!(topic = %topic, "Source closed");
                    closed.push(index);
                }
                Err(_) => {
                    tracing::debug!(topic = %topic, "Source missed the cycle deadline");
                    batch.insert(topic, None);
                }
            }
        }

        for index in closed.into_iter().rev() {
            self.sources.remove(index);
        }

        if self.sources.is_empty() && batch.values().all(Option::is_none) {
            return None;
        }
        Some(batch)
    }

    /*
        Runs cycles until cancelled, until every source is closed, or until the receiving side of
        `sender` goes away. Returns the number of output batches produced.
    */
    #[tracing::instrument(skip_all, fields(source_count = self.sources.len()))]
    pub async fn run(mut self, sender: mpsc::Sender<OutputBatch>) -> u64 {
        let cancel = self.cancel.clone();
        let mut produced = 0;

        loop {
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(produced, "Runner cancelled");
                    break;
                }
                batch = self.next_cycle() => batch,
            };

            let Some(batch) = batch else {
                tracing::info!(produced, "All sources closed");
                break;
            };

            let output = self.aggregator.process(&batch);
            produced += 1;

            if sender.send(output).await.is_err() {
                tracing::warn!(produced, "Output receiver dropped, stopping");
                break;
            }
        }

        produced
    }
}
