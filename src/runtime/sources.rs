use super::RecordSource;
use crate::imports::*;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/*
    Sources:
    * ChannelSource - Records pushed by another task through an mpsc channel. Closed once every sender is dropped.
    * JsonEventSource - Replays a fixed list of events forever, each wrapped as {"meta": event}
*/
pub struct ChannelSource {
    topic: String,
    receiver: mpsc::Receiver<Record>,
}

impl ChannelSource {
    pub fn new(topic: impl Into<String>, receiver: mpsc::Receiver<Record>) -> Self {
        ChannelSource {
            topic: topic.into(),
            receiver,
        }
    }

    // Convenience for tests and in-process producers.
    pub fn channel(topic: impl Into<String>, capacity: usize) -> (mpsc::Sender<Record>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, ChannelSource::new(topic, receiver))
    }
}

#[async_trait]
impl RecordSource for ChannelSource {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn recv(&mut self) -> Option<Record> {
        self.receiver.recv().await
    }
}

#[derive(Debug)]
pub struct JsonEventSource {
    topic: String,
    events: Vec<MetaValue>,
    position: usize,
    interval: Option<Duration>,
}

impl JsonEventSource {
    #[tracing::instrument(skip(topic, path), fields(path = %path.as_ref().display()), err)]
    pub async fn load(topic: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()))?;
        let value: MetaValue = serde_json::from_str(&text)
            .with_context(|| format!("Event file {} is not valid JSON", path.display()))?;

        let source = Self::from_events(topic, value.as_array_or_err("events")?.clone())?;
        tracing::info!(topic = %source.topic, event_count = source.events.len(), "Loaded events");
        Ok(source)
    }

    // Every event must be an object, it becomes the "meta" subtree of the emitted record.
    pub fn from_events(topic: impl Into<String>, events: Vec<MetaValue>) -> Result<Self> {
        let topic = topic.into();
        if events.is_empty() {
            return Err(anyhow::anyhow!("Event source '{}' has no events", topic));
        }
        for (index, event) in events.iter().enumerate() {
            event.as_object_or_err(&format!("events[{index}]"))?;
        }
        Ok(JsonEventSource {
            topic,
            events,
            position: 0,
            interval: None,
        })
    }

    // Pause before every emitted record, like a camera producing frames at a fixed rate.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

#[async_trait]
impl RecordSource for JsonEventSource {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn recv(&mut self) -> Option<Record> {
        if let Some(interval) = self.interval {
            tokio::time::sleep(interval).await;
        }
        let event = self.events.get(self.position)?.clone();
        self.position = (self.position + 1) % self.events.len();
        Some(Record::from(ObjectBuilder::new().insert("meta", event)))
    }
}
