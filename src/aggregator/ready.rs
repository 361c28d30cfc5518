use super::{diagnostic, merge, Aggregator, Closed, Ready, MAIN_TOPIC};
use crate::imports::*;
use std::sync::atomic::Ordering;

impl Aggregator<Ready> {
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    // Cycles processed so far. Diagnostic only, never part of the output.
    pub fn cycles(&self) -> u64 {
        self.state.cycles.load(Ordering::Relaxed)
    }

    /*
        Aggregates one cycle. Absent records are skipped; the output's first entry is always
        "main" and carries the reduced metadata (plus extras and image when enabled), followed
        by the live upstream records unchanged when forwarding is on.
    */
    #[tracing::instrument(skip_all, fields(topic_count = batch.len()))]
    pub fn process(&self, batch: &Batch) -> OutputBatch {
        let config = &self.state.config;
        let verbose = config.debug();
        let cycle = self.state.cycles.fetch_add(1, Ordering::Relaxed) + 1;

        let live: Vec<(&str, &Record)> = batch
            .iter()
            .filter_map(|(topic, record)| record.as_ref().map(|r| (topic.as_str(), r)))
            .collect();
        diagnostic!(
            verbose,
            cycle,
            live_count = live.len(),
            absent_count = batch.len() - live.len(),
            "Processing cycle"
        );

        let mut data = MetaMap::new();
        let written = merge::reduce_aggregations(
            config.aggregations(),
            &live,
            config.append_op_to_key(),
            &mut data,
            verbose,
        );

        if config.forward_extra_fields() {
            let merged = merge::merge_extra_fields(
                &mut data,
                &live,
                config.aggregations(),
                &written,
                verbose,
            );
            diagnostic!(verbose, cycle, merged, "Merged extra fields");
        }

        let mut main = Record::new(data);
        if config.forward_image() {
            match merge::first_image(&live) {
                Some((topic, record)) => {
                    diagnostic!(verbose, cycle, topic = %topic, "Forwarding image");
                    main.image = record.image.clone();
                    main.format = record.format.clone();
                }
                None => diagnostic!(verbose, cycle, "No image to forward"),
            }
        }

        let mut output = OutputBatch::with_capacity(1 + live.len());
        output.insert(MAIN_TOPIC.to_string(), main);

        if config.forward_upstream_data() {
            for (topic, record) in &live {
                if *topic == MAIN_TOPIC {
                    tracing::warn!(cycle, "Upstream topic 'main' collides with the aggregated output, not forwarded");
                    continue;
                }
                output.insert(topic.to_string(), (*record).clone());
            }
        }

        diagnostic!(verbose, cycle, output_count = output.len(), "Cycle complete");
        output
    }

    pub fn close(self) -> Aggregator<Closed> {
        let cycles = self.cycles();
        tracing::info!(cycles, "Aggregator closed");
        Aggregator {
            state: Closed {
                config: self.state.config,
                cycles,
            },
        }
    }
}
