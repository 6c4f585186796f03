//! Static binding of entity types and source metrics to calculators.
//!
//! The registry is pure configuration: built once, never mutated, and
//! safely shared read-only across engines and threads. [`Registry::standard`]
//! carries the WebRTC stats vocabulary; hosts with other vocabularies can
//! assemble their own table with [`Registry::bind`].

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::calculator::{
    AudioLevelRms, Calculator, Difference, Rate, RateUnit, ReferenceLookup, StandardDeviation,
};

#[cfg(test)]
mod tests;

/// The calculators bound to one source metric, in registration order.
#[derive(Debug, Clone)]
pub struct MetricBinding {
    metric: String,
    calculators: Vec<Calculator>,
}

impl MetricBinding {
    /// The source metric name the calculators read from.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Bound calculators in registration order.
    pub fn calculators(&self) -> &[Calculator] {
        &self.calculators
    }
}

/// Entity type -> ordered source-metric bindings.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    table: HashMap<String, Vec<MetricBinding>>,
}

static STANDARD: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::standard()));

impl Registry {
    /// An empty registry. Use [`Registry::bind`] to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared standard registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&STANDARD)
    }

    /// Binds a calculator to `(entity_type, metric)`, after any calculators
    /// already bound there.
    pub fn bind(
        &mut self,
        entity_type: impl Into<String>,
        metric: impl Into<String>,
        calculator: impl Into<Calculator>,
    ) -> &mut Self {
        let metric = metric.into();
        let bindings = self.table.entry(entity_type.into()).or_default();
        match bindings.iter_mut().find(|b| b.metric == metric) {
            Some(binding) => binding.calculators.push(calculator.into()),
            None => bindings.push(MetricBinding { metric, calculators: vec![calculator.into()] }),
        }
        self
    }

    /// The source-metric bindings for an entity type, in binding order.
    pub fn bindings_for(&self, entity_type: &str) -> &[MetricBinding] {
        self.table.get(entity_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The calculators bound to `(entity_type, metric)`, possibly empty.
    pub fn calculators_for(&self, entity_type: &str, metric: &str) -> &[Calculator] {
        self.bindings_for(entity_type)
            .iter()
            .find(|b| b.metric == metric)
            .map(|b| b.calculators())
            .unwrap_or(&[])
    }

    /// The standard WebRTC stats table.
    pub fn standard() -> Self {
        use RateUnit::MillisecondsFromSeconds as Ms;

        let mut registry = Registry::new();

        registry
            .bind("data-channel", "messagesSent", Rate::per_second("messagesSent"))
            .bind("data-channel", "messagesReceived", Rate::per_second("messagesReceived"))
            .bind("data-channel", "bytesSent", Rate::per_second("bytesSent"))
            .bind("data-channel", "bytesReceived", Rate::per_second("bytesReceived"));

        registry.bind("media-source", "totalAudioEnergy", AudioLevelRms::new());

        registry
            .bind(
                "track",
                "jitterBufferDelay",
                Rate::with_unit("jitterBufferDelay", "jitterBufferEmittedCount", Ms),
            )
            .bind("track", "totalAudioEnergy", AudioLevelRms::new())
            .bind(
                "track",
                "totalInterFrameDelay",
                StandardDeviation::new(
                    "totalSquaredInterFrameDelay",
                    "totalInterFrameDelay",
                    "framesReceived",
                    "interFrameDelay",
                ),
            )
            .bind("track", "framesReceived", Rate::per_second("framesReceived"))
            .bind("track", "framesReceived", Difference::new("framesReceived", "framesDecoded"))
            .bind("track", "framesSent", Rate::per_second("framesSent"));

        registry
            .bind("outbound-rtp", "bytesSent", Rate::per_second("bytesSent"))
            .bind("outbound-rtp", "headerBytesSent", Rate::per_second("headerBytesSent"))
            .bind("outbound-rtp", "packetsSent", Rate::per_second("packetsSent"))
            .bind(
                "outbound-rtp",
                "totalPacketSendDelay",
                Rate::with_unit("totalPacketSendDelay", "packetsSent", Ms),
            )
            .bind("outbound-rtp", "framesEncoded", Rate::per_second("framesEncoded"))
            .bind(
                "outbound-rtp",
                "totalEncodeTime",
                Rate::with_unit("totalEncodeTime", "framesEncoded", Ms),
            )
            .bind("outbound-rtp", "qpSum", Rate::new("qpSum", "framesEncoded"))
            .bind("outbound-rtp", "codecId", ReferenceLookup::codec());

        registry
            .bind("inbound-rtp", "bytesReceived", Rate::per_second("bytesReceived"))
            .bind("inbound-rtp", "headerBytesReceived", Rate::per_second("headerBytesReceived"))
            .bind("inbound-rtp", "packetsReceived", Rate::per_second("packetsReceived"))
            .bind("inbound-rtp", "framesDecoded", Rate::per_second("framesDecoded"))
            .bind(
                "inbound-rtp",
                "totalDecodeTime",
                Rate::with_unit("totalDecodeTime", "framesDecoded", Ms),
            )
            .bind(
                "inbound-rtp",
                "totalInterFrameDelay",
                StandardDeviation::new(
                    "totalSquaredInterFrameDelay",
                    "totalInterFrameDelay",
                    "framesDecoded",
                    "interFrameDelay",
                ),
            )
            .bind("inbound-rtp", "qpSum", Rate::new("qpSum", "framesDecoded"))
            .bind("inbound-rtp", "totalAudioEnergy", AudioLevelRms::new())
            .bind("inbound-rtp", "concealedSamples", Rate::per_second("concealedSamples"))
            .bind("inbound-rtp", "codecId", ReferenceLookup::codec());

        registry.bind(
            "remote-inbound-rtp",
            "totalRoundTripTime",
            Rate::with_unit("totalRoundTripTime", "roundTripTimeMeasurements", Ms),
        );

        registry
            .bind("candidate-pair", "bytesSent", Rate::per_second("bytesSent"))
            .bind("candidate-pair", "bytesReceived", Rate::per_second("bytesReceived"))
            .bind("candidate-pair", "requestsSent", Rate::per_second("requestsSent"))
            .bind("candidate-pair", "requestsReceived", Rate::per_second("requestsReceived"))
            .bind("candidate-pair", "responsesSent", Rate::per_second("responsesSent"))
            .bind("candidate-pair", "responsesReceived", Rate::per_second("responsesReceived"))
            .bind(
                "candidate-pair",
                "consentRequestsSent",
                Rate::per_second("consentRequestsSent"),
            )
            .bind(
                "candidate-pair",
                "totalRoundTripTime",
                Rate::with_unit("totalRoundTripTime", "responsesReceived", Ms),
            );

        registry
    }
}
