//! rtc-stats-metrics - derived metrics for periodic RTC telemetry reports
//!
//! This crate computes a second layer of calculated metrics (rates,
//! differences, standard deviations, cross-entity lookups) from a stream of
//! periodic stats reports, comparing each new snapshot against the
//! immediately preceding one and attaching the results to the current
//! snapshot without mutating history.
//!
//! # Features
//!
//! - **Report model**: insertion-ordered entity snapshots with heterogeneous
//!   raw values, plus an adapter for the flattened wire form
//! - **Calculators**: rate, difference, standard deviation, codec reference
//!   lookup and RMS audio level, each with explicit absent-result policies
//!   at every boundary condition
//! - **Registry**: an immutable table binding entity types and source
//!   metrics to calculators, shareable across engines and threads
//! - **Engine**: holds the previous/current report pair and recomputes
//!   deterministically on every ingest
//!
//! # Examples
//!
//! ```rust
//! use rtc_stats_metrics::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let mut engine = StatsEngine::new();
//!
//!     let sample = |t: f64, bytes: u64| {
//!         json!([{
//!             "id": "RTCOutboundRTP_1",
//!             "type": "outbound-rtp",
//!             "stats": {"timestamp": t, "values": ["bytesSent", bytes]},
//!         }])
//!         .to_string()
//!     };
//!
//!     engine.ingest_json(&sample(1000.0, 1000))?;
//!     engine.ingest_json(&sample(2000.0, 3000))?;
//!
//!     let entity = engine.current().and_then(|r| r.get("RTCOutboundRTP_1")).unwrap();
//!     let rate = &entity.calculated_for("bytesSent")[0];
//!     assert_eq!(rate.name(), "[bytesSent/s]");
//!     assert_eq!(rate.value(), Some(&MetricValue::Number(2000.0)));
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! The engine itself never fails: missing fields, unparsable values and
//! boundary conditions all resolve locally to absent calculated metrics,
//! which the wire form exports as `0`. The only fallible surface is the
//! JSON text boundary ([`StatsEngine::ingest_json`] and
//! [`StatsEngine::export_json`]):
//!
//! ```rust
//! use rtc_stats_metrics::{Error, StatsEngine};
//!
//! let mut engine = StatsEngine::new();
//! match engine.ingest_json("not json") {
//!     Err(Error::Serialization(_)) => (),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! # Thread Safety
//!
//! An engine is single-threaded by design: one instance per independent
//! metric stream, with calls serialized externally. The registry is
//! immutable after construction and may be shared read-only across any
//! number of engines and threads.

pub mod calculator;
pub mod engine;
pub mod registry;
pub mod report;

mod error;

pub use engine::StatsEngine;
pub use error::{Error, Result};

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::calculator::{
        AudioLevelRms, Calculator, Difference, Rate, RateUnit, ReferenceLookup, StandardDeviation,
    };
    pub use crate::engine::StatsEngine;
    pub use crate::registry::Registry;
    pub use crate::report::{
        CalculatedMetric, EntitySnapshot, MetricValue, StatsPayload, StatsRecord, StatsReport,
    };
    pub use crate::{Error, Result};
}
