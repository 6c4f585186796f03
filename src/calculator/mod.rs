//! Calculators derive one metric each from a pair of consecutive reports.
//!
//! Every calculator is stateless configuration: a deterministic name plus a
//! pure `evaluate` over `(entity id, previous report, current report)`.
//! Evaluation never fails; any missing field, coercion failure or boundary
//! condition (non-positive delta, negative variance) yields an absent
//! result instead.

use crate::report::{MetricValue, StatsReport};


/// Unit conversion applied to a rate result.
///
/// A fixed constant set passed by value into [`Rate`] configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    /// No conversion.
    None,
    /// Source accumulates seconds, result is reported in milliseconds.
    MillisecondsFromSeconds,
}

impl RateUnit {
    fn multiplier(self) -> f64 {
        match self {
            RateUnit::None => 1.0,
            RateUnit::MillisecondsFromSeconds => 1000.0,
        }
    }

    fn postfix(self) -> &'static str {
        match self {
            RateUnit::None => "",
            RateUnit::MillisecondsFromSeconds => "_in_ms",
        }
    }
}

/// Rate of an accumulative metric over a samples metric.
///
/// With the samples metric set to `timestamp` this is a per-second rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    accumulative: String,
    samples: String,
    unit: RateUnit,
}

impl Rate {
    pub fn new(accumulative: impl Into<String>, samples: impl Into<String>) -> Self {
        Self::with_unit(accumulative, samples, RateUnit::None)
    }

    pub fn with_unit(
        accumulative: impl Into<String>,
        samples: impl Into<String>,
        unit: RateUnit,
    ) -> Self {
        Self { accumulative: accumulative.into(), samples: samples.into(), unit }
    }

    /// Per-second rate of an accumulative metric.
    pub fn per_second(accumulative: impl Into<String>) -> Self {
        Self::new(accumulative, "timestamp")
    }

    fn name(&self) -> String {
        if self.samples == "timestamp" {
            format!("[{}/s]", self.accumulative)
        } else {
            format!("[{}/{}{}]", self.accumulative, self.samples, self.unit.postfix())
        }
    }

    fn evaluate(
        &self,
        id: &str,
        previous: Option<&StatsReport>,
        current: &StatsReport,
    ) -> Option<f64> {
        let prev = previous?.get(id)?;
        let cur = current.get(id)?;
        let delta_acc = cur.number(&self.accumulative)? - prev.number(&self.accumulative)?;
        let delta_samples = cur.number(&self.samples)? - prev.number(&self.samples)?;
        if delta_samples <= 0.0 {
            return None;
        }
        Some(delta_acc / delta_samples * self.unit.multiplier())
    }
}

/// Difference between two metrics within the current report. Needs no
/// history.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    minuend: String,
    subtrahend: String,
}

impl Difference {
    pub fn new(minuend: impl Into<String>, subtrahend: impl Into<String>) -> Self {
        Self { minuend: minuend.into(), subtrahend: subtrahend.into() }
    }

    fn name(&self) -> String {
        format!("[{}-{}]", self.minuend, self.subtrahend)
    }

    fn evaluate(&self, id: &str, current: &StatsReport) -> Option<f64> {
        let cur = current.get(id)?;
        Some(cur.number(&self.minuend)? - cur.number(&self.subtrahend)?)
    }
}

/// Population standard deviation over the samples added between two
/// reports, rescaled to milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardDeviation {
    squared_sum: String,
    sum: String,
    count: String,
    label: String,
}

impl StandardDeviation {
    pub fn new(
        squared_sum: impl Into<String>,
        sum: impl Into<String>,
        count: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            squared_sum: squared_sum.into(),
            sum: sum.into(),
            count: count.into(),
            label: label.into(),
        }
    }

    fn name(&self) -> String {
        format!("[{}StDev_in_ms]", self.label)
    }

    fn evaluate(
        &self,
        id: &str,
        previous: Option<&StatsReport>,
        current: &StatsReport,
    ) -> Option<f64> {
        let prev = previous?.get(id)?;
        let cur = current.get(id)?;
        let delta_count = cur.number(&self.count)? - prev.number(&self.count)?;
        if delta_count <= 0.0 {
            return None;
        }
        let delta_sq = cur.number(&self.squared_sum)? - prev.number(&self.squared_sum)?;
        let delta_sum = cur.number(&self.sum)? - prev.number(&self.sum)?;
        let variance = (delta_sq - delta_sum * delta_sum / delta_count) / delta_count;
        if variance < 0.0 {
            return None;
        }
        Some(1000.0 * variance.sqrt())
    }
}

/// Resolves the `codecId` foreign key to the codec entity in the current
/// report and renders a display string such as `"opus (payloadType: 111)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferenceLookup;

impl ReferenceLookup {
    pub fn codec() -> Self {
        Self
    }

    fn name(&self) -> String {
        "[codec]".to_string()
    }

    fn evaluate(&self, id: &str, current: &StatsReport) -> Option<String> {
        let entity = current.get(id)?;
        let codec_id = entity.raw("codecId")?.as_str()?;
        let codec = current.get(codec_id)?;
        let mime_type = codec.raw("mimeType")?.as_str()?;
        // "audio/opus" -> "opus"
        let category = mime_type.rsplit('/').next().unwrap_or(mime_type);
        let payload_type = codec.raw("payloadType")?;
        let payload_type = match payload_type.as_str() {
            Some(s) => s.to_string(),
            None => payload_type.to_string(),
        };
        Some(format!("{} (payloadType: {})", category, payload_type))
    }
}

/// Root-mean-square audio level: the square root of the average squared
/// level, taken as the rate of `totalAudioEnergy` over
/// `totalSamplesDuration`.
///
/// A regressing energy counter can make the radicand negative; that case
/// yields absent rather than NaN, which the wire form could not represent.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioLevelRms {
    energy_rate: Rate,
}

impl AudioLevelRms {
    pub fn new() -> Self {
        Self { energy_rate: Rate::new("totalAudioEnergy", "totalSamplesDuration") }
    }

    fn name(&self) -> String {
        "[Audio_Level_in_RMS]".to_string()
    }

    fn evaluate(
        &self,
        id: &str,
        previous: Option<&StatsReport>,
        current: &StatsReport,
    ) -> Option<f64> {
        let mean_square = self.energy_rate.evaluate(id, previous, current)?;
        if mean_square < 0.0 {
            return None;
        }
        Some(mean_square.sqrt())
    }
}

impl Default for AudioLevelRms {
    fn default() -> Self {
        Self::new()
    }
}

/// The closed set of calculator variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculator {
    Rate(Rate),
    Difference(Difference),
    StandardDeviation(StandardDeviation),
    ReferenceLookup(ReferenceLookup),
    AudioLevelRms(AudioLevelRms),
}

impl Calculator {
    /// Deterministic metric name, a pure function of configuration.
    pub fn name(&self) -> String {
        match self {
            Calculator::Rate(c) => c.name(),
            Calculator::Difference(c) => c.name(),
            Calculator::StandardDeviation(c) => c.name(),
            Calculator::ReferenceLookup(c) => c.name(),
            Calculator::AudioLevelRms(c) => c.name(),
        }
    }

    /// Evaluates the calculator for one entity against the report pair.
    /// Never fails; every precondition failure yields `None`.
    pub fn evaluate(
        &self,
        id: &str,
        previous: Option<&StatsReport>,
        current: &StatsReport,
    ) -> Option<MetricValue> {
        match self {
            Calculator::Rate(c) => c.evaluate(id, previous, current).map(MetricValue::Number),
            Calculator::Difference(c) => c.evaluate(id, current).map(MetricValue::Number),
            Calculator::StandardDeviation(c) => {
                c.evaluate(id, previous, current).map(MetricValue::Number)
            }
            Calculator::ReferenceLookup(c) => c.evaluate(id, current).map(MetricValue::Text),
            Calculator::AudioLevelRms(c) => {
                c.evaluate(id, previous, current).map(MetricValue::Number)
            }
        }
    }
}

impl From<Rate> for Calculator {
    fn from(c: Rate) -> Self {
        Calculator::Rate(c)
    }
}

impl From<Difference> for Calculator {
    fn from(c: Difference) -> Self {
        Calculator::Difference(c)
    }
}

impl From<StandardDeviation> for Calculator {
    fn from(c: StandardDeviation) -> Self {
        Calculator::StandardDeviation(c)
    }
}

impl From<ReferenceLookup> for Calculator {
    fn from(c: ReferenceLookup) -> Self {
        Calculator::ReferenceLookup(c)
    }
}

impl From<AudioLevelRms> for Calculator {
    fn from(c: AudioLevelRms) -> Self {
        Calculator::AudioLevelRms(c)
    }
}
