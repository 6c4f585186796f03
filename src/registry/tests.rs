use super::*;

#[test]
fn test_bind_groups_by_metric_in_order() {
    let mut registry = Registry::new();
    registry
        .bind("track", "framesReceived", Rate::per_second("framesReceived"))
        .bind("track", "framesReceived", Difference::new("framesReceived", "framesDecoded"))
        .bind("track", "framesSent", Rate::per_second("framesSent"));

    let bindings = registry.bindings_for("track");
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].metric(), "framesReceived");
    assert_eq!(bindings[1].metric(), "framesSent");

    let names: Vec<_> = registry
        .calculators_for("track", "framesReceived")
        .iter()
        .map(Calculator::name)
        .collect();
    assert_eq!(names, vec!["[framesReceived/s]", "[framesReceived-framesDecoded]"]);
}

#[test]
fn test_lookup_misses_are_empty() {
    let registry = Registry::standard();
    assert!(registry.bindings_for("no-such-type").is_empty());
    assert!(registry.calculators_for("track", "no-such-metric").is_empty());
    assert!(registry.calculators_for("no-such-type", "framesReceived").is_empty());
}

#[test]
fn test_standard_table_bindings() {
    let registry = Registry::standard();

    let names: Vec<_> = registry
        .calculators_for("outbound-rtp", "bytesSent")
        .iter()
        .map(Calculator::name)
        .collect();
    assert_eq!(names, vec!["[bytesSent/s]"]);

    let names: Vec<_> = registry
        .calculators_for("candidate-pair", "totalRoundTripTime")
        .iter()
        .map(Calculator::name)
        .collect();
    assert_eq!(names, vec!["[totalRoundTripTime/responsesReceived_in_ms]"]);

    let names: Vec<_> = registry
        .calculators_for("inbound-rtp", "codecId")
        .iter()
        .map(Calculator::name)
        .collect();
    assert_eq!(names, vec!["[codec]"]);

    let names: Vec<_> = registry
        .calculators_for("media-source", "totalAudioEnergy")
        .iter()
        .map(Calculator::name)
        .collect();
    assert_eq!(names, vec!["[Audio_Level_in_RMS]"]);

    // framesReceived drives both a rate and a difference.
    assert_eq!(registry.calculators_for("track", "framesReceived").len(), 2);
}

#[test]
fn test_global_is_shared() {
    let a = Registry::global();
    let b = Registry::global();
    assert!(Arc::ptr_eq(&a, &b));
}
