use super::*;
use serde_json::json;

fn record(value: serde_json::Value) -> StatsRecord {
    serde_json::from_value(value).expect("valid record")
}

#[test]
fn test_to_number_coercion() {
    assert_eq!(to_number(&json!(42)), Some(42.0));
    assert_eq!(to_number(&json!(2.5)), Some(2.5));
    assert_eq!(to_number(&json!("1000")), Some(1000.0));
    assert_eq!(to_number(&json!(" 3.5 ")), Some(3.5));
    assert_eq!(to_number(&json!("-7")), Some(-7.0));
    assert_eq!(to_number(&json!("not a number")), None);
    assert_eq!(to_number(&json!(true)), None);
    assert_eq!(to_number(&json!(null)), None);
    assert_eq!(to_number(&json!([1])), None);
}

#[test]
fn test_entity_raw_access() {
    let mut entity = EntitySnapshot::new("E1", "inbound-rtp", 1.5);
    entity.set_raw("bytesReceived", json!(1000));
    entity.set_raw("codecId", json!("C1"));

    assert_eq!(entity.raw("bytesReceived"), Some(&json!(1000)));
    assert_eq!(entity.number("bytesReceived"), Some(1000.0));
    assert_eq!(entity.raw("missing"), None);
    assert_eq!(entity.number("missing"), None);

    // The timestamp pseudo-metric resolves in seconds.
    assert_eq!(entity.number("timestamp"), Some(1.5));
}

#[test]
fn test_entity_set_raw_keeps_position() {
    let mut entity = EntitySnapshot::new("E1", "track", 0.0);
    entity.set_raw("a", json!(1));
    entity.set_raw("b", json!(2));
    entity.set_raw("a", json!(3));

    let fields: Vec<_> = entity.raw_fields().collect();
    assert_eq!(fields, vec![("a", &json!(3)), ("b", &json!(2))]);
}

#[test]
fn test_report_insertion_order_and_lookup() {
    let mut report = StatsReport::new();
    report.insert(EntitySnapshot::new("B", "track", 0.0));
    report.insert(EntitySnapshot::new("A", "track", 0.0));
    report.insert(EntitySnapshot::new("C", "track", 0.0));

    let ids: Vec<_> = report.iter().map(EntitySnapshot::id).collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
    assert_eq!(report.len(), 3);
    assert!(report.get("A").is_some());
    assert!(report.get("Z").is_none());
}

#[test]
fn test_report_duplicate_id_last_write_wins_in_place() {
    let mut report = StatsReport::new();
    report.insert(EntitySnapshot::new("A", "track", 1.0));
    report.insert(EntitySnapshot::new("B", "track", 1.0));

    let mut replacement = EntitySnapshot::new("A", "track", 2.0);
    replacement.set_raw("framesReceived", json!(10));
    report.insert(replacement);

    assert_eq!(report.len(), 2);
    let ids: Vec<_> = report.iter().map(EntitySnapshot::id).collect();
    assert_eq!(ids, vec!["A", "B"]);
    assert_eq!(report.get("A").unwrap().timestamp(), 2.0);
    assert_eq!(report.get("A").unwrap().number("framesReceived"), Some(10.0));
}

#[test]
fn test_from_records_skips_malformed() {
    let report = StatsReport::from_records(vec![
        record(json!({"id": "no-stats", "type": "track"})),
        record(json!({"id": "no-values", "type": "track", "stats": {"timestamp": 1000.0}})),
        record(json!({
            "id": "ok",
            "type": "track",
            "stats": {"timestamp": 2000.0, "values": ["framesReceived", 5]},
        })),
    ]);

    assert_eq!(report.len(), 1);
    let entity = report.get("ok").unwrap();
    assert_eq!(entity.timestamp(), 2.0);
    assert_eq!(entity.number("framesReceived"), Some(5.0));
}

#[test]
fn test_from_records_drops_unpaired_trailing_name() {
    let report = StatsReport::from_records(vec![record(json!({
        "id": "E1",
        "type": "track",
        "stats": {"timestamp": 1000.0, "values": ["a", 1, "dangling"]},
    }))]);

    let entity = report.get("E1").unwrap();
    let fields: Vec<_> = entity.raw_fields().collect();
    assert_eq!(fields, vec![("a", &json!(1))]);
}

#[test]
fn test_round_trip_preserves_raw_fields() {
    let records = vec![
        record(json!({"id": "dropped", "type": "track", "stats": {"timestamp": 1000.0}})),
        record(json!({
            "id": "E1",
            "type": "inbound-rtp",
            "stats": {
                "timestamp": 1500.0,
                "values": ["bytesReceived", 1000, "codecId", "C1", "jitter", "0.004"],
            },
        })),
    ];

    let out = StatsReport::from_records(records).to_records();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "E1");
    assert_eq!(out[0].entity_type, "inbound-rtp");

    let stats = out[0].stats.as_ref().unwrap();
    assert_eq!(stats.timestamp, 1500.0);
    assert_eq!(
        stats.values.as_ref().unwrap(),
        &vec![
            json!("bytesReceived"),
            json!(1000),
            json!("codecId"),
            json!("C1"),
            json!("jitter"),
            json!("0.004"),
        ]
    );
}

#[test]
fn test_to_records_exports_absent_as_zero() {
    let mut report = StatsReport::from_records(vec![record(json!({
        "id": "E1",
        "type": "track",
        "stats": {"timestamp": 1000.0, "values": ["framesReceived", 5]},
    }))]);

    let entity = report.get_mut("E1").unwrap();
    entity.push_calculated("framesReceived", CalculatedMetric::new("[framesReceived/s]", None));

    let out = report.to_records();
    let values = out[0].stats.as_ref().unwrap().values.as_ref().unwrap().clone();
    assert_eq!(
        values,
        vec![json!("framesReceived"), json!(5), json!("[framesReceived/s]"), json!(0)]
    );
}

#[test]
fn test_calculated_metric_wire_values() {
    let number = CalculatedMetric::new("[a/s]", Some(MetricValue::Number(2.5)));
    let text = CalculatedMetric::new("[codec]", Some(MetricValue::Text("opus".into())));
    let absent = CalculatedMetric::new("[a/s]", None);

    assert_eq!(number.value_or_zero(), json!(2.5));
    assert_eq!(text.value_or_zero(), json!("opus"));
    assert_eq!(absent.value_or_zero(), json!(0));
}
