use super::*;

fn history(n: usize) -> Vec<WatchRecord> {
    (0..n)
        .map(|i| WatchRecord::new(format!("Watched Video {i}")))
        .collect()
}

#[test]
fn test_batch_count_is_ceiling() {
    for (n, size, expected) in [
        (0, 50, 0),
        (1, 50, 1),
        (50, 50, 1),
        (51, 50, 2),
        (120, 50, 3),
        (7, 1, 7),
        (7, 3, 3),
    ] {
        let records = history(n);
        let batches = partition(&records, size).unwrap();
        assert_eq!(batches.len(), expected, "n={n} size={size}");
        assert_eq!(BatchPlan::new(n, size).unwrap().batch_count, expected);
    }
}

#[test]
fn test_batches_reconstruct_input_in_order() {
    let records = history(123);
    let batches = partition(&records, 50).unwrap();
    let rebuilt: Vec<WatchRecord> = batches
        .iter()
        .flat_map(|b| b.records.iter().cloned())
        .collect();
    assert_eq!(rebuilt, records);
}

#[test]
fn test_only_last_batch_is_short() {
    let records = history(120);
    let batches = partition(&records, 50).unwrap();
    let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
    assert_eq!(sizes, vec![50, 50, 20]);
    assert!(batches[2].is_last());
    assert!(!batches[0].is_last());
}

#[test]
fn test_labels_are_one_based() {
    let records = history(120);
    let batches = partition(&records, 50).unwrap();
    let labels: Vec<String> = batches.iter().map(|b| b.label()).collect();
    assert_eq!(labels, vec!["batch 1 of 3", "batch 2 of 3", "batch 3 of 3"]);
}

#[test]
fn test_zero_batch_size_is_rejected() {
    let records = history(3);
    assert!(matches!(
        partition(&records, 0),
        Err(CoreError::InvalidBatchSize(0))
    ));
}

#[test]
fn test_plan_last_batch_len() {
    assert_eq!(BatchPlan::new(120, 50).unwrap().last_batch_len, 20);
    assert_eq!(BatchPlan::new(100, 50).unwrap().last_batch_len, 50);
    assert_eq!(BatchPlan::new(0, 50).unwrap().last_batch_len, 0);
}

#[test]
fn test_batch_json_keeps_extra_fields() {
    let records = vec![
        WatchRecord::new("Watched One")
            .with_field("time", serde_json::json!("2024-01-01T00:00:00Z")),
    ];
    let batches = partition(&records, 50).unwrap();
    let json: serde_json::Value = serde_json::from_str(&batches[0].to_json().unwrap()).unwrap();
    assert_eq!(json[0]["title"], "Watched One");
    assert_eq!(json[0]["time"], "2024-01-01T00:00:00Z");
    assert!(json[0].get("name").is_none());
}
