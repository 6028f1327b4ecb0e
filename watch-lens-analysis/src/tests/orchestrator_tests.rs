use watch_lens_core::WatchRecord;

use super::*;
use crate::test_support::ScriptedModel;

fn records(n: usize) -> Vec<WatchRecord> {
    (0..n)
        .map(|i| WatchRecord::new(format!("Watched Video {i}")))
        .collect()
}

fn config(batch_size: usize) -> AnalysisConfig {
    AnalysisConfig::new(Some("INSTRUCTIONS".into())).with_batch_size(batch_size)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<AnalysisEvent>) -> Vec<AnalysisEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[tokio::test]
async fn issues_one_call_per_batch_then_synthesis() {
    let model = ScriptedModel::new(vec![Ok("r1"), Ok("r2"), Ok("r3"), Ok("{\"final\":true}")]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = run_conversation(&model, &records(120), &config(50), &tx)
        .await
        .unwrap();

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[0].contains("batch 1 of 3"));
    assert!(prompts[1].contains("batch 2 of 3"));
    assert!(prompts[2].contains("batch 3 of 3"));
    assert!(prompts[2].contains("Watched Video 119"));
    assert!(!prompts[2].contains("Watched Video 99\""));
    assert!(prompts[3].contains("--- BATCH 3 ANALYSIS ---\nr3"));

    assert_eq!(result.raw_analysis, "{\"final\":true}");
    assert!(!result.synthesis_failed());
    assert_eq!(result.ledger.len(), 3);
    assert_eq!(result.ledger.failed_count(), 0);

    let events = drain(&mut rx);
    assert!(matches!(
        events.first(),
        Some(AnalysisEvent::Partitioned {
            records: 120,
            batches: 3
        })
    ));
    assert!(matches!(events.last(), Some(AnalysisEvent::Done)));
}

#[tokio::test]
async fn failed_batch_is_replaced_and_run_continues() {
    let model = ScriptedModel::new(vec![Ok("first"), Err("boom"), Ok("third"), Ok("final")]);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = run_conversation(&model, &records(5), &config(2), &tx)
        .await
        .unwrap();

    assert_eq!(result.ledger.failed_count(), 1);
    let failed = &result.ledger.entries()[1];
    assert_eq!(failed.text, "Error: Failed to process batch 2");
    assert!(failed.error.as_deref().unwrap().contains("boom"));

    let synthesis = model.prompts().pop().unwrap();
    let one = synthesis.find("--- BATCH 1 ANALYSIS ---\nfirst").unwrap();
    let two = synthesis
        .find("--- BATCH 2 ANALYSIS ---\nError: Failed to process batch 2")
        .unwrap();
    let three = synthesis.find("--- BATCH 3 ANALYSIS ---\nthird").unwrap();
    assert!(one < two && two < three);

    assert!(
        drain(&mut rx)
            .iter()
            .any(|e| matches!(e, AnalysisEvent::BatchFailed { index: 2, .. }))
    );
}

#[tokio::test]
async fn synthesis_failure_yields_fixed_text() {
    let model = ScriptedModel::new(vec![Ok("only batch")]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = run_conversation(&model, &records(3), &config(10), &tx)
        .await
        .unwrap();

    assert_eq!(result.raw_analysis, SYNTHESIS_FAILURE_TEXT);
    assert!(result.synthesis_failed());
    assert_eq!(model.prompts().len(), 2);
}

#[tokio::test]
async fn empty_history_still_runs_synthesis() {
    let model = ScriptedModel::new(vec![Ok("{}")]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = run_conversation(&model, &[], &config(50), &tx).await.unwrap();

    assert!(result.ledger.is_empty());
    assert_eq!(model.prompts().len(), 1);
    assert_eq!(result.raw_analysis, "{}");
}

#[tokio::test]
async fn zero_batch_size_is_an_error() {
    let model = ScriptedModel::failing();
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = run_conversation(&model, &records(3), &config(0), &tx)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Core(_)));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn taxonomy_is_spliced_into_every_prompt() {
    let model = ScriptedModel::new(vec![Ok("a"), Ok("b")]);
    let (tx, _rx) = mpsc::unbounded_channel();
    let taxonomy = serde_json::from_value(serde_json::json!({"10": "Music"})).unwrap();
    let config = AnalysisConfig::new(Some("Cats: {{categories}}".into())).with_taxonomy(taxonomy);

    run_conversation(&model, &records(1), &config, &tx).await.unwrap();

    for prompt in model.prompts() {
        assert!(prompt.starts_with(r#"Cats: {"10":"Music"}"#));
    }
}

#[test]
fn ledger_rejects_out_of_order_entries() {
    let mut ledger = BatchLedger::new();
    ledger.record_success(1, "a".into()).unwrap();

    let err = ledger.record_success(3, "c".into()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::OutOfOrder {
            expected: 2,
            got: 3
        }
    ));
    assert!(ledger.record_failure(1, "dup").is_err());

    ledger.record_failure(2, "x").unwrap();
    let sections: Vec<_> = ledger.sections().collect();
    assert_eq!(
        sections,
        vec![(1, "a"), (2, "Error: Failed to process batch 2")]
    );
}
