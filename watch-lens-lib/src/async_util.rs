//! Driving a pipeline future while consuming its progress events.
//!
//! The analysis core reports progress over an unbounded channel. Frontends
//! call [`run_with_events`] to await the pipeline and handle each event as
//! it arrives (spinner updates, log lines).

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on draining leftover events once the task has finished.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `task`, calling `on_event` for every event received on `events`.
///
/// Events sent before the task completes are all delivered, including those
/// still queued when it returns. If the sending side is never dropped the
/// drain gives up after [`DRAIN_TIMEOUT`].
pub async fn run_with_events<F, E, R>(
    task: F,
    mut events: mpsc::UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut delivered: u64 = 0;

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = events.recv() => match event {
                Some(e) => {
                    delivered += 1;
                    on_event(e);
                }
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        log::debug!(
            "run_with_events: channel closed after {} events; awaiting task",
            delivered
        );
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(e)) => {
                delivered += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "run_with_events: gave up draining after {}s (sender still alive)",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
    log::debug!("run_with_events: {} events delivered", delivered);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_events_sent_before_and_after_completion() {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = async move {
            tx.send(1).unwrap();
            tokio::task::yield_now().await;
            tx.send(2).unwrap();
            tx.send(3).unwrap();
            "done"
        };
        let mut seen = Vec::new();
        let result = run_with_events(task, rx, |e| seen.push(e)).await;
        assert_eq!(result, "done");
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_task_without_events() {
        let (tx, rx) = mpsc::unbounded_channel::<u32>();
        drop(tx);
        let result = run_with_events(async { 7 }, rx, |_| {}).await;
        assert_eq!(result, 7);
    }
}
