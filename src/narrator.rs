//! Cosmetic progress lines shown while a cycle is in flight.
//!
//! The sequence is paced by a timer only; it says nothing about real progress.

use std::time::Duration;

use futures::stream::{self, Stream};

/// Status steps for a business, in display order.
pub fn script(business_type: &str) -> Vec<String> {
    vec![
        "Initializing Neural Networks...".to_string(),
        format!("Analyzing market trends for \"{business_type}\"..."),
        "Synthesizing persuasive copy...".to_string(),
        "Calibrating visual engine (Flux Pro)...".to_string(),
        "Rendering final assets...".to_string(),
    ]
}

/// Lazy finite sequence: the first step right away, then one per `interval`.
///
/// Every call starts from the beginning; nothing runs until polled.
pub fn produce(steps: Vec<String>, interval: Duration) -> impl Stream<Item = String> {
    stream::unfold((steps.into_iter(), true), move |(mut steps, first)| async move {
        let step = steps.next()?;
        if !first {
            tokio::time::sleep(interval).await;
        }
        Some((step, (steps, false)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    #[test]
    fn script_mentions_the_business() {
        let steps = script("Tech Club");
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[1], "Analyzing market trends for \"Tech Club\"...");
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_step_per_interval() {
        let start = Instant::now();
        let timed: Vec<(String, u128)> = produce(script("Cafe"), Duration::from_millis(800))
            .map(|s| (s, start.elapsed().as_millis()))
            .collect()
            .await;
        let offsets: Vec<u128> = timed.iter().map(|(_, t)| *t).collect();
        assert_eq!(offsets, vec![0, 800, 1600, 2400, 3200]);
        assert_eq!(timed[4].0, "Rendering final assets...");
    }

    #[tokio::test(start_paused = true)]
    async fn each_call_restarts_from_the_top() {
        let steps = vec!["a".to_string(), "b".to_string()];
        let mut first = Box::pin(produce(steps.clone(), Duration::from_millis(10)));
        assert_eq!(first.next().await.as_deref(), Some("a"));
        drop(first);
        let again: Vec<String> = produce(steps, Duration::from_millis(10)).collect().await;
        assert_eq!(again, vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_script_ends_immediately() {
        let items: Vec<String> = produce(Vec::new(), Duration::from_secs(1)).collect().await;
        assert!(items.is_empty());
    }
}
