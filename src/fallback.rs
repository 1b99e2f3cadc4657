//! Engine fallback: a single-shot watchdog plus the asset URL rewrite it triggers.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

const ENGINE_PARAM: &str = "model";
const PRIMARY_ENGINE: &str = "flux";
const ENHANCE_PARAM: &str = "enhance";
const FALLBACK_SEGMENT: &str = "model=turbo";

/// Rewrites an asset URL to request the fast engine and drops the quality boost.
///
/// Works on the raw string so relative URLs are handled and every other byte,
/// including percent-encoding, is preserved. Applying it twice yields the same URL.
pub fn to_fallback_url(raw: &str) -> String {
    let (rest, fragment) = match raw.find('#') {
        Some(i) => raw.split_at(i),
        None => (raw, ""),
    };
    let Some((base, query)) = rest.split_once('?') else {
        return raw.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|segment| segment.split('=').next() != Some(ENHANCE_PARAM))
        .map(|segment| match segment.split_once('=') {
            Some((ENGINE_PARAM, PRIMARY_ENGINE)) => FALLBACK_SEGMENT,
            _ => segment,
        })
        .collect();

    if kept.is_empty() {
        format!("{base}{fragment}")
    } else {
        format!("{base}?{}{fragment}", kept.join("&"))
    }
}

/// Appends the cache-bust token so an unchanged URL is fetched again.
pub fn cache_busted(url: &str, token: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}cache_bust={token}")
}

/// Handle to a pending watchdog. Dropping it cancels the watchdog too.
#[derive(Debug)]
pub struct CancelHandle {
    task: JoinHandle<()>,
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs `on_timeout` once after `grace` unless cancelled first.
pub fn start<F>(grace: Duration, on_timeout: F) -> CancelHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!("⚠️ Primary engine exceeded {:?}; switching to fallback engine", grace);
        on_timeout();
    });
    CancelHandle { task }
}

pub fn cancel(handle: CancelHandle) {
    drop(handle);
}
