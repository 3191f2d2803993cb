//! Web search adapters for Stellar.
//!
//! Web search is optional: [`from_config`] yields `None` when no credential
//! is configured, and callers treat the source as skipped.

pub mod tavily;

use std::sync::Arc;
use std::time::Duration;

use stellar_config::AppConfig;
use stellar_core::search::WebSearch;
use tracing::debug;

pub use tavily::TavilySearch;

/// Build the configured web search backend, if a credential is present.
pub fn from_config(config: &AppConfig) -> Option<Arc<dyn WebSearch>> {
    let key = config
        .search
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())?;

    // Transport timeout sits above the assembler's own bound so the
    // assembler reports the timeout.
    let transport_timeout = transport_timeout(config.search.timeout_secs);

    debug!(base_url = %config.search.base_url, "Web search enabled");
    Some(Arc::new(
        TavilySearch::new(key)
            .with_base_url(&config.search.base_url)
            .with_timeout(transport_timeout),
    ))
}

fn transport_timeout(search_timeout_secs: u64) -> Duration {
    Duration::from_secs(search_timeout_secs.saturating_add(5))
}
