//! Commands that run the classifier and URL normalizer without a browser.

use anyhow::Context;
use linkcheck_core::{classify, normalize_profile_url, PageSignals};

/// Classify a `PageSignals` JSON object and print the result as JSON.
pub(crate) fn run_classify(signals_json: &str) -> anyhow::Result<()> {
    let signals: PageSignals =
        serde_json::from_str(signals_json).context("--signals is not a valid PageSignals object")?;
    let result = classify(&signals);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_normalize(urls: &[String]) {
    for url in urls {
        println!("{}", normalize_profile_url(url));
    }
}
