//! HTTP(S) fetching for remote sources. Compiled to a stub without `remote`.

use crate::error::{AnnotateError, Result};

#[cfg(feature = "remote")]
pub(crate) fn fetch(source_name: &str, url: &str) -> Result<Vec<u8>> {
    let fail = |reason: String| AnnotateError::source_load(source_name, reason);
    let response = reqwest::blocking::get(url).map_err(|err| fail(err.to_string()))?;
    let response = response
        .error_for_status()
        .map_err(|err| fail(err.to_string()))?;
    let bytes = response.bytes().map_err(|err| fail(err.to_string()))?;
    tracing::debug!(source.url = url, source.bytes = bytes.len(), "fetched remote source");
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote"))]
pub(crate) fn fetch(_source_name: &str, url: &str) -> Result<Vec<u8>> {
    Err(AnnotateError::RemoteDisabled {
        url: url.to_string(),
    })
}

#[cfg(all(test, not(feature = "remote")))]
mod tests {
    use super::*;

    #[test]
    fn urls_need_the_remote_feature() {
        let err = fetch("a.jsonl", "https://example.invalid/a.jsonl").expect_err("disabled");
        assert!(matches!(err, AnnotateError::RemoteDisabled { .. }));
    }
}
