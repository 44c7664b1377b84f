//! Offset-cursor pagination over listing endpoints.

use log::debug;
use serde_json::Value;
use tetrapi_core::{Error, Result};

use crate::{is_subset, ApiClient};

/// Page size requested on every round trip.
const PAGE_LIMIT: u32 = 100;

/// Hard bound on pages fetched in one traversal.
///
/// Termination normally comes from the server omitting the `offset` cursor
/// on the last page. A server that never omits it would otherwise loop
/// forever.
const MAX_PAGES: u32 = 10_000;

impl ApiClient {
    /// Fetch every page of a listing endpoint into one vector.
    ///
    /// Issues GET with a `limit`/`offset` cursor, following the `offset`
    /// key of each response object until the server omits it. Page items
    /// are taken from `sub_element` (default `"results"`); an endpoint that
    /// answers a bare JSON array is unpaginated and returned as-is.
    ///
    /// Each call is a fresh traversal and is not resumable: an error mid
    /// way discards the pages accumulated so far. A cursor that fails to
    /// advance, or a traversal past the page bound, is an `Unexpected`
    /// error instead of an infinite loop.
    pub async fn fetch_all(
        &self,
        path: &str,
        params: Option<&[(String, String)]>,
        sub_element: Option<&str>,
    ) -> Result<Vec<Value>> {
        // The cursor parameters belong to this loop, not the caller.
        let base: Vec<(String, String)> = params
            .unwrap_or_default()
            .iter()
            .filter(|(k, _)| k != "limit" && k != "offset")
            .cloned()
            .collect();
        let sub_element = sub_element.unwrap_or("results");

        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 0..MAX_PAGES {
            let mut params = base.clone();
            params.push(("limit".to_string(), PAGE_LIMIT.to_string()));
            if let Some(offset) = &cursor {
                params.push(("offset".to_string(), offset.clone()));
            }

            let body = match self.get(path, Some(&params)).await? {
                Some(body) => body,
                // The endpoint answered 400: nothing to list.
                None => return Ok(items),
            };

            match body {
                Value::Array(all) => {
                    items.extend(all);
                    return Ok(items);
                }
                Value::Object(mut map) => {
                    match map.remove(sub_element) {
                        Some(Value::Array(page_items)) => items.extend(page_items),
                        Some(other) => {
                            return Err(Error::unexpected(format!(
                                "expected \"{sub_element}\" to be an array, got: {other}"
                            ))
                            .with_operation("fetch_all"))
                        }
                        None => {}
                    }

                    match map.remove("offset") {
                        Some(next) => {
                            let next = cursor_value(next);
                            if cursor.as_ref() == Some(&next) {
                                return Err(Error::unexpected(format!(
                                    "pagination cursor {next:?} did not advance after page {page}"
                                ))
                                .with_operation("fetch_all"));
                            }
                            debug!("fetched page {page} of {path}, next cursor {next:?}");
                            cursor = Some(next);
                        }
                        None => return Ok(items),
                    }
                }
                other => {
                    return Err(Error::unexpected(format!(
                        "expected a JSON object or array page, got: {other}"
                    ))
                    .with_operation("fetch_all"))
                }
            }
        }

        Err(
            Error::unexpected(format!("pagination of {path} exceeded {MAX_PAGES} pages"))
                .with_operation("fetch_all"),
        )
    }

    /// Find the first record whose fields contain `filter` as a subset.
    ///
    /// A record missing a filter key does not match.
    pub async fn find(
        &self,
        filter: &Value,
        path: &str,
        params: Option<&[(String, String)]>,
        sub_element: Option<&str>,
    ) -> Result<Option<Value>> {
        for item in self.fetch_all(path, params, sub_element).await? {
            if is_subset(filter, &item)? {
                return Ok(Some(item));
            }
        }

        Ok(None)
    }

    /// Find every record whose fields contain `filter` as a subset.
    pub async fn find_all(
        &self,
        filter: &Value,
        path: &str,
        params: Option<&[(String, String)]>,
        sub_element: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut matches = Vec::new();
        for item in self.fetch_all(path, params, sub_element).await? {
            if is_subset(filter, &item)? {
                matches.push(item);
            }
        }

        Ok(matches)
    }
}

// The server sends the cursor as a string or a number; either way it goes
// back out as a query-parameter string.
fn cursor_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cursor_value_accepts_strings_and_numbers() {
        assert_eq!(cursor_value(json!("page2_marker")), "page2_marker");
        assert_eq!(cursor_value(json!(200)), "200");
    }
}
