//! Desired-vs-actual comparison driving idempotent updates.

use log::debug;
use serde_json::Value;
use tetrapi_core::{Error, Result};

use crate::ApiClient;

/// Check whether `desired` is already contained in `actual`.
///
/// Both arguments must be JSON objects; anything else is a
/// `RequestInvalid` error, never a silent coercion. True iff every key in
/// `desired` exists in `actual` with a deeply-equal value: nested objects
/// compare structurally, arrays compare element-wise in order. Extra keys
/// in `actual` are ignored.
///
/// The check is pure and never mutates either argument. Resource callers
/// use it to skip the mutating call entirely when the remote object
/// already matches.
pub fn is_subset(desired: &Value, actual: &Value) -> Result<bool> {
    let desired = desired
        .as_object()
        .ok_or_else(|| Error::request_invalid("desired state must be a JSON object"))?;
    let actual = actual
        .as_object()
        .ok_or_else(|| Error::request_invalid("actual state must be a JSON object"))?;

    Ok(desired.iter().all(|(key, value)| actual.get(key) == Some(value)))
}

impl ApiClient {
    /// Reconcile one resource toward `desired`.
    ///
    /// When `desired` is already a subset of `actual` nothing is sent and
    /// `Ok(None)` comes back. Otherwise the desired fields are PUT to
    /// `path` and the server's answer returned.
    pub async fn converge_put(
        &self,
        path: &str,
        desired: &Value,
        actual: &Value,
    ) -> Result<Option<Value>> {
        if is_subset(desired, actual)? {
            debug!("{path} already matches desired state, skipping put");
            return Ok(None);
        }

        self.put(path, desired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tetrapi_core::ErrorKind;

    #[test]
    fn test_subset_ignores_extra_actual_keys() {
        assert!(is_subset(&json!({"a": 1}), &json!({"a": 1, "b": 2})).unwrap());
    }

    #[test]
    fn test_missing_key_is_not_a_subset() {
        assert!(!is_subset(&json!({"a": 1, "d": {"e": [4, 5, 6]}}), &json!({"a": 1})).unwrap());
    }

    #[test]
    fn test_unequal_value_is_not_a_subset() {
        assert!(!is_subset(&json!({"a": 1}), &json!({"a": 2})).unwrap());
    }

    #[test]
    fn test_nested_structures_compare_deeply() {
        let desired = json!({"d": {"e": [4, 5, 6]}});
        assert!(is_subset(&desired, &json!({"a": 1, "d": {"e": [4, 5, 6]}})).unwrap());
        // Sequences are order-sensitive.
        assert!(!is_subset(&desired, &json!({"d": {"e": [6, 5, 4]}})).unwrap());
    }

    #[test]
    fn test_empty_desired_is_always_satisfied() {
        assert!(is_subset(&json!({}), &json!({"a": 1})).unwrap());
    }

    #[test]
    fn test_non_object_arguments_are_rejected() {
        let err = is_subset(&json!([1, 2]), &json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        let err = is_subset(&json!({"a": 1}), &json!("a")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }
}
