//! Return-URL parameter contract for the gateway redirect back.
//!
//! Different gateway products append different query parameter names when
//! sending the user back to the app. All known variants are checked in
//! priority order; when none is present the caller falls back to the
//! handle persisted in flow state before the redirect.

use std::collections::HashMap;

/// Known return-URL parameter names, in lookup priority order.
pub const RETURN_PARAM_KEYS: [&str; 6] = [
    "order_id",
    "orderId",
    "cf_order_id",
    "order_token",
    "subscription_id",
    "subReferenceId",
];

/// Extracts the order/subscription token from return-URL query params.
///
/// Returns the first non-empty value found among [`RETURN_PARAM_KEYS`].
pub fn extract_return_token(params: &HashMap<String, String>) -> Option<String> {
    RETURN_PARAM_KEYS
        .iter()
        .filter_map(|key| params.get(*key))
        .find(|value| !value.trim().is_empty())
        .cloned()
}
