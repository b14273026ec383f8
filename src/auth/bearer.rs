/// Credential extraction from the `Authorization` header.
///
/// Extraction never fails. A missing prefix passes the raw value through and
/// a missing header yields an empty string; whatever comes out is judged by
/// the validator it is handed to.

pub const BEARER_PREFIX: &str = "Bearer ";
pub const API_KEY_PREFIX: &str = "ApiKey ";

fn strip_scheme(header: Option<&str>, prefix: &str) -> String {
    let value = header.unwrap_or_default();
    value.strip_prefix(prefix).unwrap_or(value).to_string()
}

/// `Authorization: Bearer <token>`
pub fn extract_bearer(header: Option<&str>) -> String {
    strip_scheme(header, BEARER_PREFIX)
}

/// `Authorization: ApiKey <key>`, used by the webhook caller.
pub fn extract_api_key(header: Option<&str>) -> String {
    strip_scheme(header, API_KEY_PREFIX)
}
