//! Caller identity, as forwarded by the authentication layer in front of
//! the server.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use super::ApiError;
use crate::application::AppError;
use crate::domain::{Caller, Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extracts the [`Caller`]. Requests without a user id are rejected with 401.
#[derive(Debug, Clone)]
pub struct Identity(pub Caller);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers)
            .map(Identity)
            .ok_or_else(|| ApiError::new(AppError::AuthenticationRequired))
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn caller_from_headers(headers: &HeaderMap) -> Option<Caller> {
    let id = header(headers, USER_ID_HEADER)?;
    let role = header(headers, USER_ROLE_HEADER).and_then(|r| r.parse::<Role>().ok());

    let caller = Caller::new(id, role);
    Some(match header(headers, USER_NAME_HEADER) {
        Some(name) => caller.with_name(name),
        None => caller,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_headers_to_caller() {
        let mut headers = HeaderMap::new();
        assert!(caller_from_headers(&headers).is_none());

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert!(caller_from_headers(&headers).is_none());

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-7"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Developer"));
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("Sana"));

        let caller = caller_from_headers(&headers).unwrap();
        assert_eq!(caller.id.0, "u-7");
        assert_eq!(caller.role, Some(Role::Developer));
        assert_eq!(caller.display_name.as_deref(), Some("Sana"));
    }

    #[test]
    fn test_missing_role_stays_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-7"));

        let caller = caller_from_headers(&headers).unwrap();
        assert!(caller.role.is_none());
        assert!(caller.display_name.is_none());
    }
}
