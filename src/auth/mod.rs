//! Authentication and session context.
//!
//! The PSK layer gates the whole API with a constant-time comparison. The [`Session`]
//! extractor then resolves who is acting from the session headers and hands that principal
//! to each handler explicitly.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};
use crate::models::{team, Member, Principal, TeamLeader};
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header naming the acting team leader.
pub const LEADER_ID_HEADER: &str = "x-leader-id";
/// Header naming the acting member.
pub const MEMBER_ID_HEADER: &str = "x-member-id";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(provided_key) => {
            if constant_time_compare(&provided_key, &expected) {
                next.run(request).await
            } else {
                unauthorized_response("Invalid API key")
            }
        }
        None => {
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(bearer_key) if constant_time_compare(&bearer_key, &expected) => {
                    next.run(request).await
                }
                _ => unauthorized_response("Missing or invalid API key"),
            }
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// The acting principal for one request.
#[derive(Debug, Clone)]
pub struct Session(pub Principal);

impl Session {
    /// The acting leader, or `NotAuthorized` when a member is acting.
    pub fn leader(&self) -> Result<&TeamLeader, AppError> {
        self.0
            .as_leader()
            .ok_or_else(|| AppError::NotAuthorized("A team leader session is required".to_string()))
    }

    /// The acting member, or `NotAuthorized` when a leader is acting.
    pub fn member(&self) -> Result<&Member, AppError> {
        self.0
            .as_member()
            .ok_or_else(|| AppError::NotAuthorized("A member session is required".to_string()))
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(leader_id) = id_header(&parts.headers, LEADER_ID_HEADER)? {
            return team::leader_by_id(leader_id)
                .map(|leader| Session(Principal::Admin(leader)))
                .ok_or_else(|| AppError::Unauthorized(format!("Unknown leader {}", leader_id)));
        }

        if let Some(member_id) = id_header(&parts.headers, MEMBER_ID_HEADER)? {
            return state
                .repo
                .get_member(member_id)
                .await?
                .map(|member| Session(Principal::User(member)))
                .ok_or_else(|| AppError::Unauthorized(format!("Unknown member {}", member_id)));
        }

        Err(AppError::Unauthorized("No session".to_string()))
    }
}

fn id_header(headers: &HeaderMap, name: &str) -> Result<Option<i64>, AppError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("Header {} must be an integer id", name)))
}
