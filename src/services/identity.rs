//! Identity resolution against the Cognito user pool.
//!
//! DESIGN
//! ======
//! The portal never stores users. Each page load hands the session cookie's
//! access token to `GetUser`; Cognito validates it and returns the username
//! plus user attributes. The operator decision reads an explicit role
//! attribute rather than comparing usernames.

use serde::Deserialize;

const GET_USER_TARGET: &str = "AWSCognitoIdentityProviderService.GetUser";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const OPERATOR_ROLE: &str = "operator";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("identity provider request failed: {0}")]
    Request(String),
    #[error("identity provider response error: status {status}")]
    Response { status: u16, body: String },
}

/// Which top-level view a session is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Operator,
    Visitor,
}

/// Resolved identity for one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Username as reported by the identity provider.
    pub identity: String,
    pub role: Role,
    /// Bearer credential reused for data API calls on the user's behalf.
    pub access_token: String,
}

#[cfg(test)]
impl Session {
    #[must_use]
    pub fn visitor(identity: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self { identity: identity.into(), role: Role::Visitor, access_token: access_token.into() }
    }

    #[must_use]
    pub fn operator(identity: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self { identity: identity.into(), role: Role::Operator, access_token: access_token.into() }
    }
}

/// External identity/session API.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user behind `access_token`. Any failure means "no session".
    async fn current_authenticated_user(&self, access_token: &str) -> Result<Session, IdentityError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetUserResponse {
    pub username: String,
    #[serde(default)]
    pub user_attributes: Vec<UserAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct UserAttribute {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct AwsErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Map a `GetUser` answer to a session. The role attribute must equal
/// `operator` (case-insensitive) to grant the admin view.
pub(crate) fn session_from_user(user: GetUserResponse, role_attribute: &str, access_token: &str) -> Session {
    let is_operator = user
        .user_attributes
        .iter()
        .any(|attr| attr.name == role_attribute && attr.value.trim().eq_ignore_ascii_case(OPERATOR_ROLE));
    let role = if is_operator { Role::Operator } else { Role::Visitor };
    Session { identity: user.username, role, access_token: access_token.to_owned() }
}

/// Classify a non-success `GetUser` response.
pub(crate) fn classify_error(status: u16, body: String) -> IdentityError {
    if let Ok(parsed) = serde_json::from_str::<AwsErrorBody>(&body) {
        if parsed.kind.ends_with("NotAuthorizedException") || parsed.kind.ends_with("UserNotFoundException") {
            return IdentityError::NotAuthenticated(parsed.message);
        }
    }
    IdentityError::Response { status, body }
}

// =============================================================================
// COGNITO CLIENT
// =============================================================================

pub struct CognitoIdentityProvider {
    http: reqwest::Client,
    endpoint: String,
    role_attribute: String,
}

impl CognitoIdentityProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, role_attribute: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into(), role_attribute: role_attribute.into() }
    }

    /// Regional Cognito Identity Provider endpoint.
    #[must_use]
    pub fn endpoint_for_region(region: &str) -> String {
        format!("https://cognito-idp.{region}.amazonaws.com/")
    }
}

#[async_trait::async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn current_authenticated_user(&self, access_token: &str) -> Result<Session, IdentityError> {
        if access_token.is_empty() {
            return Err(IdentityError::NotAuthenticated("no access token".into()));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", GET_USER_TARGET)
            .body(serde_json::json!({ "AccessToken": access_token }).to_string())
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_error(status, text));
        }

        let user: GetUserResponse =
            serde_json::from_str(&text).map_err(|e| IdentityError::Request(format!("unexpected response: {e}")))?;
        Ok(session_from_user(user, &self.role_attribute, access_token))
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
