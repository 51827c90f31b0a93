// Wire types for the admin backend
// The backend wraps every response in the same envelope and uses camelCase
// field names

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome flag carried in every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Standard response envelope: `{ status, message?, data? }`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct ApiEnvelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Token payload returned by the login and refresh endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub access_token: String,
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Data returned by the register endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Current user as returned by `/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub status: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_with_data() {
        let body = r#"{"status":"success","data":{"accessToken":"T1"}}"#;
        let envelope: ApiEnvelope<TokenPayload> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.status, EnvelopeStatus::Success);
        assert_eq!(envelope.data.unwrap().access_token, "T1");
        assert!(envelope.message.is_none());
    }

    #[test]
    fn test_envelope_error_without_data() {
        let body = r#"{"status":"error","message":"Invalid refresh token"}"#;
        let envelope: ApiEnvelope<TokenPayload> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.status, EnvelopeStatus::Error);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Invalid refresh token"));
    }

    #[test]
    fn test_user_deserializes_camel_case() {
        let body = r#"{
            "id": "u-1",
            "email": "admin@example.com",
            "status": "active",
            "roles": ["admin"],
            "permissions": ["documents:write"],
            "createdAt": "2024-03-01T12:00:00Z"
        }"#;
        let user: User = serde_json::from_str(body).unwrap();
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.roles, vec!["admin"]);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_user_optional_fields_default() {
        let body = r#"{"id":"u-2","email":"x@y.z","status":"active"}"#;
        let user: User = serde_json::from_str(body).unwrap();
        assert!(user.roles.is_empty());
        assert!(user.permissions.is_empty());
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_register_request_skips_missing_full_name() {
        let request = RegisterRequest {
            email: "x@y.z".to_string(),
            password: "secret".to_string(),
            full_name: None,
        };
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains("fullName"));
    }
}
