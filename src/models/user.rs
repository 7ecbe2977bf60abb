use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Account profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Payload for `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Payload for `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login/register response: the profile plus a fresh bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_parses_backend_shape() {
        let json = r#"{
            "_id": "66f1a2b3c4d5e6f7a8b9c0d1",
            "name": "Asha Nair",
            "email": "asha@example.com",
            "dateOfBirth": "1988-04-12T00:00:00.000Z",
            "phoneNumber": "+15555550101"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "66f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(user.phone_number.as_deref(), Some("+15555550101"));
        assert_eq!(user.date_of_birth.unwrap().format("%Y-%m-%d").to_string(), "1988-04-12");
    }

    #[test]
    fn user_tolerates_missing_optionals() {
        let json = r#"{"_id": "abc", "name": "N", "email": "n@example.com"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.date_of_birth.is_none());
        assert!(user.phone_number.is_none());
    }

    #[test]
    fn register_request_serializes_camel_case() {
        let req = RegisterRequest {
            name: "Asha Nair".into(),
            email: "asha@example.com".into(),
            password: "hunter22".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 4, 12).unwrap(),
            phone_number: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["dateOfBirth"], "1988-04-12");
        assert!(json.get("phoneNumber").is_none());
    }

    #[test]
    fn auth_response_flattens_user() {
        let json = r#"{
            "_id": "abc",
            "name": "N",
            "email": "n@example.com",
            "token": "jwt-token-here"
        }"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.id, "abc");
        assert_eq!(auth.token, "jwt-token-here");
    }
}
