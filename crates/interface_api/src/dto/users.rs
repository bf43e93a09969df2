//! Account and profile DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_invoicing::{ProfileChanges, UserProfile};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email cannot be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileChanges {
            first_name: request.first_name,
            last_name: request.last_name,
            company_name: request.company_name,
            address: request.address,
            tax_id: request.tax_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl From<UserProfile> for ProfileDto {
    fn from(profile: UserProfile) -> Self {
        Self {
            first_name: profile.first_name,
            last_name: profile.last_name,
            company_name: profile.company_name,
            address: profile.address,
            tax_id: profile.tax_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub updated_profile: ProfileDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_bad_email() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            password: "secret".into(),
            first_name: None,
            last_name: None,
            company_name: None,
            address: None,
            tax_id: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_profile_request_camel_case() {
        let request: UpdateProfileRequest =
            serde_json::from_str(r#"{"companyName": "Doe LLC", "taxId": "DE1"}"#).unwrap();
        let changes = ProfileChanges::from(request);
        assert_eq!(changes.company_name.as_deref(), Some("Doe LLC"));
        assert_eq!(changes.tax_id.as_deref(), Some("DE1"));
        assert!(changes.first_name.is_none());
    }
}
