//! Caller identity claims supplied by the external identity provider

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Role within the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Admin,
    Member,
}

/// JWT claims for an organization-scoped caller. Token issuance is the
/// identity provider's concern; the core only validates and reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgClaims {
    /// Caller (member) id
    pub sub: String,
    /// Organization (tenant) scope, partitions all entities
    pub org_id: String,
    pub org_role: OrgRole,
    pub exp: i64,
    pub iat: i64,
}

impl OrgClaims {
    /// Create a new JWT token (used by tests and tooling)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.org_role == OrgRole::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Admin privileges required for this action".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: OrgRole) -> OrgClaims {
        let now = chrono::Utc::now().timestamp();
        OrgClaims {
            sub: "user_42".to_string(),
            org_id: "org_1".to_string(),
            org_role: role,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let original = claims(OrgRole::Admin);
        let token = original.create_token("secret").unwrap();
        let parsed = OrgClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, "user_42");
        assert_eq!(parsed.org_id, "org_1");
        assert!(parsed.is_admin());
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = claims(OrgRole::Member).create_token("secret").unwrap();
        assert!(OrgClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_member_is_not_admin() {
        let member = claims(OrgRole::Member);
        assert!(!member.is_admin());
        assert!(member.require_admin().is_err());
    }
}
