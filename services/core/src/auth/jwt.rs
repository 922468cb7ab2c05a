use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by the access tokens the identity service issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub exp: usize,
}

/// A caller whose access token has been verified.
///
/// The account ID is the canonical identity key everywhere in the service; the email and display name are kept
/// only for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: Uuid,
    email: String,
    display_name: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No access token provided.")]
    Missing,

    #[error("Authorization header must use the Bearer scheme.")]
    Malformed,

    #[error("Access token is invalid: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Access token subject is not an account ID.")]
    InvalidSubject,
}

/// Verifies HS256 access tokens signed with a secret shared with the identity service.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Identity {
    pub fn new(user_id: Uuid, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl TryFrom<Claims> for Identity {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)?;
        Ok(Identity::new(user_id, claims.email, claims.name))
    }
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        data.claims.try_into()
    }

    /// Verifies the token found in an `authorization` header value (`Bearer <token>`).
    pub fn verify_header(&self, header: Option<&str>) -> Result<Identity, AuthError> {
        let header = header.ok_or(AuthError::Missing)?;
        let token = header.strip_prefix("Bearer ").ok_or(AuthError::Malformed)?;
        self.verify(token.trim())
    }
}
