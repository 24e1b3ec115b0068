use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_TTL: Duration = Duration::days(1);
pub const IMPERSONATION_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub exp: i64,
    /// Admin that issued an impersonated session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imp: Option<String>,
}

impl UserClaims {
    pub fn subject(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }

    pub fn impersonator(&self) -> Option<Uuid> {
        self.imp.as_deref().and_then(|imp| imp.parse().ok())
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

/// Issues a session token for `user_id`. Impersonated sessions are short lived.
pub fn issue_session<K: AsRef<[u8]>>(
    user_id: Uuid,
    impersonator: Option<Uuid>,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let ttl = if impersonator.is_some() {
        IMPERSONATION_TTL
    } else {
        SESSION_TTL
    };

    let claims = UserClaims {
        sub: user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
        imp: impersonator.map(|id| id.to_string()),
    };
    generate_token(claims, key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_roundtrip_test() {
        let user = Uuid::new_v4();
        let token = issue_session(user, None, "key").unwrap();
        let data = process_token(&token, "key").unwrap();
        assert_eq!(data.claims.subject(), Some(user));
        assert_eq!(data.claims.impersonator(), None);
    }

    #[test]
    fn impersonated_session_test() {
        let user = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let token = issue_session(user, Some(admin), "key").unwrap();
        let data = process_token(&token, "key").unwrap();
        assert_eq!(data.claims.impersonator(), Some(admin));
        assert!(data.claims.exp <= (Utc::now() + IMPERSONATION_TTL).timestamp());
    }

    #[test]
    fn wrong_key_rejected_test() {
        let token = issue_session(Uuid::new_v4(), None, "key").unwrap();
        assert!(process_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_rejected_test() {
        let claims = UserClaims {
            sub: Uuid::new_v4().to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
            imp: None,
        };
        let token = generate_token(claims, "key").unwrap();
        assert!(process_token(&token, "key").is_err());
    }
}
