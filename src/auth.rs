use anyhow::Context as _;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use clap::ValueEnum;
use rand::RngCore as _;
use sha2::{Digest, Sha256};

use crate::model::Session;
use crate::store::Store;

/// Argon2 cost profile. `Fast` is for local development and tests only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PasswordCost {
    #[default]
    Standard,
    Fast,
}

impl PasswordCost {
    fn argon2(self) -> anyhow::Result<Argon2<'static>> {
        match self {
            PasswordCost::Standard => Ok(Argon2::default()),
            PasswordCost::Fast => {
                let params = Params::new(1024, 1, 1, None)
                    .map_err(|err| anyhow::anyhow!("argon2 params: {err}"))?;
                Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
            }
        }
    }
}

pub fn hash_password(password: &str, cost: PasswordCost) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = cost
        .argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Parameters are read from the PHC string, so any cost profile verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Creates a session for `user_id` and returns the bearer token. Only the
/// token's hash is stored.
pub async fn issue_session(
    store: &dyn Store,
    user_id: &str,
    ttl: Duration,
) -> anyhow::Result<String> {
    let token = generate_token();
    let session = Session {
        token_hash: hash_token(&token),
        user_id: user_id.to_owned(),
        expires_at: Utc::now() + ttl,
    };
    store.put_session(&session).await.context("store session")?;
    Ok(token)
}

/// Returns the live session for `token`. Expired sessions are removed.
pub async fn resolve_session(store: &dyn Store, token: &str) -> anyhow::Result<Option<Session>> {
    let token_hash = hash_token(token.trim());
    let Some(session) = store.get_session(&token_hash).await? else {
        return Ok(None);
    };
    if session.expires_at <= Utc::now() {
        tracing::debug!(user_id = %session.user_id, "session expired");
        store.delete_session(&token_hash).await?;
        return Ok(None);
    }
    Ok(Some(session))
}

pub async fn revoke_session(store: &dyn Store, token: &str) -> anyhow::Result<()> {
    store.delete_session(&hash_token(token.trim())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalFsStore;

    #[test]
    fn password_round_trip() -> anyhow::Result<()> {
        let hash = hash_password("correct horse", PasswordCost::Fast)?;
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
        Ok(())
    }

    #[test]
    fn tokens_are_random_and_hash_deterministically() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsStore::new(dir.path());

        let live = issue_session(&store, "u1", Duration::days(7)).await?;
        let session = resolve_session(&store, &live).await?;
        assert_eq!(session.map(|s| s.user_id).as_deref(), Some("u1"));

        let stale = issue_session(&store, "u1", Duration::seconds(-1)).await?;
        assert!(resolve_session(&store, &stale).await?.is_none());
        assert!(store.get_session(&hash_token(&stale)).await?.is_none());

        revoke_session(&store, &live).await?;
        assert!(resolve_session(&store, &live).await?.is_none());
        Ok(())
    }
}
