pub mod credentials;
pub mod editor;
pub mod session;

pub use credentials::AdminCredentials;
pub use session::{
    clear_cookie, get_sessions_path, load_sessions, save_sessions, session_cookie, token_from_cookie,
    SessionStore, COOKIE_NAME,
};

use chrono::{DateTime, Utc};
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("wrong credentials, try again")]
    BadCredentials,

    #[error("not logged in (run `dafuqbro admin login`)")]
    NotLoggedIn,

    #[error("session expired or revoked (run `dafuqbro admin login`)")]
    InvalidSession,
}

/// Check credentials and open a session. Returns the new token.
pub fn login<R: RngCore + ?Sized>(
    credentials: &AdminCredentials,
    store: &mut SessionStore,
    username: &str,
    password: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<String, AuthError> {
    if !credentials.verify(username, password) {
        return Err(AuthError::BadCredentials);
    }
    store.clean_expired(now);
    Ok(store.create_session(now, rng))
}

/// Gate for every admin operation.
pub fn require_session(store: &SessionStore, token: Option<&str>, now: DateTime<Utc>) -> Result<(), AuthError> {
    match token {
        None => Err(AuthError::NotLoggedIn),
        Some(t) if store.validate(t, now) => Ok(()),
        Some(_) => Err(AuthError::InvalidSession),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_login_then_gate() {
        let creds = AdminCredentials::new("admin", "pw");
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(0);

        let token = login(&creds, &mut store, "admin", "pw", now(), &mut rng).unwrap();
        assert_eq!(require_session(&store, Some(&token), now()), Ok(()));
        assert_eq!(
            require_session(&store, Some(&token), now() + Duration::days(8)),
            Err(AuthError::InvalidSession)
        );
    }

    #[test]
    fn test_login_rejects_bad_password() {
        let creds = AdminCredentials::new("admin", "pw");
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            login(&creds, &mut store, "admin", "nope", now(), &mut rng),
            Err(AuthError::BadCredentials)
        );
        assert!(store.sessions.is_empty());
    }

    #[test]
    fn test_gate_without_token() {
        let store = SessionStore::new();
        assert_eq!(require_session(&store, None, now()), Err(AuthError::NotLoggedIn));
        assert_eq!(require_session(&store, Some("abc"), now()), Err(AuthError::InvalidSession));
    }

    #[test]
    fn test_logout_revokes() {
        let creds = AdminCredentials::new("admin", "pw");
        let mut store = SessionStore::new();
        let mut rng = StdRng::seed_from_u64(5);

        let token = login(&creds, &mut store, "admin", "pw", now(), &mut rng).unwrap();
        assert!(store.invalidate(&token));
        assert_eq!(require_session(&store, Some(&token), now()), Err(AuthError::InvalidSession));
    }
}
