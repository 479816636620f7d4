use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "dfb_session";
/// Sessions live for seven days from creation.
pub const SESSION_TTL_DAYS: i64 = 7;
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntry {
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Server-side admin sessions, keyed by token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStore {
    pub version: u32,
    #[serde(default)]
    pub sessions: HashMap<String, SessionEntry>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            version: 1,
            sessions: HashMap::new(),
        }
    }

    /// Start a session and return its token.
    pub fn create_session<R: RngCore + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> String {
        let token = generate_token(rng);
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                created_at: now,
                expires_at: now + Duration::days(SESSION_TTL_DAYS),
            },
        );
        token
    }

    /// True if the token names a session that has not yet expired.
    /// An empty token is never valid.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> bool {
        if token.is_empty() {
            return false;
        }
        self.sessions
            .get(token)
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Returns true if the session existed.
    pub fn invalidate(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop expired sessions
    pub fn clean_expired(&mut self, now: DateTime<Utc>) {
        self.sessions.retain(|_, entry| entry.expires_at > now);
    }
}

/// 32 random bytes as lowercase hex.
pub fn generate_token<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// `Set-Cookie` value for a fresh session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        COOKIE_NAME,
        token,
        Duration::days(SESSION_TTL_DAYS).num_seconds()
    )
}

/// `Set-Cookie` value that clears the session.
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0", COOKIE_NAME)
}

/// Pull the session token out of a `Cookie` header. Only lowercase hex
/// tokens are accepted.
pub fn token_from_cookie(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name != COOKIE_NAME {
            return None;
        }
        let end = value
            .find(|c: char| !matches!(c, '0'..='9' | 'a'..='f'))
            .unwrap_or(value.len());
        let token = &value[..end];
        (!token.is_empty()).then_some(token)
    })
}

/// Get the default sessions file path (~/.config/dafuqbro/sessions.json)
pub fn get_sessions_path() -> PathBuf {
    crate::config::get_config_dir().join("sessions.json")
}

/// Load sessions from a JSON file. A missing file means no sessions.
pub fn load_sessions(path: &Path) -> Result<SessionStore> {
    if !path.exists() {
        return Ok(SessionStore::new());
    }

    let file = File::open(path).with_context(|| format!("Failed to open sessions file at {}", path.display()))?;
    let store: SessionStore = serde_json::from_reader(file).context("Failed to load sessions")?;

    if store.version != 1 {
        anyhow::bail!("Unsupported sessions file version: {}", store.version);
    }

    Ok(store)
}

/// Save sessions atomically.
pub fn save_sessions(path: &Path, store: &SessionStore) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, store).context("Failed to serialize sessions")?;
    file.commit().context("Failed to save sessions")?;

    Ok(())
}
