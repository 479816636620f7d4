use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use subtle::ConstantTimeEq;

/// Environment variable holding the admin username
pub const ENV_USERNAME_VAR: &str = "DAFUQBRO_ADMIN_USERNAME";
/// Environment variable holding the admin password
pub const ENV_PASSWORD_VAR: &str = "DAFUQBRO_ADMIN_PASSWORD";

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "changeme";

#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials from the environment, falling back to admin/changeme.
    /// Blank values count as unset.
    pub fn from_env() -> Self {
        Self::new(
            env_or(ENV_USERNAME_VAR, DEFAULT_USERNAME),
            env_or(ENV_PASSWORD_VAR, DEFAULT_PASSWORD),
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// True when the password was never changed from the default.
    pub fn is_default_password(&self) -> bool {
        self.password == DEFAULT_PASSWORD
    }

    /// Compare both fields without short-circuiting on the first mismatch.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

fn env_or(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Ask for a username and a hidden password on the terminal.
pub fn prompt_login() -> Result<(String, String)> {
    let username = super::editor::prompt("Username: ")?;
    let password = rpassword::prompt_password("Password: ").context("Failed to read password from stdin")?;
    Ok((username, password))
}

/// Get the path of the locally saved admin token (~/.config/dafuqbro/admin_token)
pub fn get_token_path() -> PathBuf {
    crate::config::get_config_dir().join("admin_token")
}

/// The token saved by the last `admin login`, if any.
pub fn load_saved_token(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let token = fs::read_to_string(path)
        .with_context(|| format!("Failed to read admin token at {}", path.display()))?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

pub fn save_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, token).with_context(|| format!("Failed to write admin token to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Remove the saved token. Missing is fine.
pub fn clear_token(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove admin token at {}", path.display())),
    }
}
