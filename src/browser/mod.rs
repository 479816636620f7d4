use anyhow::{Context, Result};

/// Schemes a share intent may use. Viber only has an app deep link.
const ALLOWED_SCHEMES: [&str; 3] = ["https://", "http://", "viber://"];

/// Hand a share intent URL to the system browser (or the Viber app).
/// Anything that is not a web or Viber link is refused.
pub fn open_url(url: &str) -> Result<()> {
    if !ALLOWED_SCHEMES.iter().any(|s| url.starts_with(s)) {
        anyhow::bail!("Refusing to open non-web link: {}", url);
    }
    webbrowser::open(url).with_context(|| format!("No browser could open {}", url))
}
