//! Share copy and share-intent URLs for a finished quiz.

use std::collections::BTreeMap;

use super::catalog::QuizDefinition;
use super::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    X,
    Facebook,
    Telegram,
    WhatsApp,
    Viber,
}

impl Network {
    pub const ALL: [Network; 5] = [
        Network::X,
        Network::Facebook,
        Network::Telegram,
        Network::WhatsApp,
        Network::Viber,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Network::X => "X",
            Network::Facebook => "Facebook",
            Network::Telegram => "Telegram",
            Network::WhatsApp => "WhatsApp",
            Network::Viber => "Viber",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub network: Network,
    pub url: String,
}

/// Public page for a quiz, e.g. `https://dafuqbro.com/redflags`.
pub fn share_url(site_url: &str, quiz: &QuizDefinition) -> String {
    format!("{}/{}", site_url.trim_end_matches('/'), quiz.slug)
}

/// Values available to a quiz's `share_template`.
pub fn placeholders(outcome: &Outcome) -> BTreeMap<&'static str, String> {
    let mut vars = BTreeMap::new();
    match outcome {
        Outcome::Match(m) => {
            vars.insert("name", m.candidate.name.clone());
            vars.insert("emoji", m.candidate.emoji.clone());
            vars.insert("tagline", m.candidate.tagline.clone());
            vars.insert("score", m.meter.to_string());
        }
        Outcome::Tiered(t) => {
            vars.insert("score", t.score.to_string());
            vars.insert("label", t.tier.label.clone());
            vars.insert("emoji", t.tier.emoji.clone());
            vars.insert("grade", t.grade.clone().unwrap_or_else(|| t.tier.label.clone()));
        }
        Outcome::Pitch(p) => {
            vars.insert("ticker", p.ticker.clone());
            vars.insert("name", p.coin_name.clone());
            vars.insert("grade", p.grade.clone());
            vars.insert("score", p.score.to_string());
            vars.insert("label", p.tier_label.clone());
            vars.insert("tagline", p.tagline.clone());
            vars.insert("emoji", p.mascot.clone());
        }
    }
    vars
}

/// Fill `{name}` style placeholders. Unknown placeholders are left as is.
pub fn render_template(template: &str, vars: &BTreeMap<&'static str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn share_text(quiz: &QuizDefinition, outcome: &Outcome) -> String {
    render_template(&quiz.share_template, &placeholders(outcome))
}

pub fn share_link(network: Network, text: &str, url: &str) -> String {
    let text_enc = urlencoding::encode(text);
    let url_enc = urlencoding::encode(url);
    match network {
        Network::X => format!("https://twitter.com/intent/tweet?text={}&url={}", text_enc, url_enc),
        Network::Facebook => format!("https://www.facebook.com/sharer/sharer.php?u={}", url_enc),
        Network::Telegram => format!("https://t.me/share/url?url={}&text={}", url_enc, text_enc),
        Network::WhatsApp => format!(
            "https://wa.me/?text={}",
            urlencoding::encode(&format!("{} {}", text, url))
        ),
        Network::Viber => format!(
            "viber://forward?text={}",
            urlencoding::encode(&format!("{} {}", text, url))
        ),
    }
}

pub fn share_links(text: &str, url: &str) -> Vec<ShareLink> {
    Network::ALL
        .iter()
        .map(|&network| ShareLink {
            network,
            url: share_link(network, text, url),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::outcome::evaluate_answers;
    use crate::quiz::Catalog;
    use crate::scoring::Answers;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    #[test]
    fn test_render_template() {
        let mut vars = BTreeMap::new();
        vars.insert("score", "46".to_string());
        vars.insert("label", "Walking Red Flag".to_string());

        assert_eq!(
            render_template("I scored {score}/100 — \"{label}\"", &vars),
            "I scored 46/100 — \"Walking Red Flag\""
        );
        assert_eq!(render_template("keep {unknown} and {", &vars), "keep {unknown} and {");
    }

    #[test]
    fn test_share_url() {
        let catalog = Catalog::builtin().unwrap();
        let quiz = catalog.quiz("redflags").unwrap();
        assert_eq!(share_url("https://dafuqbro.com/", quiz), "https://dafuqbro.com/redflags");
    }

    #[test]
    fn test_share_text_red_flags() {
        let catalog = Catalog::builtin().unwrap();
        let quiz = catalog.quiz("redflags").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = evaluate_answers(quiz, &Answers::new(), &BTreeSet::new(), &mut rng).unwrap();

        let text = share_text(quiz, &outcome);
        assert!(text.starts_with("I scored 0/100 on the Red Flag test 🚩"));
        assert!(text.contains("\"Suspiciously Perfect\""));
    }

    #[test]
    fn test_share_links_encode() {
        let links = share_links("a b&c", "https://dafuqbro.com/food");
        assert_eq!(links.len(), 5);
        assert_eq!(
            links[0].url,
            "https://twitter.com/intent/tweet?text=a%20b%26c&url=https%3A%2F%2Fdafuqbro.com%2Ffood"
        );
        assert_eq!(
            links[1].url,
            "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fdafuqbro.com%2Ffood"
        );
        assert_eq!(
            links[3].url,
            "https://wa.me/?text=a%20b%26c%20https%3A%2F%2Fdafuqbro.com%2Ffood"
        );
    }
}
