use std::fmt::Write;

use lexi_types::Entry;

/// One meaning block of a rendered definition
#[derive(Debug, Clone, PartialEq)]
pub struct MeaningBlock {
    pub part_of_speech: Option<String>,
    pub definitions: Vec<String>,
}

/// Everything a popup can show
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    Loading {
        query: String,
    },
    Definition {
        word: String,
        phonetic: Option<String>,
        meanings: Vec<MeaningBlock>,
    },
    Error {
        query: String,
        reason: String,
        search_link: String,
    },
}

impl PopupContent {
    pub fn loading(query: &str) -> Self {
        Self::Loading {
            query: query.to_string(),
        }
    }

    /// Keeps meaning order; each meaning shows at most `max_definitions`
    pub fn definition(entry: &Entry, max_definitions: usize) -> Self {
        Self::Definition {
            word: entry.word.clone(),
            phonetic: entry.phonetic.clone(),
            meanings: entry
                .meanings
                .iter()
                .map(|m| MeaningBlock {
                    part_of_speech: m.part_of_speech.clone().filter(|p| !p.is_empty()),
                    definitions: m.definitions.iter().take(max_definitions).cloned().collect(),
                })
                .collect(),
        }
    }

    pub fn error(query: &str, reason: &str, search_base: &str) -> Self {
        Self::Error {
            query: query.to_string(),
            reason: reason.to_string(),
            search_link: search_link(search_base, query),
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();

        match self {
            PopupContent::Loading { query } => {
                let _ = write!(
                    html,
                    r#"<div class="lexi-popup lexi-loading" role="status"><div class="lexi-spinner"></div><span class="lexi-status">Looking up &ldquo;{}&rdquo;&hellip;</span></div>"#,
                    escape_html(query)
                );
            }
            PopupContent::Definition {
                word,
                phonetic,
                meanings,
            } => {
                html.push_str(r#"<div class="lexi-popup lexi-definition" role="dialog">"#);
                html.push_str(CLOSE_BUTTON);
                let _ = write!(html, r#"<div class="lexi-word">{}</div>"#, escape_html(word));
                if let Some(phonetic) = phonetic {
                    let _ = write!(
                        html,
                        r#"<div class="lexi-phonetic">{}</div>"#,
                        escape_html(phonetic)
                    );
                }

                for (i, meaning) in meanings.iter().enumerate() {
                    if i > 0 {
                        html.push_str(r#"<hr class="lexi-divider">"#);
                    }
                    html.push_str(r#"<div class="lexi-meaning">"#);
                    if let Some(pos) = &meaning.part_of_speech {
                        let _ = write!(html, r#"<div class="lexi-pos">{}</div>"#, escape_html(pos));
                    }
                    for (n, definition) in meaning.definitions.iter().enumerate() {
                        let _ = write!(
                            html,
                            r#"<div class="lexi-def"><span class="lexi-num">{}.</span> {}</div>"#,
                            n + 1,
                            escape_html(definition)
                        );
                    }
                    html.push_str("</div>");
                }
                html.push_str("</div>");
            }
            PopupContent::Error {
                query,
                reason,
                search_link,
            } => {
                html.push_str(r#"<div class="lexi-popup lexi-error" role="dialog">"#);
                html.push_str(CLOSE_BUTTON);
                let _ = write!(
                    html,
                    r#"<div class="lexi-message">No definition found for &ldquo;{}&rdquo;.</div><div class="lexi-reason">{}</div>"#,
                    escape_html(query),
                    escape_html(reason)
                );
                let _ = write!(
                    html,
                    r#"<a class="lexi-search" href="{}" target="_blank" rel="noopener noreferrer">Search Google for &ldquo;{}&rdquo;</a>"#,
                    escape_html(search_link),
                    escape_html(query)
                );
                html.push_str("</div>");
            }
        }

        html
    }
}

const CLOSE_BUTTON: &str =
    r#"<button class="lexi-close" type="button" aria-label="Close">&times;</button>"#;

/// `<base>?q=<percent-encoded query>`
pub fn search_link(base: &str, query: &str) -> String {
    format!("{}?q={}", base, urlencoding::encode(query))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
