use serde::{Deserialize, Deserializer};

/// One scanned page. `colored` is only set when a colorized edition exists.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub colored: Option<String>,
    pub original: String,
}

impl Page {
    /// The image to display: colored edition first, original otherwise.
    pub fn image(&self) -> &str {
        match self.colored.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => &self.original,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MangaRef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Chapter {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub number: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
    pub manga: MangaRef,
}

impl Chapter {
    /// Chapter number as users type it (`12`, `10.5`).
    pub fn number_label(&self) -> String {
        format_number(self.number)
    }

    /// Index of the last page. Callers guarantee `pages` is non-empty.
    pub fn last_page(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Catalog ids arrive either as numbers or strings depending on the query.
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
