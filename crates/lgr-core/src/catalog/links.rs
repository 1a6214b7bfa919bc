use crate::catalog::types::format_number;

/// Builds public URLs on the catalog site.
#[derive(Clone, Debug)]
pub struct CatalogLinks {
    base: String,
}

impl CatalogLinks {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Join path segments onto the site root; empty segments are skipped.
    pub fn join<S: AsRef<str>>(&self, parts: &[S]) -> String {
        let mut out = self.base.clone();
        for part in parts {
            let p = part.as_ref().trim_matches('/');
            if p.is_empty() {
                continue;
            }
            out.push('/');
            out.push_str(p);
        }
        if out == self.base {
            out.push('/');
        }
        out
    }

    pub fn image(&self, name: &str) -> String {
        self.join(&["static", "images", name])
    }

    pub fn logo(&self) -> String {
        self.join(&["logo.png"])
    }

    pub fn graphql(&self) -> String {
        self.join(&["graphql"])
    }

    /// Reader URL for a page; `human_page` is 1-based.
    pub fn chapter_page(&self, slug: &str, number: f64, human_page: usize) -> String {
        self.join(&[
            slug.to_string(),
            format_number(number),
            human_page.to_string(),
        ])
    }
}
