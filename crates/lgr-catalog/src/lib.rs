//! Little Garden catalog adapter.
//!
//! Talks to the site's GraphQL endpoint and maps the payloads onto the core
//! catalog types.

use std::time::Duration;

use async_trait::async_trait;
use lgr_core::{
    catalog::{
        links::CatalogLinks,
        port::CatalogPort,
        types::{Chapter, MangaRef},
    },
    config::Config,
    errors::Error,
    Result,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::debug;

const MANGAS_QUERY: &str = r#"
query mangas {
  mangas(where: { deleted: false, published: true }) {
    id
    slug
    name
    thumb
  }
}"#;

const CHAPTERS_QUERY: &str = r#"
query chapters($slug: String!, $skip: Float!, $limit: Float!) {
  chapters(
    where: {
      deleted: false,
      published: true,
      manga: { slug: $slug, deleted: false, published: true }
    },
    limit: $limit,
    skip: $skip,
    order: [{ field: "number", order: -1 }]
  ) {
    id
    number
    thumb
    manga { id name slug thumb }
    pages { colored original }
  }
}"#;

const CHAPTER_QUERY: &str = r#"
query chapter($slug: String!, $number: Float!) {
  chapter(
    where: {
      number: $number,
      deleted: false,
      published: true,
      manga: { slug: $slug, deleted: false, published: true }
    }
  ) {
    id
    number
    thumb
    manga { id name slug }
    pages { colored original }
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MangasData {
    mangas: Vec<MangaRef>,
}

#[derive(Debug, Deserialize)]
struct ChaptersData {
    chapters: Vec<Chapter>,
}

#[derive(Debug, Deserialize)]
struct ChapterData {
    chapter: Option<Chapter>,
}

/// Turn a raw GraphQL response body into its `data`, surfacing `errors`.
fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    let resp: GraphqlResponse<T> = serde_json::from_value(body)?;
    if !resp.errors.is_empty() {
        let msg = resp
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Catalog(msg));
    }
    resp.data
        .ok_or_else(|| Error::Catalog("response carried no data".to_string()))
}

#[derive(Clone, Debug)]
pub struct GardenCatalog {
    links: CatalogLinks,
    page_size: u32,
    http: reqwest::Client,
}

impl GardenCatalog {
    pub fn new(base_url: impl Into<String>, page_size: u32, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self {
            links: CatalogLinks::new(base_url),
            page_size: page_size.max(1),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            cfg.catalog_base_url.clone(),
            cfg.catalog_page_size,
            cfg.catalog_timeout,
        )
    }

    async fn query(&self, operation: &str, query: &str, variables: Value) -> Result<Value> {
        debug!(operation, "catalog query");
        let resp = self
            .http
            .post(self.links.graphql())
            .json(&json!({
                "operationName": operation,
                "query": query,
                "variables": variables,
            }))
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("{operation} request error: {e}")))?;

        let status = resp.status();
        // GraphQL servers report query errors with a 4xx and a JSON body;
        // anything else is a transport failure.
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<Value>(&body) {
            Ok(v) => Ok(v),
            Err(_) => Err(Error::Catalog(format!(
                "{operation} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            ))),
        }
    }
}

fn chapters_variables(slug: &str, page_size: u32, page_offset: u32) -> Value {
    json!({
        "slug": slug,
        "limit": page_size,
        "skip": u64::from(page_size) * u64::from(page_offset),
    })
}

#[async_trait]
impl CatalogPort for GardenCatalog {
    async fn list_mangas(&self) -> Result<Vec<MangaRef>> {
        let body = self.query("mangas", MANGAS_QUERY, json!({})).await?;
        Ok(decode::<MangasData>(body)?.mangas)
    }

    async fn list_chapters(&self, slug: &str, page_offset: u32) -> Result<Vec<Chapter>> {
        let vars = chapters_variables(slug, self.page_size, page_offset);
        let body = self.query("chapters", CHAPTERS_QUERY, vars).await?;
        Ok(decode::<ChaptersData>(body)?.chapters)
    }

    async fn get_chapter(&self, slug: &str, number: f64) -> Result<Option<Chapter>> {
        let vars = json!({ "slug": slug, "number": number });
        let body = self.query("chapter", CHAPTER_QUERY, vars).await?;
        Ok(decode::<ChapterData>(body)?.chapter)
    }
}
