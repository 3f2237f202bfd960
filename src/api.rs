// ABOUTME: Blocking HTTP client for the saved-response document store
// ABOUTME: Speaks PostgREST (list by owner, update by id) with fail-fast errors

use crate::{Document, DocumentId, DocumentPatch, Error, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Duration;

pub const DOCUMENTS_TABLE: &str = "user_ai_responses";
const DOCUMENT_COLUMNS: &str = "id,title,page_slug,updated_at,response_content";

/// Query/update surface the page needs from the backend.
pub trait DocumentStore {
    /// Documents owned by `user_id`, most recently updated first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Document>>;

    fn update_by_id(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<()>;
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

pub struct StoreClient {
    client: Client,
    base_url: String,
    anon_key: String,
    token: String,
}

impl StoreClient {
    pub fn new(base_url: String, anon_key: String, token: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(StoreClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            token,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .header("User-Agent", "little-plans/0.1 (Rust)")
    }

    fn check(endpoint: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(Error::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: truncate_str(&message, 100),
            });
        }
        Ok(response)
    }

    fn parse<T: serde::de::DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(
                endpoint,
                body = %truncate_str(&body, 500),
                "failed to parse response: {}",
                e
            );
            Error::Parse(e)
        })
    }

    /// Looks up the account behind the bearer token.
    pub fn current_user_id(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct User {
            id: String,
        }

        let endpoint = "/auth/v1/user";
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, "resolving current user");

        let response = self.authorized(self.client.get(&url)).send()?;
        let response = Self::check(endpoint, response)?;
        let user: User = Self::parse(endpoint, response)?;
        Ok(user.id)
    }
}

impl DocumentStore for StoreClient {
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Document>> {
        let endpoint = format!("/rest/v1/{}", DOCUMENTS_TABLE);
        let url = format!("{}{}", self.base_url, endpoint);
        let owner = format!("eq.{}", user_id);
        tracing::debug!(%url, user_id, "listing documents");

        let request = self.client.get(&url).query(&[
            ("select", DOCUMENT_COLUMNS),
            ("user_id", owner.as_str()),
            ("order", "updated_at.desc"),
        ]);
        let response = self.authorized(request).send()?;
        let response = Self::check(&endpoint, response)?;
        Self::parse(&endpoint, response)
    }

    fn update_by_id(&self, id: &DocumentId, patch: &DocumentPatch) -> Result<()> {
        let endpoint = format!("/rest/v1/{}", DOCUMENTS_TABLE);
        let url = format!("{}{}", self.base_url, endpoint);
        let key = format!("eq.{}", id);
        tracing::debug!(%url, %id, "updating document");

        let request = self
            .client
            .patch(&url)
            .query(&[("id", key.as_str())])
            .header("Prefer", "return=minimal")
            .json(patch);
        let response = self.authorized(request).send()?;
        Self::check(&endpoint, response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 100), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        let result = truncate_str("hello world", 7);
        assert!(result.starts_with("hello"));
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_str_utf8() {
        let text = "Hello 世界 World";
        let result = truncate_str(text, 7);
        assert_eq!(result, "Hello ...");
    }

    #[test]
    fn test_store_client_trims_base_url() {
        let client = StoreClient::new(
            "https://example.supabase.co/".into(),
            "anon".into(),
            "token".into(),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://example.supabase.co");
        assert_eq!(client.token, "token");
        assert_eq!(client.anon_key, "anon");
    }
}
