use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Menu catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Menu item {0} not found in catalog")]
    NotFound(String),
    #[error("Menu catalog responded with status {0}")]
    Status(u16),
}

/// Display data the cart needs for one line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogEntry {
    pub name: String,
    pub image: String,
}

#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Look up a menu item, forwarding the caller's `Authorization` header if any.
    async fn lookup(&self, menu_item_id: &str, authorization: Option<&str>) -> Result<CatalogEntry, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl From<CatalogItem> for CatalogEntry {
    /// Missing fields come back empty; the cart fills in its placeholder name.
    fn from(item: CatalogItem) -> Self {
        CatalogEntry { name: item.name.unwrap_or_default(), image: item.image.unwrap_or_default() }
    }
}

/// Reads `GET {base}/menu/{id}` from the restaurant service.
#[derive(Debug, Clone)]
pub struct HttpMenuCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMenuCatalog {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(HttpMenuCatalog { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl MenuCatalog for HttpMenuCatalog {
    #[instrument(skip(self, authorization))]
    async fn lookup(&self, menu_item_id: &str, authorization: Option<&str>) -> Result<CatalogEntry, CatalogError> {
        let url = format!("{}/menu/{}", self.base_url, menu_item_id);
        let mut request = self.client.get(&url);
        if let Some(auth) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(menu_item_id.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let item = response
            .json::<Envelope>()
            .await?
            .data
            .ok_or_else(|| CatalogError::NotFound(menu_item_id.to_string()))?;
        debug!("Catalog hit for {}", menu_item_id);
        Ok(CatalogEntry::from(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_from(body: &str) -> CatalogEntry {
        let envelope: Envelope = serde_json::from_str(body).unwrap();
        CatalogEntry::from(envelope.data.unwrap())
    }

    #[test]
    fn item_without_name_keeps_its_image() {
        let entry = entry_from(r#"{"success":true,"data":{"image":"/uploads/menu-1.png"}}"#);
        assert_eq!(entry.name, "");
        assert_eq!(entry.image, "/uploads/menu-1.png");
    }

    #[test]
    fn item_with_both_fields() {
        let entry = entry_from(r#"{"data":{"name":"Pho","image":null,"price":9}}"#);
        assert_eq!(entry, CatalogEntry { name: "Pho".into(), image: String::new() });
    }
}
