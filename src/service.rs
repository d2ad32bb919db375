use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::config::AdminConfig;
use crate::error::{AdminError, AdminResult};

/// Content type attached to an uploaded specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Yaml,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Yaml => "application/yaml",
        }
    }

    /// Infer the media type from a file name. Everything that is not
    /// `.json` is treated as YAML, matching the upload form's behavior.
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.to_ascii_lowercase().ends_with(".json") {
            MediaType::Json
        } else {
            MediaType::Yaml
        }
    }
}

/// Derive the schema's display name from its file name by stripping the
/// spec-file extension, if any.
pub fn schema_name_from_file(file_name: &str) -> &str {
    for suffix in [".yaml", ".yml", ".json"] {
        if let Some(stem) = file_name.strip_suffix(suffix) {
            return stem;
        }
    }
    file_name
}

/// One schema as reported by the service listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
}

/// Reference to a newly stored schema.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct LoadSamplesResponse {
    loaded: u32,
}

/// Result of a clear-all sweep. Deletions are issued per schema, so some may
/// fail while others succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteAllOutcome {
    pub deleted: usize,
    pub failed: usize,
}

/// Typed client for the schema service's admin HTTP API.
#[derive(Clone)]
pub struct SchemaServiceClient {
    base_url: String,
    client: reqwest::Client,
}

impl SchemaServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build with a caller-supplied reqwest client, letting tests control
    /// proxy and timeout behavior.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &AdminConfig) -> AdminResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.request_timeout_ms {
            builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
        }
        let client = builder.build()?;
        Ok(Self::with_client(&config.base_url, client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a new specification under `name`. The document travels as the
    /// raw request body; the service parses it server-side.
    pub async fn upload(
        &self,
        name: &str,
        content: &str,
        media_type: MediaType,
    ) -> AdminResult<SchemaRef> {
        if content.trim().is_empty() {
            return Err(AdminError::Validation(
                "specification content is empty".to_string(),
            ));
        }
        let response = self
            .client
            .post(format!("{}/api/schemas", self.base_url))
            .query(&[("name", name)])
            .header(CONTENT_TYPE, media_type.as_str())
            .body(content.to_string())
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<SchemaRef>().await?)
    }

    pub async fn list_schemas(&self) -> AdminResult<Vec<SchemaInfo>> {
        let response = self
            .client
            .get(format!("{}/api/schemas", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<SchemaInfo>>().await?)
    }

    pub async fn get_schema(&self, id: &str) -> AdminResult<SchemaInfo> {
        let response = self
            .client
            .get(format!("{}/api/schemas/{id}", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<SchemaInfo>().await?)
    }

    pub async fn activate(&self, id: &str) -> AdminResult<()> {
        let response = self
            .client
            .post(format!("{}/api/schemas/{id}/activate", self.base_url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AdminResult<()> {
        let response = self
            .client
            .delete(format!("{}/api/schemas/{id}", self.base_url))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete every stored schema, one request per entry. Listing failure is
    /// the only hard error; per-item failures are tallied in the outcome.
    pub async fn delete_all(&self) -> AdminResult<DeleteAllOutcome> {
        let schemas = self.list_schemas().await?;
        let mut outcome = DeleteAllOutcome {
            deleted: 0,
            failed: 0,
        };
        for schema in schemas {
            match self.delete(&schema.id).await {
                Ok(()) => outcome.deleted += 1,
                Err(err) => {
                    outcome.failed += 1;
                    tracing::warn!(error = %err, schema_id = %schema.id, "failed to delete schema during clear-all");
                }
            }
        }
        Ok(outcome)
    }

    pub async fn load_samples(&self) -> AdminResult<u32> {
        let response = self
            .client
            .post(format!("{}/api/schemas/load-samples", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<LoadSamplesResponse>().await?.loaded)
    }

    /// Fetch the currently active specification document as JSON.
    pub async fn fetch_active_spec(&self) -> AdminResult<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/api-spec", self.base_url))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NoActiveSpec);
        }
        let response = check_status(response).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }

    /// Fetch a stored schema's raw document text.
    pub async fn export_schema(&self, id: &str) -> AdminResult<String> {
        let response = self
            .client
            .get(format!("{}/api/schemas/{id}/export", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

async fn check_status(response: Response) -> AdminResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdminError::service(status.as_u16(), body))
}
