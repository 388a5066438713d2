use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::config::SourceConfig;
use crate::features::regions::models::{UpsertAdminUnit, UpsertProvince};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// The source rejects requests without a browser user agent
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// Form id that selects the top-level province listing
const PROVINCE_LISTING_ID: i32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request to remote source failed: {0}")]
    Request(String),

    #[error("Remote source returned HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to parse remote source response: {0}")]
    Parse(String),
}

/// One round-trip to the remote dataset. Implementations never retry.
#[async_trait]
pub trait RegionSource: Send + Sync {
    async fn fetch_provinces(&self) -> Result<Vec<UpsertProvince>, SourceError>;

    async fn fetch_units(&self, province_id: i32) -> Result<Vec<UpsertAdminUnit>, SourceError>;
}

/// Province payload from `/pcotinh`
#[derive(Debug, Deserialize)]
struct SourceProvince {
    id: i32,
    #[serde(rename = "tentinh", default)]
    name: String,
    #[serde(rename = "mahc", default, deserialize_with = "lenient_code")]
    code: Option<i32>,
}

/// Unit payload from `/ptracuu`
#[derive(Debug, Deserialize)]
struct SourceUnit {
    id: i32,
    #[serde(rename = "matinh", default)]
    province_id: Option<i32>,
    #[serde(rename = "tenhc", default)]
    name: String,
    #[serde(rename = "loai", default)]
    level: String,
    #[serde(rename = "ma", default, deserialize_with = "lenient_text")]
    code: String,
    #[serde(rename = "truocsapnhap", default)]
    pre_merger_description: Option<String>,
    #[serde(rename = "vido", default, deserialize_with = "lenient_coordinate")]
    latitude: f64,
    #[serde(rename = "kinhdo", default, deserialize_with = "lenient_coordinate")]
    longitude: f64,
}

impl From<SourceProvince> for UpsertProvince {
    fn from(province: SourceProvince) -> Self {
        Self {
            id: province.id,
            name: province.name,
            code: province.code,
        }
    }
}

impl SourceUnit {
    /// Units without `matinh` belong to the province that was queried
    fn into_upsert(self, queried_province_id: i32) -> UpsertAdminUnit {
        UpsertAdminUnit {
            id: self.id,
            province_id: self.province_id.unwrap_or(queried_province_id),
            name: self.name,
            level: self.level,
            code: self.code,
            pre_merger_description: self
                .pre_merger_description
                .filter(|s| !s.trim().is_empty()),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Numeric province code. Absent, null or non-numeric values become `None`.
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(province_code(value).unwrap_or_else(|raw| {
        tracing::warn!(code = %raw, "Unusable province code, storing as absent");
        None
    }))
}

/// `Err` carries a present value that is not an `i32` code
fn province_code(value: Option<Value>) -> Result<Option<i32>, Value> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(code) => Ok(Some(code)),
            None => Err(Value::Number(n)),
        },
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i32>().map(Some).map_err(|_| Value::String(s)),
        Some(other) => Err(other),
    }
}

/// Unit codes arrive as strings, occasionally as bare numbers
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Coordinates default to zero when missing or unparsable
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// HTTP client for the remote administrative dataset
pub struct HttpRegionSource {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpRegionSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// POSTs `id=<id>` with the session headers and returns the successful response
    async fn post_form(&self, url: &str, id: i32) -> Result<reqwest::Response, SourceError> {
        let referer = format!("{}/", self.config.origin.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(COOKIE, &self.config.cookie)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ORIGIN, &self.config.origin)
            .header(REFERER, referer)
            .body(format!("id={}", id))
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RegionSource for HttpRegionSource {
    async fn fetch_provinces(&self) -> Result<Vec<UpsertProvince>, SourceError> {
        tracing::debug!("Fetching provinces from {}", self.config.provinces_url);

        let provinces: Vec<SourceProvince> = self
            .post_form(&self.config.provinces_url, PROVINCE_LISTING_ID)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(provinces.into_iter().map(Into::into).collect())
    }

    async fn fetch_units(&self, province_id: i32) -> Result<Vec<UpsertAdminUnit>, SourceError> {
        tracing::debug!(
            "Fetching units for province {} from {}",
            province_id,
            self.config.units_url
        );

        let units: Vec<SourceUnit> = self
            .post_form(&self.config.units_url, province_id)
            .await?
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(units
            .into_iter()
            .map(|unit| unit.into_upsert(province_id))
            .collect())
    }
}
