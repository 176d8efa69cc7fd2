use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    form::draft::FormDraft,
    registry::registry_model::{ActionCatalog, RegistryEntry},
    scan::scan_model::ScanRecord,
    transport::{
        error::TransportError,
        transport::{CatalogResponse, Endpoint, RegistryResponse, SubmitKind, SubmitResponse, Transport},
    },
};

pub const DEFAULT_BACKEND: &str = "http://localhost:6680";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Blocking HTTP transport against a Mopidy instance running Pummeluff.
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Every request is bounded by `timeout`; a hung backend shows up as a
    /// `TransportError::Request` instead of freezing the console.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, TransportError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .map_err(|e| TransportError::Request { endpoint, source: e })?;

        let (status, body) = read_body(endpoint, response)?;
        if !(200..300).contains(&status) {
            return Err(TransportError::Status { endpoint, status, body });
        }
        decode(endpoint, &body)
    }
}

impl Transport for HttpTransport {
    fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, TransportError> {
        let response: RegistryResponse = self.get(Endpoint::Registry)?;
        Ok(response.tags)
    }

    fn fetch_catalog(&self) -> Result<ActionCatalog, TransportError> {
        let response: CatalogResponse = self.get(Endpoint::Actions)?;
        Ok(ActionCatalog::from(response.actions))
    }

    fn fetch_latest(&self) -> Result<ScanRecord, TransportError> {
        self.get(Endpoint::Latest)
    }

    fn submit(&self, kind: SubmitKind, draft: &FormDraft) -> Result<SubmitResponse, TransportError> {
        let endpoint = kind.endpoint();
        let response = self
            .client
            .post(self.url(endpoint))
            .form(&draft.form_fields())
            .send()
            .map_err(|e| TransportError::Request { endpoint, source: e })?;

        let (status, body) = read_body(endpoint, response)?;
        if (200..300).contains(&status) {
            return decode(endpoint, &body);
        }

        // The backend reports validation failures as HTTP 400 with a JSON
        // body; only a status without such a body is a transport failure.
        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) if !parsed.success => Ok(parsed),
            _ => Err(TransportError::Status { endpoint, status, body }),
        }
    }
}

fn read_body(endpoint: Endpoint, response: Response) -> Result<(u16, String), TransportError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|e| TransportError::Request { endpoint, source: e })?;
    Ok((status, body))
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Decode { endpoint, source: e })
}
