//! The query payload of a serverless tag URL.
//!
//! ```text
//! https://host/q?data=<url-safe base64>&enc=AES-GCM
//! ```
//!
//! `enc` is absent on legacy tags, which were sealed with XOR.

use crate::cipher::{CipherEnvelope, CipherMethod};

use super::ResolveError;

const DATA_PARAM: &str = "data";
const METHOD_PARAM: &str = "enc";

/// Envelope text and cipher marker carried by a serverless tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerlessPayload {
    pub method: CipherMethod,
    /// URL-safe base64 envelope.
    pub data: String,
}

impl ServerlessPayload {
    pub fn from_envelope(envelope: &CipherEnvelope) -> Self {
        Self {
            method: envelope.method,
            data: envelope.to_url_payload(),
        }
    }

    /// Parses a full tag URL, a bare query string, or a bare envelope token.
    ///
    /// Input is read as a query only when it carries a `data` or `enc`
    /// parameter, so a padded standard-base64 token stays a token. A bare
    /// token carries no marker and is treated as legacy XOR.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let input = input.trim();
        let query = input.split_once('?').map_or(input, |(_, query)| query);
        let query = query.split_once('#').map_or(query, |(query, _)| query);

        if query.is_empty() {
            return Err(ResolveError::MalformedRecord("empty tag payload".to_string()));
        }
        if !is_query(query) {
            return Ok(Self {
                method: CipherMethod::Xor,
                data: query.to_string(),
            });
        }

        let mut data = None;
        let mut marker = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some((DATA_PARAM, value)) => data = Some(value),
                Some((METHOD_PARAM, value)) => marker = Some(value),
                _ => {}
            }
        }

        let data = data
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ResolveError::MalformedRecord("missing data parameter".to_string()))?;

        Ok(Self {
            method: CipherMethod::from_marker(marker)?,
            data: data.to_string(),
        })
    }

    /// `data=...` plus `&enc=...` for authenticated methods.
    pub fn to_query(&self) -> String {
        match self.method {
            CipherMethod::Xor => format!("{}={}", DATA_PARAM, self.data),
            method => format!(
                "{}={}&{}={}",
                DATA_PARAM,
                self.data,
                METHOD_PARAM,
                method.marker()
            ),
        }
    }

    /// Full scan URL under `base`.
    pub fn url(&self, base: &str) -> String {
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}", base, separator, self.to_query())
    }

    pub fn envelope(&self) -> Result<CipherEnvelope, ResolveError> {
        Ok(CipherEnvelope::from_url_payload(self.method, &self.data)?)
    }
}

fn is_query(query: &str) -> bool {
    query.split('&').any(|pair| {
        matches!(
            pair.split_once('='),
            Some((DATA_PARAM, _)) | Some((METHOD_PARAM, _))
        )
    })
}
