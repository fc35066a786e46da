//! Production transport backed by `reqwest`'s blocking client.

use reqwest::blocking::multipart;
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};

use super::{Method, Request, Response, Transport};
use crate::error::Result;

/// Blocking HTTP transport that signs every request with the API key as
/// basic-auth username and a blank password.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        builder = builder.basic_auth(&self.api_key, Some(""));

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if request.files.is_empty() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        } else {
            // Uploads carry the JSON payload as a plain form field next to
            // the file parts.
            let mut form = multipart::Form::new();
            if let Some(body) = &request.body {
                form = form.text("data", body.to_string());
            }
            for part in &request.files {
                let file = multipart::Part::bytes(part.bytes.clone())
                    .file_name(part.filename.clone())
                    .mime_str(&part.mime)?;
                form = form.part(part.field.clone(), file);
            }
            builder = builder.multipart(form);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text()?;

        Ok(Response {
            status,
            content_type,
            retry_after,
            body,
        })
    }
}
