//! HTTP client for the email-sending service.

use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::upstream::ApiInfo;
use crate::upstream::BaseApi;
use crate::upstream::Mailer;
use crate::upstream::error::UpstreamError;

#[derive(Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

pub struct HttpMailer {
    pub base: BaseApi,
}

impl HttpMailer {
    pub fn new(api_url: &str, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let info = ApiInfo::new("Mailer", api_url, api_key);
        Ok(Self {
            base: BaseApi::new(info)?,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), UpstreamError> {
        debug!("Sending `{subject}` to {to} via {}", self.base.info.name);
        let payload = serde_json::to_string(&SendRequest { to, subject, body })?;
        let request = self
            .base
            .client()
            .post(self.base.url("/send"))
            .header(CONTENT_TYPE, "application/json")
            .body(payload);

        self.base.send("/send", request).await?;
        Ok(())
    }
}
