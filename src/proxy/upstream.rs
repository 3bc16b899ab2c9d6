use std::time::Duration;

use reqwest::{ Client, Method, RequestBuilder };
use url::Url;

use crate::{ config::GatewayConfig, errors::ProxyError };

/// Connection to the Attendance Service.
///
/// Holds no cookie store: the session cookie belongs to the browser and is
/// attached per request by the forwarder.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.service_url.clone(), config.upstream_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with already-resolved path segments appended.
    pub fn url_for(&self, segments: &[String]) -> Result<Url, ProxyError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ProxyError::InvalidUpstreamUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments.iter().map(String::as_str));
        }
        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }
}
