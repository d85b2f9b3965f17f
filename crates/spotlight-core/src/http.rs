//! Blocking HTTP GET on top of libcurl.
//!
//! One `Easy` handle per request, run on the calling worker thread. Both the
//! discovery request and the image download go through `HttpClient::get`.

use crate::config::SpotlightConfig;
use crate::error::TransferError;
use std::time::Duration;

/// Status and full body of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Shared request settings; cheap to clone into each fetcher.
#[derive(Debug, Clone)]
pub struct HttpClient {
    user_agent: String,
    connect_timeout: Duration,
    timeout: Duration,
    strict_status: bool,
}

impl HttpClient {
    pub fn new(cfg: &SpotlightConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            strict_status: cfg.strict_status,
        }
    }

    pub fn strict_status(&self) -> bool {
        self.strict_status
    }

    /// GET `url` and read the whole body into memory.
    ///
    /// An `Accept-Encoding` entry in `headers` is handed to curl so the body is
    /// decoded transparently. Non-2xx is returned as a normal response unless
    /// strict status handling is on, in which case it is `TransferError::Status`.
    pub fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransferError> {
        let curl_err = |source: curl::Error| TransferError::Curl {
            url: url.to_string(),
            source,
        };

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(10).map_err(curl_err)?;
        easy.useragent(&self.user_agent).map_err(curl_err)?;
        easy.connect_timeout(self.connect_timeout).map_err(curl_err)?;
        easy.timeout(self.timeout).map_err(curl_err)?;

        let mut list = curl::easy::List::new();
        let mut custom = false;
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("accept-encoding") {
                easy.accept_encoding(value).map_err(curl_err)?;
            } else {
                list.append(&format!("{}: {}", name.trim(), value.trim()))
                    .map_err(curl_err)?;
                custom = true;
            }
        }
        if custom {
            easy.http_headers(list).map_err(curl_err)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let status = easy.response_code().map_err(curl_err)?;
        if self.strict_status && !(200..300).contains(&status) {
            return Err(TransferError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(HttpResponse { status, body })
    }
}
