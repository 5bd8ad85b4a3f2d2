// src/core/net.rs
// Blocking HTTPS GET against the venues API.

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::consts::USER_AGENT;
use crate::config::options::ApiOptions;
use crate::error::FetchError;
use crate::types::SearchQuery;

/// Keep error bodies short in logs and errors.
const MAX_ERROR_BODY: usize = 300;

/// The remote API as a black box: two endpoints, raw response bodies out.
///
/// Parsing lives in `specs`, so a body that fails to parse is retried the
/// same way a dropped connection is.
pub trait VenueApi: Send + Sync {
    /// `venues/search` around `query.center`.
    fn search(&self, query: &SearchQuery) -> Result<String, FetchError>;

    /// `venues/categories`, the whole taxonomy.
    fn categories(&self) -> Result<String, FetchError>;
}

pub struct HttpApi {
    client: Client,
    opts: ApiOptions,
}

impl HttpApi {
    pub fn new(opts: ApiOptions) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(opts.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, opts })
    }

    pub fn options(&self) -> &ApiOptions {
        &self.opts
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.opts.base_url.trim_end_matches('/'), path)
    }

    fn http_get(&self, path: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
        let url = self.endpoint(path);
        debug!(%url, ?params, "GET");

        let auth = [
            ("client_id", self.opts.client_id.as_str()),
            ("client_secret", self.opts.client_secret.as_str()),
            ("v", self.opts.version.as_str()),
        ];
        // reqwest errors print the request URL, which carries the secret.
        let resp = self
            .client
            .get(&url)
            .query(&auth)
            .query(params)
            .send()
            .map_err(|e| FetchError::Network(e.without_url()))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| FetchError::Network(e.without_url()))?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: clip(&body, MAX_ERROR_BODY),
            });
        }
        Ok(body)
    }
}

impl VenueApi for HttpApi {
    fn search(&self, query: &SearchQuery) -> Result<String, FetchError> {
        self.http_get("venues/search", &search_params(query))
    }

    fn categories(&self) -> Result<String, FetchError> {
        self.http_get("venues/categories", &[])
    }
}

fn search_params(q: &SearchQuery) -> Vec<(&'static str, String)> {
    vec![
        ("ll", format!("{},{}", q.center.lat, q.center.lng)),
        ("radius", q.radius_m.to_string()),
        ("limit", q.limit.to_string()),
        ("categoryId", q.category_id.clone()),
    ]
}

fn clip(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::geo::LatLng;

    #[test]
    fn search_params_carry_query() {
        let q = SearchQuery {
            center: LatLng { lat: 40.5, lng: -73.25 },
            radius_m: 1250.5,
            category_id: "4d4b7105d754a06374d81259".into(),
            limit: 50,
        };
        let p = search_params(&q);
        assert_eq!(p[0], ("ll", "40.5,-73.25".to_string()));
        assert_eq!(p[1], ("radius", "1250.5".to_string()));
        assert_eq!(p[2], ("limit", "50".to_string()));
        assert_eq!(p[3].1, "4d4b7105d754a06374d81259");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let mut opts = ApiOptions::new("id", "secret");
        opts.base_url = "http://localhost:9/v2/".into();
        let api = HttpApi::new(opts).unwrap();
        assert_eq!(api.endpoint("venues/search"), "http://localhost:9/v2/venues/search");
    }

    #[test]
    fn network_errors_keep_the_secret_out() {
        let mut opts = ApiOptions::new("id", "hunter2-secret");
        opts.base_url = "http://127.0.0.1:1/v2".into();
        opts.timeout = Duration::from_secs(5);
        let api = HttpApi::new(opts).unwrap();
        let q = SearchQuery {
            center: LatLng { lat: 1.0, lng: 2.0 },
            radius_m: 100.0,
            category_id: "cat".into(),
            limit: 50,
        };

        let err = api.search(&q).unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        let text = err.to_string();
        assert!(!text.contains("hunter2-secret"), "{text}");
        assert!(!text.contains("client_secret"), "{text}");
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("héllo", 2), "hé…");
        assert_eq!(clip("hi", 5), "hi");
    }
}
