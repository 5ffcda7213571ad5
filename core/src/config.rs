//! Client configuration.
//!
//! A `ClientConfig` is built once per client and never mutated afterwards.
//! It replaces the mutable header map a session object would otherwise carry.

/// Base URL, optional bearer token and default headers for one backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    bearer_token: Option<String>,
    default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: None,
            default_headers: Vec::new(),
        }
    }

    /// Add a default header. A later header with the same name replaces the
    /// earlier one.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.default_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a bearer token. Empty tokens are ignored.
    pub fn with_bearer_token(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Join the base URL with an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Default headers followed by the `Authorization` header, if any.
    pub fn effective_headers(&self) -> Vec<(String, String)> {
        let mut headers = self.default_headers.clone();
        if let Some(token) = &self.bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}
