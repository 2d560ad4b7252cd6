use apiver_core::{ApiVersion, RequestedApiVersion};
use http::header::{HeaderName, HeaderValue};
use http::request::Parts;
use http::{Method, Request};

/// Builder for the request head handed to descriptors and readers.
///
/// ```ignore
/// let parts = RequestBuilder::get("/users").api_version("2.0").parts();
/// ```
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
    resolved: Option<RequestedApiVersion>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            resolved: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query parameter (percent-encoded on build).
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Shortcut for `?api-version=<version>`.
    pub fn api_version(self, version: &str) -> Self {
        self.query("api-version", version)
    }

    /// Append a header. Panics on an invalid name or value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes()).expect("invalid header name");
        let value = HeaderValue::from_str(value).expect("invalid header value");
        self.headers.push((name, value));
        self
    }

    /// Store an already resolved version in the request extensions.
    pub fn resolved(mut self, version: Option<ApiVersion>) -> Self {
        self.resolved = Some(RequestedApiVersion(version));
        self
    }

    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    pub fn build(self) -> Request<()> {
        let uri = self.uri();
        let mut builder = Request::builder().method(self.method).uri(uri);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let mut request = builder.body(()).expect("invalid test request");
        if let Some(resolved) = self.resolved {
            request.extensions_mut().insert(resolved);
        }
        request
    }

    pub fn parts(self) -> Parts {
        self.build().into_parts().0
    }
}
