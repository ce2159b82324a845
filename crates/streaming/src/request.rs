use foundation::{ParamField, ParameterSnapshot};

/// Rendering service endpoints.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Service-side default viewpoint; takes no query parameters.
    DefaultImage,
    ComputePanorama,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::DefaultImage => "/getImage",
            Endpoint::ComputePanorama => "/computePanorama",
        }
    }
}

/// Endpoint plus ordered query pairs; fully determines one service request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub query: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    /// Path with the query string appended, e.g. `/computePanorama?longitude=10&...`.
    pub fn path_and_query(&self) -> String {
        let mut out = self.endpoint.path().to_string();
        for (i, (key, value)) in self.query.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }

    /// Absolute URL against a service base such as `http://localhost:8080`.
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path_and_query())
    }
}

/// Request for the service's default panorama.
pub fn default_image() -> RequestDescriptor {
    RequestDescriptor {
        endpoint: Endpoint::DefaultImage,
        query: Vec::new(),
    }
}

/// Encode a validated snapshot as a compute request.
///
/// Every field appears exactly once, keyed by its wire name, in
/// [`ParamField::ALL`] order. Values are integers so nothing needs escaping.
pub fn encode(snapshot: &ParameterSnapshot) -> RequestDescriptor {
    RequestDescriptor {
        endpoint: Endpoint::ComputePanorama,
        query: ParamField::ALL
            .into_iter()
            .map(|field| (field.key(), snapshot.value_string(field)))
            .collect(),
    }
}
