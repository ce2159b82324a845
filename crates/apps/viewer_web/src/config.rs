use foundation::ParamField;

/// Where the viewer finds its service and its DOM elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Base URL of the rendering service, without a trailing path.
    pub service_url: String,
    pub canvas_id: String,
    /// Element whose text shows loading progress and errors.
    pub status_id: String,
    /// Inputs are looked up as `<prefix><wire key>`, e.g. `param-fieldOfView`.
    pub input_prefix: String,
    /// The "Load Panorama" control.
    pub trigger_id: String,
}

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            canvas_id: "panorama-canvas".to_string(),
            status_id: "panorama-status".to_string(),
            input_prefix: "param-".to_string(),
            trigger_id: "load-panorama".to_string(),
        }
    }
}

/// Optional values a page passes to `mount`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_url: Option<String>,
    pub canvas_id: Option<String>,
    pub status_id: Option<String>,
    pub input_prefix: Option<String>,
    pub trigger_id: Option<String>,
}

impl ViewerConfig {
    /// Defaults overridden by whichever values the page passed in.
    pub fn with_overrides(o: ConfigOverrides) -> Self {
        let d = Self::default();
        Self {
            service_url: non_empty(o.service_url).unwrap_or(d.service_url),
            canvas_id: non_empty(o.canvas_id).unwrap_or(d.canvas_id),
            status_id: non_empty(o.status_id).unwrap_or(d.status_id),
            input_prefix: non_empty(o.input_prefix).unwrap_or(d.input_prefix),
            trigger_id: non_empty(o.trigger_id).unwrap_or(d.trigger_id),
        }
    }

    pub fn input_id(&self, field: ParamField) -> String {
        format!("{}{}", self.input_prefix, field.key())
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
