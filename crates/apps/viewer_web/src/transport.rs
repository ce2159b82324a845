use gloo_net::http::Request;
use streaming::{HttpResponse, HttpTransport};

/// Browser `fetch` via gloo-net.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooTransport;

impl HttpTransport for GlooTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}
