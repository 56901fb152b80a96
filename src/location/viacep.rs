//! ViaCEP location provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{Instrument, debug, info_span, warn};

use super::LocationProvider;
use crate::{Result, TemperatureError, TraceContext, http_client, models::Location};

const ORIGIN: &str = "viacep_provider.fetch_location_by_cep";

/// ViaCEP API response
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    cep: String,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    /// ViaCEP's not-found convention; older deployments send `true`, newer `"true"`
    #[serde(default)]
    erro: Option<ErrorFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorFlag {
    Bool(bool),
    Text(String),
}

impl ErrorFlag {
    fn is_set(&self) -> bool {
        match self {
            ErrorFlag::Bool(flag) => *flag,
            ErrorFlag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

impl From<ViaCepResponse> for Location {
    fn from(value: ViaCepResponse) -> Self {
        Self {
            cep: value.cep,
            state: value.uf,
            city: value.localidade,
            neighborhood: value.bairro,
            street: value.logradouro,
        }
    }
}

/// Location provider backed by the ViaCEP HTTP API
#[derive(Debug, Clone)]
pub struct ViaCepLocationProvider {
    client: Client,
    base_url: String,
}

impl ViaCepLocationProvider {
    /// Create a provider for `base_url` (e.g. `https://viacep.com.br/ws/`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self::with_client(base_url, http_client::build(timeout)?))
    }

    /// Create a provider reusing an existing client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { client, base_url }
    }

    fn url_for(&self, cep: &str) -> String {
        format!("{}{}/json", self.base_url, urlencoding::encode(cep))
    }

    async fn fetch(&self, ctx: &TraceContext, cep: &str) -> Result<Location> {
        let url = self.url_for(cep);
        debug!("ViaCEP request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(ctx.headers())
            .send()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "ViaCEP status not ok");
            return Err(TemperatureError::upstream_status(ORIGIN, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;
        let payload: ViaCepResponse =
            serde_json::from_slice(&body).map_err(|e| TemperatureError::decode(ORIGIN, e))?;

        if payload.erro.as_ref().is_some_and(ErrorFlag::is_set) {
            debug!("ViaCEP has no record for {}", cep);
            return Err(TemperatureError::location_not_found(ORIGIN));
        }

        let location = Location::from(payload);
        debug!(city = %location.city, state = %location.state, "Resolved CEP");
        Ok(location)
    }
}

#[async_trait]
impl LocationProvider for ViaCepLocationProvider {
    async fn fetch_location_by_cep(&self, ctx: &TraceContext, cep: &str) -> Result<Location> {
        let span = info_span!("viacep_provider.fetch_location_by_cep", cep = %cep);
        let ctx = ctx.child(&span);
        self.fetch(&ctx, cep).instrument(span).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::trace_context::TRACEPARENT;
    use http::HeaderMap;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn provider(server: &MockServer) -> ViaCepLocationProvider {
        ViaCepLocationProvider::new(format!("{}/ws/", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_url_escapes_cep_and_adds_slash() {
        let provider = ViaCepLocationProvider::with_client("http://viacep.test/ws", Client::new());
        assert_eq!(provider.url_for("01310-100"), "http://viacep.test/ws/01310-100/json");
        assert_eq!(provider.url_for("a b"), "http://viacep.test/ws/a%20b/json");
    }

    #[tokio::test]
    async fn test_fetch_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws/01310100/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cep": "01310-100",
                "logradouro": "Avenida Paulista",
                "complemento": "de 612 a 1510 - lado par",
                "bairro": "Bela Vista",
                "localidade": "São Paulo",
                "uf": "SP",
                "ibge": "3550308",
                "gia": "1004",
                "ddd": "11",
                "siafi": "7107"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let location = provider(&server)
            .fetch_location_by_cep(&TraceContext::root(), "01310100")
            .await
            .unwrap();

        assert_eq!(
            location,
            Location {
                cep: "01310-100".to_string(),
                state: "SP".to_string(),
                city: "São Paulo".to_string(),
                neighborhood: "Bela Vista".to_string(),
                street: "Avenida Paulista".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_erro_flag_is_location_not_found() {
        for body in [
            serde_json::json!({ "erro": true }),
            serde_json::json!({ "erro": "true" }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/ws/99999999/json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let err = provider(&server)
                .fetch_location_by_cep(&TraceContext::root(), "99999999")
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::LocationNotFound);
        }
    }

    #[tokio::test]
    async fn test_non_200_is_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch_location_by_cep(&TraceContext::root(), "01310100")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TemperatureError::UpstreamStatus { status: 400, .. }
        ));
        assert!(err.to_string().starts_with(ORIGIN));
    }

    #[tokio::test]
    async fn test_bad_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch_location_by_cep(&TraceContext::root(), "01310100")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        // Bind then release a port so nothing is listening on it.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let provider = ViaCepLocationProvider::new(
            format!("http://127.0.0.1:{port}/ws/"),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider
            .fetch_location_by_cep(&TraceContext::root(), "01310100")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_forwards_traceparent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header(TRACEPARENT, PARENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "localidade": "Recife" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut inbound = HeaderMap::new();
        inbound.insert(TRACEPARENT, PARENT.parse().unwrap());
        let ctx = TraceContext::from_headers(&inbound);

        let location = provider(&server)
            .fetch_location_by_cep(&ctx, "50030230")
            .await
            .unwrap();
        assert_eq!(location.city, "Recife");
    }
}
