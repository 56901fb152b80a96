//! Temperature by CEP (service B)

use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use crate::{
    ErrorKind, LocationProvider, Result, TemperatureError, TemperatureProvider, TraceContext,
    models::TemperatureReport,
};

const ORIGIN: &str = "get_temperature_from_cep_use_case.execute";

/// Resolves a CEP to its city, then the city to a three-scale report
///
/// The two lookups run strictly in sequence and are never retried. A
/// location not-found becomes a generic not-found; every other failure
/// passes through with a breadcrumb.
#[derive(Clone)]
pub struct GetTemperatureFromCepUseCase {
    location_provider: Arc<dyn LocationProvider>,
    temperature_provider: Arc<dyn TemperatureProvider>,
}

impl GetTemperatureFromCepUseCase {
    pub fn new(
        location_provider: Arc<dyn LocationProvider>,
        temperature_provider: Arc<dyn TemperatureProvider>,
    ) -> Self {
        Self {
            location_provider,
            temperature_provider,
        }
    }

    pub async fn execute(&self, ctx: &TraceContext, cep: &str) -> Result<TemperatureReport> {
        let span = info_span!("get_temperature_from_cep_use_case.execute", cep = %cep);
        let ctx = ctx.child(&span);
        self.run(&ctx, cep).instrument(span).await
    }

    async fn run(&self, ctx: &TraceContext, cep: &str) -> Result<TemperatureReport> {
        let location = self
            .location_provider
            .fetch_location_by_cep(ctx, cep)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::LocationNotFound => TemperatureError::not_found_from(ORIGIN, err),
                _ => err.context(ORIGIN),
            })?;

        let sample = self
            .temperature_provider
            .fetch_temperature_by_city(ctx, &location.city)
            .await
            .map_err(|err| err.context(ORIGIN))?;

        debug!(city = %location.city, celsius = sample.celsius, "Temperature resolved");
        Ok(TemperatureReport::from_celsius(location.city, sample.celsius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, TemperatureSample};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum LocationOutcome {
        City(&'static str),
        NotFound,
        Status(u16),
    }

    struct FakeLocation {
        outcome: LocationOutcome,
        calls: AtomicUsize,
    }

    impl FakeLocation {
        fn new(outcome: LocationOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LocationProvider for FakeLocation {
        async fn fetch_location_by_cep(&self, _ctx: &TraceContext, cep: &str) -> Result<Location> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                LocationOutcome::City(city) => Ok(Location::with_city(cep, city)),
                LocationOutcome::NotFound => Err(TemperatureError::location_not_found("fake")),
                LocationOutcome::Status(status) => {
                    Err(TemperatureError::upstream_status("fake", status))
                }
            }
        }
    }

    struct FakeWeather {
        celsius: Option<f64>,
        cities: Mutex<Vec<String>>,
    }

    impl FakeWeather {
        fn new(celsius: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                celsius,
                cities: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.cities.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TemperatureProvider for FakeWeather {
        async fn fetch_temperature_by_city(
            &self,
            _ctx: &TraceContext,
            city: &str,
        ) -> Result<TemperatureSample> {
            self.cities.lock().unwrap().push(city.to_string());
            match self.celsius {
                // Deliberately inconsistent Fahrenheit: only Celsius may be used.
                Some(celsius) => Ok(TemperatureSample {
                    celsius,
                    fahrenheit: -1.0,
                }),
                None => Err(TemperatureError::upstream_status("fake_weather", 400)),
            }
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let location = FakeLocation::new(LocationOutcome::City("São Paulo"));
        let weather = FakeWeather::new(Some(25.0));
        let use_case = GetTemperatureFromCepUseCase::new(location.clone(), weather.clone());

        let report = use_case
            .execute(&TraceContext::root(), "12345678")
            .await
            .unwrap();

        assert_eq!(report.city, "São Paulo");
        assert_eq!(report.celsius_text(), "25.00");
        assert_eq!(report.fahrenheit_text(), "77.00");
        assert_eq!(report.kelvin_text(), "298.00");
        assert_eq!(location.calls.load(Ordering::SeqCst), 1);
        assert_eq!(weather.calls(), vec!["São Paulo".to_string()]);
    }

    #[tokio::test]
    async fn test_execute_location_not_found() {
        let location = FakeLocation::new(LocationOutcome::NotFound);
        let weather = FakeWeather::new(Some(25.0));
        let use_case = GetTemperatureFromCepUseCase::new(location.clone(), weather.clone());

        let err = use_case
            .execute(&TraceContext::root(), "12345678")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with(ORIGIN));
        assert!(err.to_string().contains("original: fake: cep not found"));
        assert_eq!(location.calls.load(Ordering::SeqCst), 1);
        assert!(weather.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execute_location_error_passes_through() {
        let location = FakeLocation::new(LocationOutcome::Status(503));
        let weather = FakeWeather::new(Some(25.0));
        let use_case = GetTemperatureFromCepUseCase::new(location, weather.clone());

        let err = use_case
            .execute(&TraceContext::root(), "12345678")
            .await
            .unwrap_err();

        assert!(matches!(
            err.root(),
            TemperatureError::UpstreamStatus { status: 503, .. }
        ));
        assert!(weather.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execute_weather_error_is_not_reclassified() {
        let location = FakeLocation::new(LocationOutcome::City("São Paulo"));
        let weather = FakeWeather::new(None);
        let use_case = GetTemperatureFromCepUseCase::new(location, weather.clone());

        let err = use_case
            .execute(&TraceContext::root(), "12345678")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamStatus);
        assert!(!err.is_not_found());
        assert!(matches!(
            err.root(),
            TemperatureError::UpstreamStatus {
                origin: "fake_weather",
                status: 400
            }
        ));
        assert_eq!(weather.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_negative_temperature() {
        let use_case = GetTemperatureFromCepUseCase::new(
            FakeLocation::new(LocationOutcome::City("Urupema")),
            FakeWeather::new(Some(-5.0)),
        );

        let report = use_case
            .execute(&TraceContext::root(), "88625000")
            .await
            .unwrap();

        assert_eq!(report.celsius_text(), "-5.00");
        assert_eq!(report.fahrenheit_text(), "23.00");
        assert_eq!(report.kelvin_text(), "268.00");
    }
}
