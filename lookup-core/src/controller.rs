//! Binds a location form to the request and render components.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::{
    LocationQuery, LookupError, WeatherProvider,
    render::{DisplayRegion, Renderer},
};

/// The text input a submission reads its query from.
pub trait InputField {
    fn value(&self) -> &str;

    fn clear(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl InputField for TextInput {
    fn value(&self) -> &str {
        &self.value
    }

    fn clear(&mut self) {
        self.value.clear();
    }
}

/// An accepted query, tagged with its position in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub query: LocationQuery,
    pub seq: u64,
}

/// What ended up in the display region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Weather,
    NotFound,
    RequestFailed(LookupError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was blank; nothing was requested or rendered.
    Skipped,
    Rendered(Rendered),
    /// A newer submission was accepted before this response arrived.
    Stale,
}

/// Handles form submissions against one display region.
///
/// Overlapping submissions are not cancelled. Each accepted submission gets a
/// sequence number and its response is only rendered while that number is
/// still the latest one, so a slow earlier response never overwrites a later
/// one.
#[derive(Debug)]
pub struct SubmissionController<P, R> {
    provider: P,
    renderer: Renderer,
    region: Mutex<R>,
    latest: AtomicU64,
}

impl<P, R> SubmissionController<P, R>
where
    P: WeatherProvider,
    R: DisplayRegion,
{
    pub fn new(provider: P, renderer: Renderer, region: R) -> Self {
        Self { provider, renderer, region: Mutex::new(region), latest: AtomicU64::new(0) }
    }

    /// Read and clear the input.
    ///
    /// Returns `None` and leaves the input untouched when it is blank.
    pub fn accept<I>(&self, input: &mut I) -> Option<Submission>
    where
        I: InputField + ?Sized,
    {
        let Ok(query) = LocationQuery::parse(input.value()) else {
            debug!("Ignoring blank submission");
            return None;
        };

        input.clear();

        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%query, seq, "Accepted submission");
        Some(Submission { query, seq })
    }

    /// Run the lookup for `submission` and render its outcome.
    pub async fn resolve(&self, submission: Submission) -> SubmitOutcome {
        let result = self.provider.fetch_weather(&submission.query).await;

        let mut region = self.region.lock().await;
        if submission.seq != self.latest.load(Ordering::SeqCst) {
            debug!(seq = submission.seq, "Discarding stale response");
            return SubmitOutcome::Stale;
        }

        let rendered = match result {
            Ok(record) => {
                info!(place = %record.place, "Rendering weather");
                self.renderer.render_success(&mut *region, &record);
                Rendered::Weather
            }
            Err(LookupError::NotFound) => {
                info!(query = %submission.query, "Location not found");
                self.renderer.render_not_found(&mut *region);
                Rendered::NotFound
            }
            Err(err) => {
                self.renderer.render_request_failed(&mut *region, &err);
                Rendered::RequestFailed(err)
            }
        };

        SubmitOutcome::Rendered(rendered)
    }

    /// Handle one form submission end to end.
    pub async fn submit<I>(&self, input: &mut I) -> SubmitOutcome
    where
        I: InputField + ?Sized,
    {
        match self.accept(input) {
            Some(submission) => self.resolve(submission).await,
            None => SubmitOutcome::Skipped,
        }
    }

    /// Lock the display region, e.g. to print it.
    pub async fn region(&self) -> MutexGuard<'_, R> {
        self.region.lock().await
    }

    pub fn into_region(self) -> R {
        self.region.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use chrono::DateTime;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        WeatherRecord,
        model::Coordinates,
        render::{NOT_FOUND_MESSAGE, Node, REQUEST_FAILED_MESSAGE, Region},
    };

    fn record(place: &str) -> WeatherRecord {
        WeatherRecord {
            coordinates: Coordinates { lat: 48.85, lon: 2.35 },
            description: "clear sky".into(),
            icon_url: "https://openweathermap.org/img/wn/01d@2x.png".into(),
            current_temp: 68.5,
            feels_like_temp: 66.0,
            place: place.into(),
            observed_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        }
    }

    /// Answers from a fixed table; queries with a gate wait until it is notified.
    #[derive(Debug, Default)]
    struct FakeProvider {
        answers: HashMap<String, Result<WeatherRecord, LookupError>>,
        gates: HashMap<String, Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn answer(mut self, query: &str, answer: Result<WeatherRecord, LookupError>) -> Self {
            self.answers.insert(query.to_string(), answer);
            self
        }

        fn gated(mut self, query: &str) -> (Self, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            self.gates.insert(query.to_string(), gate.clone());
            (self, gate)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_weather(
            &self,
            query: &LocationQuery,
        ) -> Result<WeatherRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = self.gates.get(query.as_str()) {
                gate.notified().await;
            }
            self.answers
                .get(query.as_str())
                .cloned()
                .unwrap_or_else(|| Err(LookupError::RequestFailed(format!("no answer for {query}"))))
        }
    }

    fn controller(provider: FakeProvider) -> SubmissionController<FakeProvider, Region> {
        SubmissionController::new(provider, Renderer::default(), Region::new())
    }

    #[tokio::test]
    async fn blank_input_is_skipped_without_request() {
        let ctl = controller(FakeProvider::default());
        let mut input = TextInput::new("   \t ");

        assert_eq!(ctl.submit(&mut input).await, SubmitOutcome::Skipped);
        assert_eq!(input.value(), "   \t ");
        assert_eq!(ctl.provider.calls.load(Ordering::SeqCst), 0);
        assert!(ctl.region().await.is_empty());
    }

    #[tokio::test]
    async fn blank_input_leaves_previous_output_untouched() {
        let provider = FakeProvider::default().answer("Paris, FR", Ok(record("Paris, FR")));
        let ctl = controller(provider);

        let mut input = TextInput::new("Paris, FR");
        ctl.submit(&mut input).await;
        let before = ctl.region().await.clone();

        input.set_value("  ");
        assert_eq!(ctl.submit(&mut input).await, SubmitOutcome::Skipped);
        assert_eq!(*ctl.region().await, before);
    }

    #[tokio::test]
    async fn success_renders_weather_and_clears_input() {
        let provider = FakeProvider::default().answer("Paris, FR", Ok(record("Paris, FR")));
        let ctl = controller(provider);
        let mut input = TextInput::new("  Paris, FR ");

        let outcome = ctl.submit(&mut input).await;

        assert_eq!(outcome, SubmitOutcome::Rendered(Rendered::Weather));
        assert_eq!(input.value(), "");
        let region = ctl.region().await;
        assert_eq!(region.nodes()[0], Node::Heading("Paris, FR".into()));
        assert_eq!(region.nodes().len(), 9);
    }

    #[tokio::test]
    async fn query_without_country_is_normalized() {
        let provider = FakeProvider::default().answer("Austin,us", Ok(record("Austin, US")));
        let ctl = controller(provider);
        let mut input = TextInput::new("Austin");

        let submission = ctl.accept(&mut input).expect("accepted");
        assert_eq!(submission.query.as_str(), "Austin,us");
        assert_eq!(ctl.resolve(submission).await, SubmitOutcome::Rendered(Rendered::Weather));
    }

    #[tokio::test]
    async fn not_found_renders_single_heading() {
        let provider = FakeProvider::default().answer("Atlantis,us", Err(LookupError::NotFound));
        let ctl = controller(provider);
        let mut input = TextInput::new("Atlantis");

        assert_eq!(ctl.submit(&mut input).await, SubmitOutcome::Rendered(Rendered::NotFound));
        assert_eq!(ctl.region().await.nodes(), &[Node::Heading(NOT_FOUND_MESSAGE.into())]);
    }

    #[tokio::test]
    async fn request_failure_is_surfaced_separately() {
        let err = LookupError::RequestFailed("timed out".into());
        let provider = FakeProvider::default().answer("Oslo, NO", Err(err.clone()));
        let ctl = controller(provider);
        let mut input = TextInput::new("Oslo, NO");

        assert_eq!(
            ctl.submit(&mut input).await,
            SubmitOutcome::Rendered(Rendered::RequestFailed(err))
        );
        assert_eq!(ctl.region().await.nodes()[0], Node::Heading(REQUEST_FAILED_MESSAGE.into()));
        assert_eq!(input.value(), "");
    }

    #[tokio::test]
    async fn input_is_cleared_before_response_arrives() {
        let (provider, gate) = FakeProvider::default()
            .answer("Paris, FR", Ok(record("Paris, FR")))
            .gated("Paris, FR");
        let ctl = controller(provider);
        let mut input = TextInput::new("Paris, FR");

        let submission = ctl.accept(&mut input).expect("accepted");
        assert_eq!(input.value(), "");

        gate.notify_one();
        assert_eq!(ctl.resolve(submission).await, SubmitOutcome::Rendered(Rendered::Weather));
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer_one() {
        let (provider, slow_gate) = FakeProvider::default()
            .answer("Paris, FR", Ok(record("Paris, FR")))
            .answer("Berlin, DE", Ok(record("Berlin, DE")))
            .gated("Paris, FR");
        let ctl = controller(provider);
        let mut input = TextInput::new("Paris, FR");

        let first = ctl.accept(&mut input).expect("accepted");
        input.set_value("Berlin, DE");
        let second = ctl.accept(&mut input).expect("accepted");
        assert!(second.seq > first.seq);

        let (first_outcome, second_outcome) = tokio::join!(ctl.resolve(first), async {
            let outcome = ctl.resolve(second).await;
            slow_gate.notify_one();
            outcome
        });

        assert_eq!(second_outcome, SubmitOutcome::Rendered(Rendered::Weather));
        assert_eq!(first_outcome, SubmitOutcome::Stale);
        assert_eq!(ctl.into_region().nodes()[0], Node::Heading("Berlin, DE".into()));
    }
}
