//! The live search session: debounced evaluation, address lookups and the
//! published result stream.
//!
//! Every input change bumps a generation counter and (re)starts a single
//! debounce task. When the task fires it re-checks the generation under the
//! session lock, so a superseded evaluation can never publish.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use foodtruck_core::{
    apply_filters, AppConfig, BoundingBox, Coordinate, Geocoder, RadiusFilter, RadiusLimits,
    SearchQuery, Vendor, WorkingSet,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::GeocodeFailure;
use crate::snapshot::{ResultStatus, SearchSnapshot};

/// Tunables for one [`SearchSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub bounding_box: BoundingBox,
    /// Initial viewport center.
    pub map_center: Coordinate,
    pub radius: RadiusLimits,
    /// Debounce while no reference point is set.
    pub text_debounce: Duration,
    /// Debounce while a reference point is set.
    pub radius_debounce: Duration,
    /// Upper bound on one address search, retries included.
    pub geocode_timeout: Duration,
}

impl SessionConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            bounding_box: config.bounding_box,
            map_center: config.map_center,
            radius: config.radius,
            text_debounce: Duration::from_millis(config.text_debounce_ms),
            radius_debounce: Duration::from_millis(config.radius_debounce_ms),
            geocode_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::san_francisco(),
            map_center: Coordinate::new(37.7749, -122.4194),
            radius: RadiusLimits::default(),
            text_debounce: Duration::ZERO,
            radius_debounce: Duration::from_millis(500),
            geocode_timeout: Duration::from_secs(30),
        }
    }
}

/// What happened to an address search that got a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressOutcome {
    /// Point installed inside the region; a radius search is scheduled.
    Scheduled(Coordinate),
    /// Point installed outside the region; `NoMatches` was published and
    /// later evaluations match on text only.
    OutOfRegion(Coordinate),
    /// A newer address search (or a manual reference change) was issued
    /// while this one was in flight, so its response was dropped.
    Superseded,
}

struct State {
    working_set: Arc<WorkingSet>,
    query: SearchQuery,
    reference: Option<Coordinate>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    geocode_seq: u64,
    evaluations: u64,
}

struct Inner {
    id: Uuid,
    config: SessionConfig,
    state: Mutex<State>,
    results: watch::Sender<SearchSnapshot>,
}

/// Handle to one user's search session. Clones share the same session.
///
/// Input methods are synchronous and return immediately; results arrive
/// through [`SearchSession::subscribe`]. Debounced evaluations are spawned on
/// the ambient Tokio runtime. Outside a runtime they run inline.
#[derive(Clone)]
pub struct SearchSession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// A session over an empty working set with no query and no reference
    /// point.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let query = SearchQuery::new(&config.radius);
        let (results, _) =
            watch::channel(SearchSnapshot::initial(query.clone(), config.map_center));
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "search session created");

        Self {
            inner: Arc::new(Inner {
                id,
                config,
                state: Mutex::new(State {
                    working_set: Arc::new(WorkingSet::empty()),
                    query,
                    reference: None,
                    generation: 0,
                    pending: None,
                    geocode_seq: 0,
                    evaluations: 0,
                }),
                results,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Installs a freshly fetched working set and re-runs the current query
    /// against it right away.
    pub fn replace_working_set(&self, working_set: impl Into<Arc<WorkingSet>>) {
        let working_set = working_set.into();
        let mut state = self.lock();
        tracing::info!(
            session = %self.inner.id,
            vendors = working_set.len(),
            "working set replaced"
        );
        state.working_set = working_set;
        self.evaluate_now(&mut state);
    }

    #[must_use]
    pub fn working_set(&self) -> Arc<WorkingSet> {
        Arc::clone(&self.lock().working_set)
    }

    /// Sets the query text and schedules a debounced evaluation.
    pub fn set_query(&self, text: impl Into<String>) {
        let mut state = self.lock();
        state.query.text = text.into();
        self.schedule(&mut state);
    }

    /// Sets the search radius, clamped to the configured range, and
    /// schedules a debounced evaluation. Returns the radius actually used.
    pub fn set_radius(&self, miles: f64) -> f64 {
        let mut state = self.lock();
        let clamped = self.inner.config.radius.clamp(miles);
        state.query.radius_miles = clamped;
        self.schedule(&mut state);
        clamped
    }

    /// Geocodes `address` and, on success, makes it the reference point.
    ///
    /// Responses are tagged with a sequence number; if another address
    /// search or reference change was issued in the meantime the response is
    /// dropped and [`AddressOutcome::Superseded`] returned.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodeFailure`] when the address cannot be resolved, the
    /// provider fails, or the lookup exceeds the configured timeout. A
    /// `SearchFailed` snapshot is published and the previous reference point
    /// and results are kept.
    pub async fn submit_address<G: Geocoder>(
        &self,
        geocoder: &G,
        address: &str,
    ) -> Result<AddressOutcome, GeocodeFailure> {
        let seq = {
            let mut state = self.lock();
            state.geocode_seq += 1;
            state.geocode_seq
        };
        tracing::debug!(session = %self.inner.id, seq, address, "geocoding address");

        let timeout = self.inner.config.geocode_timeout;
        let response = tokio::time::timeout(timeout, geocoder.geocode(address)).await;

        let mut state = self.lock();
        if state.geocode_seq != seq {
            tracing::debug!(
                session = %self.inner.id,
                seq,
                latest = state.geocode_seq,
                "discarding stale geocode response"
            );
            return Ok(AddressOutcome::Superseded);
        }

        let failure = match response.map(|found| found.map(|p| p.filter(Coordinate::is_finite))) {
            Ok(Ok(Some(point))) => return Ok(self.install_reference(&mut state, point)),
            Ok(Ok(None)) => GeocodeFailure::NotFound(address.trim().to_owned()),
            Ok(Err(err)) => GeocodeFailure::Provider(err.to_string()),
            Err(_) => GeocodeFailure::TimedOut(timeout),
        };
        tracing::warn!(session = %self.inner.id, error = %failure, "address search failed");
        let reason = failure.to_string();
        self.inner
            .results
            .send_modify(|snap| snap.status = ResultStatus::SearchFailed { reason });
        Err(failure)
    }

    /// Installs `point` as the reference point directly, superseding any
    /// address search still in flight.
    pub fn set_reference_point(&self, point: Coordinate) -> AddressOutcome {
        let mut state = self.lock();
        state.geocode_seq += 1;
        self.install_reference(&mut state, point)
    }

    /// Drops the reference point and returns to text-only matching. Returns
    /// `false` when none was set.
    pub fn clear_reference_point(&self) -> bool {
        let mut state = self.lock();
        state.geocode_seq += 1;
        if state.reference.take().is_none() {
            return false;
        }
        tracing::debug!(session = %self.inner.id, "reference point cleared");
        self.schedule(&mut state);
        true
    }

    /// Flips marker visibility and returns the new value.
    pub fn toggle_show_all(&self) -> bool {
        let mut show_all = false;
        self.inner.results.send_modify(|snap| {
            snap.show_all = !snap.show_all;
            show_all = snap.show_all;
        });
        show_all
    }

    /// Selects a vendor for the detail view and centers the viewport on it.
    ///
    /// The copy from the current results is preferred so the selection keeps
    /// its distance. Returns `None`, changing nothing, for an unknown id.
    pub fn select_vendor(&self, id: &str) -> Option<Vendor> {
        let found = {
            let state = self.lock();
            let snap = self.inner.results.borrow();
            let found = snap
                .vendors
                .iter()
                .find(|v| v.id == id)
                .or_else(|| state.working_set.get(id))
                .cloned();
            found
        }?;

        let viewport = found.coordinate();
        let selected = found.clone();
        self.inner.results.send_modify(|snap| {
            snap.viewport = viewport;
            snap.selected = Some(selected);
        });
        Some(found)
    }

    pub fn clear_selection(&self) {
        self.inner.results.send_modify(|snap| snap.selected = None);
    }

    /// Runs a pending debounced evaluation immediately. Returns `false` when
    /// nothing was pending.
    pub fn flush(&self) -> bool {
        let mut state = self.lock();
        if state.pending.is_none() {
            return false;
        }
        self.evaluate_now(&mut state);
        true
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.results.subscribe()
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.results.borrow().clone()
    }

    /// Number of evaluations that have run and published.
    #[must_use]
    pub fn evaluation_count(&self) -> u64 {
        self.lock().evaluations
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn install_reference(&self, state: &mut State, point: Coordinate) -> AddressOutcome {
        state.reference = Some(point);
        self.inner.results.send_modify(|snap| snap.viewport = point);

        if self.inner.config.bounding_box.contains(point) {
            tracing::debug!(session = %self.inner.id, ?point, "reference point installed");
            self.schedule(state);
            AddressOutcome::Scheduled(point)
        } else {
            tracing::info!(
                session = %self.inner.id,
                ?point,
                "reference point is outside the service region"
            );
            self.publish_out_of_region(state);
            AddressOutcome::OutOfRegion(point)
        }
    }

    /// Supersedes any pending evaluation and starts a new debounce timer.
    fn schedule(&self, state: &mut State) {
        state.generation += 1;
        let generation = state.generation;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        let Ok(runtime) = Handle::try_current() else {
            self.publish_evaluation(state);
            return;
        };

        let delay = if state.reference.is_some() {
            self.inner.config.radius_debounce
        } else {
            self.inner.config.text_debounce
        };
        let session = self.clone();
        state.pending = Some(runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            session.evaluate_if_current(generation);
        }));
    }

    fn evaluate_if_current(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::trace!(
                session = %self.inner.id,
                generation,
                current = state.generation,
                "superseded evaluation skipped"
            );
            return;
        }
        state.pending = None;
        self.publish_evaluation(&mut state);
    }

    fn evaluate_now(&self, state: &mut State) {
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        self.publish_evaluation(state);
    }

    /// Publishes an empty result set for a reference point the fleet cannot
    /// be near. Later evaluations ignore the radius and match on text alone.
    fn publish_out_of_region(&self, state: &mut State) {
        state.generation += 1;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        self.publish(state, ResultStatus::NoMatches, Vec::new());
    }

    fn publish_evaluation(&self, state: &mut State) {
        let (status, vendors) = evaluate(state, &self.inner.config.bounding_box);
        self.publish(state, status, vendors);
    }

    fn publish(&self, state: &mut State, status: ResultStatus, vendors: Vec<Vendor>) {
        state.evaluations += 1;

        tracing::debug!(
            session = %self.inner.id,
            generation = state.generation,
            results = vendors.len(),
            ?status,
            "search results published"
        );

        let query = state.query.clone();
        let reference = state.reference;
        let generation = state.generation;
        self.inner.results.send_modify(|snap| {
            snap.status = status;
            snap.vendors = vendors;
            snap.query = query;
            snap.reference = reference;
            snap.generation = generation;
        });
    }
}

/// Runs the filters for the current state. A reference point outside the
/// region disables the radius filter; text matching still applies.
fn evaluate(state: &State, bbox: &BoundingBox) -> (ResultStatus, Vec<Vendor>) {
    let needle = state.query.needle();
    let vendors = state.working_set.vendors();

    let radius = state
        .reference
        .filter(|origin| bbox.contains(*origin))
        .map(|origin| RadiusFilter {
            origin,
            radius_miles: state.query.radius_miles,
        });
    if radius.is_none() && needle.is_empty() {
        return (ResultStatus::NoQuery, vendors.to_vec());
    }

    let results = apply_filters(vendors, &needle, radius.as_ref());
    let status = if results.is_empty() {
        ResultStatus::NoMatches
    } else {
        ResultStatus::Matches
    };
    (status, results)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
