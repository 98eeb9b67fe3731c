use crate::api::{self, types, LyricsTransport, RawResponse, RequestDescriptor};
use crate::config::{Config, SubmitPolicy};
use crate::error::{LookupError, ParseError, TransportError, ValidationError};
use crate::query::{self, Query, ValidQuery};
use crate::state::{LyricsResult, QueryState};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Owns the query lifecycle: validation, request building, the network call,
/// response parsing and the single `QueryState` cell.
///
/// Every submission is numbered. The number is bumped and compared while the
/// watch channel's write lock is held, so a completion only lands if no newer
/// submission has started since.
pub struct LyricsQueryController<T> {
    config: Config,
    transport: T,
    state: watch::Sender<QueryState>,
    generation: AtomicU64,
}

impl<T: LyricsTransport> LyricsQueryController<T> {
    pub fn new(config: Config, transport: T) -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            config,
            transport,
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state transition
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    pub fn validate(&self, query: &Query) -> Result<ValidQuery, ValidationError> {
        query::validate(query, self.config.variant())
    }

    pub fn build_request(&self, query: &ValidQuery) -> RequestDescriptor {
        api::build_request(&self.config, query)
    }

    pub async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        self.transport.execute(request).await
    }

    pub fn parse_response(
        &self,
        raw: &RawResponse,
        query: &ValidQuery,
    ) -> Result<LyricsResult, ParseError> {
        types::parse_response(&raw.body, query)
    }

    /// Run one lookup and return the state it settled in. Never fails: every
    /// error ends up in `QueryState::Failed`.
    pub async fn run(&self, query: &Query) -> QueryState {
        let validated = self.validate(query);
        let next = match &validated {
            Ok(_) => QueryState::Loading,
            Err(e) => QueryState::Failed(e.clone().into()),
        };

        let Some(generation) = self.begin(next) else {
            tracing::debug!("Lookup already in flight, ignoring submission");
            return self.state();
        };

        let valid = match validated {
            Ok(valid) => valid,
            Err(e) => {
                tracing::info!("Rejected query: {}", e);
                return QueryState::Failed(e.into());
            }
        };

        let request = self.build_request(&valid);
        tracing::info!("Looking up lyrics for {}", valid);

        let outcome = self.lookup(&request, &valid).await;
        match &outcome {
            Ok(result) => tracing::info!(
                "Found lyrics for {} - {} ({} bytes)",
                result.artist,
                result.title,
                result.lyrics_text.len()
            ),
            Err(e) if e.is_not_found() => tracing::info!("No lyrics for {}", valid),
            Err(e) => tracing::warn!("Lookup for {} failed: {}", valid, e),
        }

        self.finish(generation, outcome.into())
    }

    async fn lookup(
        &self,
        request: &RequestDescriptor,
        query: &ValidQuery,
    ) -> Result<LyricsResult, LookupError> {
        let raw = self.execute(request).await?;
        Ok(self.parse_response(&raw, query)?)
    }

    /// Install the first state of a submission. Returns its generation, or
    /// `None` when the submission is dropped.
    fn begin(&self, next: QueryState) -> Option<u64> {
        let policy = self.config.submit_policy;
        let mut generation = None;

        self.state.send_if_modified(|state| {
            if state.is_loading() && policy == SubmitPolicy::IgnoreWhileLoading {
                return false;
            }
            if state.is_loading() {
                tracing::debug!("Superseding in-flight lookup");
            }
            generation = Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = next;
            true
        });

        generation
    }

    /// Publish the outcome unless a newer submission owns the cell
    fn finish(&self, generation: u64, next: QueryState) -> QueryState {
        let mut settled = None;

        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Discarding stale outcome of lookup #{}", generation);
                settled = Some(state.clone());
                return false;
            }
            tracing::debug!("Lookup #{} -> {}", generation, next.label());
            *state = next.clone();
            settled = Some(next);
            true
        });

        settled.unwrap_or_default()
    }
}
