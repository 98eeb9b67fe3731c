use crate::{api::LyricsTransport, controller::LyricsQueryController, messages::UiMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Turn submit events from the UI into controller runs.
///
/// Each run gets its own task so the loop keeps draining messages while a
/// lookup is in flight; the controller decides what a second submission
/// means. State reaches the UI through the controller's watch channel.
pub async fn run<T>(
    controller: Arc<LyricsQueryController<T>>,
    mut ui_rx: mpsc::UnboundedReceiver<UiMessage>,
) where
    T: LyricsTransport + 'static,
{
    tracing::info!(
        "Worker started (endpoint {}, policy {:?})",
        controller.config().endpoint.as_str(),
        controller.config().submit_policy
    );

    let mut lookups = tokio::task::JoinSet::new();

    loop {
        tokio::select! {
            msg = ui_rx.recv() => match msg {
                Some(UiMessage::Submit(query)) => {
                    let controller = controller.clone();
                    lookups.spawn(async move {
                        controller.run(&query).await;
                    });
                }
                Some(UiMessage::Quit) | None => {
                    tracing::info!("Worker received quit signal");
                    break;
                }
            },
            Some(joined) = lookups.join_next(), if !lookups.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Lookup task failed: {}", e);
                }
            }
        }
    }

    // In-flight lookups have nowhere to render once the UI is gone
    lookups.abort_all();
    tracing::debug!("Worker shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawResponse, RequestDescriptor};
    use crate::config::Config;
    use crate::error::TransportError;
    use crate::query::Query;
    use crate::state::QueryState;
    use async_trait::async_trait;

    struct FixedTransport;

    #[async_trait]
    impl LyricsTransport for FixedTransport {
        async fn execute(&self, _request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
            Ok(RawResponse {
                status: 200,
                body: r#"{ "lyrics": "Is this the real life..." }"#.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_submit_reaches_controller() {
        let controller = Arc::new(LyricsQueryController::new(Config::default(), FixedTransport));
        let mut state_rx = controller.subscribe();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run(controller.clone(), ui_rx));
        ui_tx
            .send(UiMessage::Submit(Query::artist_song("Queen", "Bohemian Rhapsody")))
            .unwrap();

        let state = state_rx
            .wait_for(|state| state.is_terminal())
            .await
            .unwrap()
            .clone();
        assert!(matches!(state, QueryState::Success(ref r) if r.artist == "Queen"));

        ui_tx.send(UiMessage::Quit).unwrap();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_ui_hangs_up() {
        let controller = Arc::new(LyricsQueryController::new(Config::default(), FixedTransport));
        let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiMessage>();

        let worker = tokio::spawn(run(controller.clone(), ui_rx));
        drop(ui_tx);
        worker.await.unwrap();
        assert_eq!(controller.state(), QueryState::Idle);
    }
}
