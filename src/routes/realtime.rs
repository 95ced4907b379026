use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::response::AppError;
use crate::state::AppState;

struct SseGuard(Arc<AtomicUsize>);

impl Drop for SseGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 推送某个会话的逐帧比较结果
///
/// 会话被删除或清理后事件通道关闭，流随之结束。
pub async fn session_events(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut frames_rx = state.sessions().subscribe(&id).await?;

    let counter = state.sse_connections().clone();
    let max_sse = state.config().limits.max_sse_connections;
    let current = counter.fetch_add(1, Ordering::SeqCst);
    if current >= max_sse {
        counter.fetch_sub(1, Ordering::SeqCst);
        return Err(AppError::too_many_requests(
            "SSE_LIMIT",
            "Too many SSE connections",
        ));
    }
    let guard = SseGuard(counter);
    let mut shutdown_rx = state.shutdown_rx();
    tracing::debug!(session_id = %id, "SSE subscriber connected");

    let stream = async_stream::stream! {
        let _guard = guard;

        loop {
            tokio::select! {
                received = frames_rx.recv() => {
                    match received {
                        Ok(frame) => {
                            if let Ok(json) = serde_json::to_string(&frame) {
                                yield Ok(Event::default().event("frame").data(json));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(session_id = %id, skipped, "SSE subscriber lagged");
                            yield Ok(Event::default()
                                .event("lagged")
                                .data(skipped.to_string()));
                        }
                        Err(RecvError::Closed) => {
                            yield Ok(Event::default().event("closed").data(id.clone()));
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
