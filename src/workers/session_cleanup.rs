use std::time::Duration;

use crate::sessions::SessionRegistry;

/// 清理长时间没有收到帧的比较会话，关闭其 SSE 事件流
pub async fn run(sessions: &SessionRegistry, idle_ttl: Duration) {
    tracing::debug!("session_cleanup: start");
    let evicted = sessions.evict_idle(idle_ttl).await;
    if evicted > 0 {
        let remaining = sessions.len().await;
        tracing::info!(evicted, remaining, "session_cleanup: done");
    } else {
        tracing::debug!("session_cleanup: nothing to evict");
    }
}

#[cfg(test)]
mod tests {
    use pose_similarity::LandmarkScheme;

    use super::*;

    #[tokio::test]
    async fn evicts_only_idle_sessions() {
        let sessions = SessionRegistry::new(4, 3);
        sessions
            .create(None, LandmarkScheme::MoveNet17, None)
            .await
            .unwrap();

        run(&sessions, Duration::from_secs(3600)).await;
        assert_eq!(sessions.len().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        run(&sessions, Duration::from_millis(1)).await;
        assert!(sessions.is_empty().await);
    }

    fn assert_send<T: Send>(_: T) {}

    #[tokio::test]
    async fn cleanup_future_is_send() {
        let sessions = std::sync::Arc::new(SessionRegistry::new(4, 3));
        assert_send(async move { run(&sessions, Duration::from_secs(1)).await });
    }
}
