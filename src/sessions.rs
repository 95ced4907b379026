//! 比较会话
//!
//! 每个会话持有一个 `PoseComparator`（参考姿态 + 历史最大距离），
//! 由 `tokio::sync::Mutex` 保护：同一会话的并发帧请求串行执行，
//! 保证最大距离的更新先于同一帧的归一化。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pose_similarity::{FrameOutcome, LandmarkScheme, LandmarkSet, PoseComparator, PoseError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::payload::{into_landmark_set, LandmarkInput};
use crate::response::AppError;

/// 每个会话事件通道的缓冲帧数，慢订阅者会丢弃更早的帧
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session limit reached ({0})")]
    LimitReached(usize),
    #[error("session not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Pose(#[from] PoseError),
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::LimitReached(_) => {
                AppError::too_many_requests("SESSION_LIMIT", &value.to_string())
            }
            SessionError::NotFound(_) => AppError::not_found("Session not found"),
            SessionError::Pose(e) => e.into(),
        }
    }
}

/// 推送给 SSE 订阅者的单帧结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEvent {
    pub session_id: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub reference_name: Option<String>,
    pub scheme: LandmarkScheme,
    pub state: &'static str,
    pub running_max: f64,
    pub frames_scored: u64,
    pub smoothed_index: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

pub struct ComparisonSession {
    id: String,
    reference_name: Option<String>,
    scheme: LandmarkScheme,
    comparator: PoseComparator,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    events: broadcast::Sender<FrameEvent>,
}

impl ComparisonSession {
    fn new(
        reference_name: Option<String>,
        scheme: LandmarkScheme,
        reference: Option<LandmarkSet>,
        smooth_window: usize,
    ) -> Result<Self, PoseError> {
        let mut comparator = PoseComparator::new(smooth_window);
        comparator.begin_detection()?;
        comparator.resolve_reference(reference)?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let now = Utc::now();
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            reference_name,
            scheme,
            comparator,
            created_at: now,
            last_activity_at: now,
            events,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            reference_name: self.reference_name.clone(),
            scheme: self.scheme,
            state: self.comparator.state_name(),
            running_max: self.comparator.running_max(),
            frames_scored: self.comparator.frames_scored(),
            smoothed_index: self.comparator.smoothed_index(),
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }

    /// 校验并比较一帧客户端输入
    ///
    /// `scheme` 缺省时按会话方案解析；显式给出且与会话不同则拒绝。
    pub fn compare_input(
        &mut self,
        scheme: Option<LandmarkScheme>,
        landmarks: Option<Vec<LandmarkInput>>,
    ) -> Result<FrameOutcome, PoseError> {
        if let Some(scheme) = scheme {
            if scheme != self.scheme {
                return Err(PoseError::SchemeMismatch {
                    reference: self.scheme,
                    live: scheme,
                });
            }
        }
        let live = into_landmark_set(self.scheme, landmarks)?;
        self.compare(live.as_ref())
    }

    pub fn compare(&mut self, live: Option<&LandmarkSet>) -> Result<FrameOutcome, PoseError> {
        let outcome = self.comparator.try_compare_frame(live)?;
        self.last_activity_at = Utc::now();

        match &outcome {
            FrameOutcome::Scored(score) => tracing::debug!(
                session_id = %self.id,
                frame = score.frame,
                index = score.index,
                running_max = score.running_max,
                "Frame scored"
            ),
            other => tracing::debug!(session_id = %self.id, outcome = ?other, "Frame not scored"),
        }

        // 没有订阅者时发送失败，忽略即可
        let _ = self.events.send(FrameEvent {
            session_id: self.id.clone(),
            at: self.last_activity_at,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameEvent> {
        self.events.subscribe()
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<ComparisonSession>>>>,
    max_sessions: usize,
    smooth_window: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, smooth_window: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            smooth_window,
        }
    }

    /// 创建会话，参考姿态在创建时即确定（Ready 或 Absent），此后不再变化
    pub async fn create(
        &self,
        reference_name: Option<String>,
        scheme: LandmarkScheme,
        reference: Option<LandmarkSet>,
    ) -> Result<SessionSnapshot, SessionError> {
        if let Some(set) = &reference {
            if set.scheme() != scheme {
                return Err(PoseError::SchemeMismatch {
                    reference: set.scheme(),
                    live: scheme,
                }
                .into());
            }
        }

        let session =
            ComparisonSession::new(reference_name, scheme, reference, self.smooth_window)?;
        let snapshot = session.snapshot();

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached(self.max_sessions));
        }
        sessions.insert(snapshot.id.clone(), Arc::new(Mutex::new(session)));
        drop(sessions);

        tracing::info!(
            session_id = %snapshot.id,
            reference = ?snapshot.reference_name,
            scheme = %snapshot.scheme,
            state = snapshot.state,
            "Comparison session created"
        );
        Ok(snapshot)
    }

    pub async fn get(&self, id: &str) -> Result<Arc<Mutex<ComparisonSession>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub async fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.get(id).await?;
        let guard = session.lock().await;
        Ok(guard.snapshot())
    }

    pub async fn list(&self) -> Vec<SessionSnapshot> {
        let handles: Vec<_> = self.sessions.read().await.values().cloned().collect();
        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshots.push(handle.lock().await.snapshot());
        }
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        snapshots
    }

    pub async fn compare_input(
        &self,
        id: &str,
        scheme: Option<LandmarkScheme>,
        landmarks: Option<Vec<LandmarkInput>>,
    ) -> Result<FrameOutcome, SessionError> {
        let session = self.get(id).await?;
        let mut guard = session.lock().await;
        Ok(guard.compare_input(scheme, landmarks)?)
    }

    pub async fn subscribe(&self, id: &str) -> Result<broadcast::Receiver<FrameEvent>, SessionError> {
        let session = self.get(id).await?;
        let guard = session.lock().await;
        Ok(guard.subscribe())
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Comparison session closed");
        }
        removed
    }

    /// 清理超过 `ttl` 无活动的会话，返回清理数量
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff = Utc::now() - ttl;

        let handles: Vec<_> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect();

        let mut idle = Vec::new();
        for (id, handle) in handles {
            if handle.lock().await.last_activity_at < cutoff {
                idle.push(id);
            }
        }

        if idle.is_empty() {
            return 0;
        }
        self.remove_if_idle(idle, cutoff).await
    }

    /// 持有写锁后再确认一次，扫描之后收到新帧的会话保留
    async fn remove_if_idle(&self, idle: Vec<String>, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut evicted = 0;
        for id in idle {
            let still_idle = match sessions.get(&id) {
                Some(handle) => handle.lock().await.last_activity_at < cutoff,
                None => false,
            };
            if still_idle && sessions.remove(&id).is_some() {
                evicted += 1;
            }
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
