use std::sync::Arc;

use axum::Router;
use pose_similarity::LandmarkScheme;
use tempfile::TempDir;
use tokio::sync::broadcast;

use pose_coach::config::{
    ComparisonConfig, Config, LimitsConfig, ReferenceConfig, WorkerConfig,
};
use pose_coach::routes::build_router;
use pose_coach::state::AppState;
use pose_coach::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

fn test_config(sled_path: String, limits: LimitsConfig) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        reference: ReferenceConfig {
            pose_file: None,
            default_name: "default".to_string(),
        },
        comparison: ComparisonConfig {
            default_scheme: LandmarkScheme::BlazePose33,
            smooth_window: 3,
        },
        limits,
        worker: WorkerConfig { is_leader: false },
    }
}

pub async fn spawn_with_limits(limits: LimitsConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("pose-coach-test.sled");

    // 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
    let config = test_config(sled_path.to_string_lossy().to_string(), limits);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_limits(LimitsConfig::default()).await
}
