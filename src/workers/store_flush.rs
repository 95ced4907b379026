use crate::store::Store;

/// 周期性落盘，缩小进程被强杀时丢失的参考姿态写入窗口
pub async fn run(store: &Store) {
    tracing::debug!("store_flush: start");
    match store.flush() {
        Ok(()) => tracing::debug!("store_flush: done"),
        Err(e) => tracing::error!(error = %e, "store_flush failed"),
    }
}
