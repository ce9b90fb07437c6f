//! 反馈摄取线程
//!
//! 单线程从反馈通道取事件并写入 [`StateStore`]，是所有状态写入的
//! 唯一路径。摄取线程不解析、不换算，只搬运——换算发生在上层
//! 读取侧。
//!
//! 生命周期由 [`IngestHandle`] 管理：句柄 Drop 时发出停止信号并
//! 等待线程退出。

use crate::bus::FeedbackEvent;
use crate::store::StateStore;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 停止信号的轮询间隔
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 摄取线程句柄
pub struct IngestHandle {
    is_running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IngestHandle {
    /// 摄取线程是否仍在运行
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// 停止摄取线程并等待其退出
    pub fn shutdown(&mut self) {
        self.is_running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Ingest thread panicked during shutdown");
            }
        }
    }
}

impl Drop for IngestHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// 启动反馈摄取线程
///
/// 循环用带超时的 `recv` 取事件，超时窗口兼作停止信号的检查点。
/// 通道断开（所有发送端被丢弃）视为传输层退出，线程随之结束。
pub fn spawn_ingest(rx: Receiver<FeedbackEvent>, store: Arc<StateStore>) -> IngestHandle {
    let is_running = Arc::new(AtomicBool::new(true));
    let run_flag = is_running.clone();

    let handle = std::thread::Builder::new()
        .name("jaco-ingest".to_string())
        .spawn(move || {
            info!("Feedback ingest thread started");
            while run_flag.load(Ordering::Relaxed) {
                match rx.recv_timeout(RECV_POLL_INTERVAL) {
                    Ok(event) => store.apply(event),
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => {
                        debug!("Feedback channel disconnected, ingest thread exiting");
                        break;
                    }
                }
            }
            run_flag.store(false, Ordering::Relaxed);
            info!("Feedback ingest thread stopped");
        })
        .expect("failed to spawn ingest thread");

    IngestHandle {
        is_running,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::feedback_channel;
    use jaco_protocol::{JointStateSample, ToolPose};

    #[test]
    fn test_ingest_applies_events() {
        let (tx, rx) = feedback_channel();
        let store = Arc::new(StateStore::default());
        let handle = spawn_ingest(rx, store.clone());

        tx.send(FeedbackEvent::JointState(JointStateSample {
            time_offset_s: 0.01,
            positions: vec![1.0; 7],
            velocities: vec![0.0; 7],
            efforts: vec![0.0; 7],
        }))
        .unwrap();
        tx.send(FeedbackEvent::ToolPose(ToolPose::default())).unwrap();

        // 等第一个样本落入存储
        let snap = store
            .wait_for_sample(Duration::from_secs(2))
            .expect("sample should be ingested");
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.joint_positions, vec![1.0; 7]);
        drop(handle);
    }

    #[test]
    fn test_ingest_stops_on_disconnect() {
        let (tx, rx) = feedback_channel();
        let store = Arc::new(StateStore::default());
        let handle = spawn_ingest(rx, store);

        drop(tx);
        // 通道断开后线程自行退出
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while handle.is_running() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!handle.is_running());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (_tx, rx) = feedback_channel();
        let store = Arc::new(StateStore::default());
        let mut handle = spawn_ingest(rx, store);
        handle.shutdown();
        handle.shutdown();
        assert!(!handle.is_running());
    }
}
