//! 模拟总线上的完整会话演示
//!
//! 不依赖硬件：MockBus 扮演执行器，另起一个线程注入反馈流。
//!
//! 运行方式：
//! ```bash
//! RUST_LOG=info cargo run -p jaco-sdk --example mock_session --features mock
//! ```

use jaco_sdk::driver::mock::MockBus;
use jaco_sdk::driver::{feedback_channel, FeedbackEvent};
use jaco_sdk::protocol::{FingerPose, JointStateSample, ToolPose};
use jaco_sdk::{JacoConfig, JacoService, Trajectory, WorkspaceFence};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    jaco_sdk::init_logging();

    let bus = MockBus::new();
    let (tx, rx) = feedback_channel();

    // 模拟驱动的反馈流：50 Hz 关节状态 + 启动时的位姿
    tx.send(FeedbackEvent::ToolPose(ToolPose([
        0.2, 0.0, 0.4, 0.0, 0.0, 0.0, 1.0,
    ])))
    .unwrap();
    tx.send(FeedbackEvent::FingerPose(FingerPose([0.0; 3]))).unwrap();
    std::thread::spawn(move || {
        for i in 0..2000u32 {
            let event = FeedbackEvent::JointState(JointStateSample {
                time_offset_s: f64::from(i) * 0.02,
                positions: vec![0.0; 7],
                velocities: vec![0.0; 7],
                efforts: vec![0.1; 7],
            });
            if tx.send(event).is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    });

    let config = JacoConfig {
        settle_time_s: 0.0,
        ..Default::default()
    };
    let mut service =
        JacoService::connect(Arc::new(bus.clone()), rx, config).expect("bring-up failed");

    service.initialize(WorkspaceFence {
        min: [-0.5, -0.5, 0.0],
        max: [0.5, 0.5, 0.8],
    });

    // 归位
    let resp = service.reset();
    println!("reset: {} ({})", resp.success, resp.message);

    // 关节角命令 + 手指全闭
    let mut data = vec![15.0, -20.0, 30.0, 0.0, 0.0, 0.0, 0.0];
    data.push(1.0);
    let resp = service.step_raw("ANGLE", "deg", false, 0, data);
    println!("angle: {} ({})", resp.success, resp.message);

    // 短轨迹的速度跟踪
    let trajectory = Trajectory::new(
        vec![0.0; 7],
        (1..=50).map(|i| vec![f64::from(i) * 0.002; 7]).collect(),
        0.5,
    );
    let resp = service.track(&trajectory);
    println!(
        "track: {} ({}), velocity publishes: {}",
        resp.success,
        resp.message,
        bus.velocity_publishes().len()
    );

    // 状态查询
    let resp = service.get_state();
    println!(
        "state: samples={} joints={:?}",
        resp.sample_count, resp.joint_pos
    );
}
