//! 服务门面端到端场景测试
//!
//! 用 MockBus 覆盖完整会话：连接 → 初始化 → 命令 → 状态查询，
//! 以及超时取消、初始化门和状态隔离等失败路径。

use crossbeam_channel::Sender;
use jaco_sdk::driver::mock::{GoalBehavior, MockBus};
use jaco_sdk::driver::{feedback_channel, FeedbackEvent};
use jaco_sdk::protocol::{
    ActuatorGoal, FingerPose, GoalInterface, JointStateSample, ToolPose, MAX_FINGER_TURNS,
};
use jaco_sdk::{JacoConfig, JacoService, WorkspaceFence};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> JacoConfig {
    JacoConfig {
        action_timeout_s: 0.2,
        settle_time_s: 0.0,
        connect_timeout_s: 2.0,
        state_wait_timeout_s: 1.0,
        ..Default::default()
    }
}

fn fence() -> WorkspaceFence {
    WorkspaceFence {
        min: [-0.5, -0.5, 0.0],
        max: [0.5, 0.5, 0.8],
    }
}

/// 启动一个持续注入反馈的会话
///
/// 返回服务和反馈发送端；发送端被丢弃后注入线程自行退出。
fn start_session(bus: &MockBus, positions: Vec<f64>) -> (JacoService, Sender<FeedbackEvent>) {
    let (tx, rx) = feedback_channel();
    tx.send(FeedbackEvent::ToolPose(ToolPose([
        0.2, 0.0, 0.4, 0.0, 0.0, 0.0, 1.0,
    ])))
    .unwrap();
    tx.send(FeedbackEvent::FingerPose(FingerPose([0.0; 3]))).unwrap();

    let feeder = tx.clone();
    std::thread::spawn(move || {
        for i in 0..500 {
            let event = FeedbackEvent::JointState(JointStateSample {
                time_offset_s: i as f64 * 0.01,
                positions: positions.clone(),
                velocities: vec![0.0; positions.len()],
                efforts: vec![0.5; positions.len()],
            });
            if feeder.send(event).is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    });

    let service = JacoService::connect(Arc::new(bus.clone()), rx, test_config())
        .expect("connect should succeed with live feedback");
    (service, tx)
}

/// 场景 A：完整会话——初始化、归位、带手指尾段的关节角命令、状态查询
#[test]
fn scenario_full_session() {
    let bus = MockBus::new();
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);

    assert!(service.initialize(fence()).success);

    // 归位（阻塞）
    let resp = service.reset();
    assert!(resp.success);
    assert_eq!(resp.message, "+HOME_FINISHED");
    assert_eq!(bus.sent_goal_count(GoalInterface::Home), 1);

    // 7 个关节角 + 1 个标量手指命令（全闭）
    let mut data = vec![10.0; 7];
    data.push(1.0);
    let resp = service.step_raw("ANGLE", "deg", false, 0, data);
    assert!(resp.success);
    assert!(resp.message.contains("+JOINT_ANGLES_FINISHED"));
    assert!(resp.message.contains("+FINGER_POSITION_FINISHED"));
    assert!(resp.sample_count >= 1);
    assert_eq!(resp.joint_pos.len(), 7);

    let goals = bus.sent_goals();
    let finger = goals
        .iter()
        .find_map(|(goal, _)| match goal {
            ActuatorGoal::FingerPosition(g) => Some(g),
            _ => None,
        })
        .expect("finger goal should be sent");
    assert_eq!(finger.turns, [MAX_FINGER_TURNS; 3]);

    // 状态查询；响应是服务边界上的数据，可直接序列化
    let resp = service.get_state();
    assert!(resp.success);
    assert_eq!(resp.tool_pose, vec![0.2, 0.0, 0.4, 0.0, 0.0, 0.0, 1.0]);
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains("\"tool_pose\""));
}

/// 场景 B：位姿目标超时——取消发出、手指尾段仍被转发、消息合并
#[test]
fn scenario_pose_timeout_with_finger_tail() {
    let bus = MockBus::new();
    bus.set_behavior(GoalInterface::ToolPose, GoalBehavior::Never);
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);
    service.initialize(fence());

    let resp = service.step_raw(
        "TOOL",
        "mq",
        false,
        0,
        vec![0.3, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0, -1.0],
    );
    assert!(!resp.success);
    assert!(resp.message.contains("+TIMEOUT"));
    assert!(resp.message.contains("+FINGER_POSITION_FINISHED"));

    // 超时触发对位姿接口的取消，手指接口不受影响
    assert_eq!(bus.cancel_count(GoalInterface::ToolPose), 1);
    assert_eq!(bus.cancel_count(GoalInterface::FingerPosition), 0);
    assert_eq!(bus.sent_goal_count(GoalInterface::FingerPosition), 1);
}

/// 米单位的相对位姿命令超时——米/弧度简写可用，手指尾段照常转发
#[test]
fn scenario_relative_pose_timeout_in_meters() {
    let bus = MockBus::new();
    bus.set_behavior(GoalInterface::ToolPose, GoalBehavior::Never);
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);
    service.initialize(fence());

    let resp = service.step_raw(
        "TOOL",
        "m",
        true,
        0,
        vec![0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5],
    );
    assert!(!resp.success);
    assert!(resp.message.contains("TIMEOUT"));
    assert_eq!(bus.sent_goal_count(GoalInterface::FingerPosition), 1);

    // 相对平移叠加在当前工具位姿上（启动时 x = 0.2）
    let pose = bus
        .sent_goals()
        .iter()
        .find_map(|(goal, _)| match goal {
            ActuatorGoal::ToolPose(g) => Some(g.clone()),
            _ => None,
        })
        .expect("pose goal should be sent");
    assert!((pose.position[0] - 0.21).abs() < 1e-9);
}

/// 场景 C：初始化门——初始化前的命令被拒绝且无副作用
#[test]
fn scenario_initialization_gate() {
    let bus = MockBus::new();
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);

    let resp = service.step_raw("VEL", "deg", false, 3, vec![1.0; 7]);
    assert!(!resp.success);
    assert_eq!(resp.message, "not initialized");

    let resp = service.get_state();
    assert!(!resp.success);
    assert_eq!(resp.message, "not initialized");

    assert!(bus.velocity_publishes().is_empty());
    assert!(bus.sent_goals().is_empty());

    // 初始化后同一命令可用
    service.initialize(fence());
    let resp = service.step_raw("VEL", "deg", false, 3, vec![1.0; 7]);
    assert!(resp.success);
    assert_eq!(bus.velocity_publishes().len(), 3);
}

/// 场景 D：命令之间的状态隔离——每条命令后的计数只反映该命令期间的反馈
#[test]
fn scenario_state_isolation_between_commands() {
    let bus = MockBus::new();
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);
    service.initialize(fence());

    let first = service.step_raw("VEL", "deg", false, 1, vec![0.0; 7]);
    assert!(first.success);

    let second = service.step_raw("VEL", "deg", false, 1, vec![0.0; 7]);
    assert!(second.success);

    // 第二条命令的响应不会累计第一条命令期间的样本：
    // 注入节奏 5 ms，单条 VEL 命令耗时 ~10 ms，计数应远小于总注入量
    assert!(second.sample_count < 20);
    assert_eq!(second.time_offsets.len() as u64, second.sample_count);
}

/// 未知命令类型与超时是不同的失败类别
#[test]
fn scenario_unknown_command_type() {
    let bus = MockBus::new();
    let (mut service, _tx) = start_session(&bus, vec![0.0; 7]);
    service.initialize(fence());

    let resp = service.step_raw("SPIN", "deg", false, 0, vec![0.0; 7]);
    assert!(!resp.success);
    assert!(resp.message.contains("SPIN"));
    assert!(!resp.message.contains("+TIMEOUT"));
    assert!(bus.sent_goals().is_empty());
}

/// 反馈缺席时 get_state 限时返回失败而不是永久阻塞
#[test]
fn scenario_get_state_bounded_wait() {
    let bus = MockBus::new();
    let (tx, rx) = feedback_channel();
    tx.send(FeedbackEvent::ToolPose(ToolPose::default())).unwrap();
    tx.send(FeedbackEvent::FingerPose(FingerPose::default())).unwrap();

    let config = JacoConfig {
        state_wait_timeout_s: 0.1,
        ..test_config()
    };
    let mut service = JacoService::connect(Arc::new(bus), rx, config).unwrap();
    service.initialize(fence());

    // 没有任何关节样本，等待必须在限时内结束
    let start = std::time::Instant::now();
    let resp = service.get_state();
    assert!(!resp.success);
    assert!(resp.message.contains("Timed out"));
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(start.elapsed() < Duration::from_secs(1));

    // 样本到达后恢复
    tx.send(FeedbackEvent::JointState(JointStateSample {
        time_offset_s: 0.01,
        positions: vec![0.2; 7],
        velocities: vec![0.0; 7],
        efforts: vec![0.0; 7],
    }))
    .unwrap();
    let resp = service.get_state();
    assert!(resp.success);
    assert_eq!(resp.joint_pos, vec![0.2; 7]);
}
