//! 随机请求/帧序列下的引擎不变量
//!
//! 1. **单一记录**：prepare 之前上一条记录一定已经 end
//! 2. **偏移范围**：update 时当前偏移在起止偏移之间
//! 3. **结束状态**：end 时进度为 1，当前偏移等于终点
//! 4. **连续**：每条记录从屏幕上已到达的偏移开始，记录内不回退，
//!    单帧移动不超过一帧时长对应的最大行程
//! 5. **收敛**：请求停止后运行到空闲，偏移等于当前面板的目标偏移

use std::cell::RefCell;
use std::rc::Rc;

use editor_host::{HeadlessRunner, HostConfig, PanelConfig, PlatformSimConfig};
use editor_runtime::{
    AnimationCallback, AnimationState, CallbackContext, Editor, EngineConfig, Host, Interpolator,
};
use proptest::prelude::*;

// ── 操作 ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Show(&'static str),
    Hide,
    Frames(usize),
    EndAnimation,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => prop::sample::select(vec!["voice", "emoji", "ime"]).prop_map(Op::Show),
        1 => Just(Op::Hide),
        3 => (1usize..6).prop_map(Op::Frames),
        1 => Just(Op::EndAnimation),
    ]
}

// ── 检查回调 ──────────────────────────────────────────────────────────

const FRAME_MILLIS: u64 = 16;

/// 插值曲线的最大斜率上界（FastOutSlowIn 约为 2.73）
const MAX_SLOPE: f32 = 3.0;

const TOLERANCE: f32 = 0.01;

#[derive(Debug, Default)]
struct Observed {
    open: bool,
    /// 屏幕上的偏移（由 start/update 通知推出）
    screen: f32,
    violations: Vec<String>,
}

struct Invariants(Rc<RefCell<Observed>>);

impl Invariants {
    fn violation(&self, message: String) {
        self.0.borrow_mut().violations.push(message);
    }
}

impl AnimationCallback for Invariants {
    fn on_prepare(&mut self, _: Option<&Editor>, _: Option<&Editor>, _: &mut CallbackContext<'_>) {
        let was_open = std::mem::replace(&mut self.0.borrow_mut().open, true);
        if was_open {
            self.violation("prepare while another record is open".to_string());
        }
    }

    fn on_start(&mut self, state: &AnimationState, _: &mut CallbackContext<'_>) {
        let screen = self.0.borrow().screen;
        if (state.start_offset() - screen).abs() > TOLERANCE {
            self.violation(format!(
                "start at {} but the screen is at {screen}",
                state.start_offset()
            ));
        }
        // 立即完成时 start 就已经在终点
        self.0.borrow_mut().screen = state.current_offset();
    }

    fn on_update(&mut self, state: &AnimationState, _: &mut CallbackContext<'_>) {
        let (start, end) = (state.start_offset(), state.end_offset());
        let low = start.min(end);
        let high = start.max(end);
        let current = state.current_offset();
        if current < low || current > high {
            self.violation(format!("update {current} outside [{low}, {high}]"));
        }

        let last = self.0.borrow().screen;
        let backward = if end >= start {
            current < last - TOLERANCE
        } else {
            current > last + TOLERANCE
        };
        if backward {
            self.violation(format!("update {current} moved back from {last} ({start} -> {end})"));
        }
        if state.duration_millis() > 0 {
            let travel = (end - start).abs() * MAX_SLOPE * FRAME_MILLIS as f32
                / state.duration_millis() as f32;
            if (current - last).abs() > travel + 1.0 {
                self.violation(format!(
                    "update jumped from {last} to {current} ({start} -> {end}, {}ms)",
                    state.duration_millis()
                ));
            }
        }
        self.0.borrow_mut().screen = current;
    }

    fn on_end(&mut self, state: &AnimationState, _: &mut CallbackContext<'_>) {
        self.0.borrow_mut().open = false;
        if state.animated_fraction() != 1.0 {
            self.violation(format!("end with fraction {}", state.animated_fraction()));
        }
        if state.current_offset() != state.end_offset() {
            self.violation(format!(
                "end at {} but end offset is {}",
                state.current_offset(),
                state.end_offset()
            ));
        }
    }
}

fn config(delivers_callbacks: bool, first_report: Option<f32>, enabled: bool) -> HostConfig {
    HostConfig {
        panels: vec![
            PanelConfig::new("voice", 300.0),
            PanelConfig::new("emoji", 400.0),
        ],
        ime_height: 348.0,
        navigation_bar_height: 48.0,
        frame_interval_millis: FRAME_MILLIS,
        platform: PlatformSimConfig {
            delivers_callbacks,
            duration_millis: 120,
            first_report,
        },
        engine: EngineConfig {
            animation_enabled: enabled,
            duration_millis: 100,
            interpolator: Interpolator::FastOutSlowIn,
            ..EngineConfig::default()
        },
        ..HostConfig::default()
    }
}

fn run(config: HostConfig, ops: &[Op]) -> (HeadlessRunner, Rc<RefCell<Observed>>) {
    let observed = Rc::new(RefCell::new(Observed::default()));
    let mut runner = HeadlessRunner::new(config);
    runner.add_callback(Invariants(observed.clone()));

    for op in ops {
        match op {
            Op::Show(name) => {
                runner.request_show(name);
            }
            Op::Hide => {
                runner.request_hide();
            }
            Op::Frames(count) => runner.run_frames(*count),
            Op::EndAnimation => runner.animator_mut().end_animation(),
        }
    }
    runner.run_until_idle(1_000);
    (runner, observed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn engine_invariants_hold(
        ops in prop::collection::vec(op(), 1..40),
        delivers_callbacks in any::<bool>(),
        first_report in prop::option::of(0.0f32..450.0),
        enabled in prop::bool::weighted(0.9),
    ) {
        let (runner, observed) = run(config(delivers_callbacks, first_report, enabled), &ops);
        let observed = observed.borrow();

        prop_assert!(observed.violations.is_empty(), "{:?}", observed.violations);
        prop_assert!(!observed.open);
        prop_assert!(runner.is_idle());
        prop_assert!((runner.offset() - observed.screen).abs() <= TOLERANCE);

        let host = runner.host().unwrap();
        let target = host.target_offset(host.current_editor());
        prop_assert!(
            (host.offset() - target).abs() <= 0.5,
            "offset {} target {}",
            host.offset(),
            target
        );
    }
}
