// crates/dk_workflow/src/calculator.rs

//! 计算引擎
//!
//! [`Calculator::start`] 在后台线程上运行计算，立即返回 [`RunHandle`]；
//! 调用方通过 [`RunHandle::wait_for_completion`] 阻塞等待结果。
//!
//! # 单个位置的计算流程
//!
//! ```text
//! initialize(geometry)            派生状态只计算一次
//!   -> 顺序: for i in intervals { compute(i, damage_at_start) }
//!   -> 并行: 预分配的时段槽位，按序号并行写入（仅无状态模型）
//!   -> LocationResult::new        顺序累加损伤
//! ```
//!
//! 模型错误和 panic 按位置隔离：转换为诊断错误事件，其余位置继续计算，
//! 运行以 `FinishedWithFailure` 结束并保留已完成的位置结果。

use crate::config::{CalculatorConfig, Concurrency};
use crate::error::CalculatorError;
use crate::events::{CalculationEvent, EventDispatcher, EventListener};
use crate::run::{RunId, RunState};
use chrono::{DateTime, Utc};
use dk_core::{
    CalculationInput, DamageModel, InitializedModel, IntervalContext, IntervalResult,
    LocationResult, LocationSummary, ModelError,
};
use dk_foundation::float::contribution;
use dk_foundation::{DiagnosticEvent, DiagnosticPhase, DiagnosticsSink, DkError};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use thiserror::Error;

// ============================================================================
// 输出
// ============================================================================

/// 成功完成的运行输出
#[derive(Debug, Clone)]
pub struct CalculationOutput {
    /// 运行ID
    pub run_id: RunId,
    /// 各位置结果（按位置序号排列）
    pub location_results: Vec<LocationResult>,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 结束时间
    pub finished_at: DateTime<Utc>,
}

impl CalculationOutput {
    /// 各位置摘要
    pub fn summaries(&self) -> Vec<LocationSummary> {
        self.location_results.iter().map(|r| r.summary()).collect()
    }

    /// 运行时长 (秒)
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// 未成功完成的运行
///
/// `diagnostics` 只包含本次运行产生的事件，且至少有一个，说明运行失败或被取消的原因。
#[derive(Debug, Clone, Error)]
#[error(
    "计算运行 {run_id} 以 {state} 结束 ({} 个位置结果, {} 条诊断)",
    .partial_results.len(),
    .diagnostics.len()
)]
pub struct RunFailure {
    /// 运行ID
    pub run_id: RunId,
    /// 最终状态
    pub state: RunState,
    /// 已完成的位置结果
    pub partial_results: Vec<LocationResult>,
    /// 本次运行产生的诊断事件
    pub diagnostics: Vec<DiagnosticEvent>,
}

impl From<RunFailure> for DkError {
    fn from(failure: RunFailure) -> Self {
        match failure.state {
            RunState::Cancelled => DkError::Cancelled,
            _ => DkError::computation(failure.to_string()),
        }
    }
}

// ============================================================================
// 运行句柄
// ============================================================================

/// 运行的共享状态（工作线程与句柄之间）
#[derive(Debug)]
struct RunShared {
    id: RunId,
    state: RwLock<RunState>,
    cancelled: AtomicBool,
    completed: AtomicUsize,
    total: usize,
}

impl RunShared {
    fn transition(&self, next: RunState) {
        let mut state = self.state.write();
        if state.can_transition_to(next) {
            tracing::debug!("Run {} state: {} -> {}", self.id, *state, next);
            *state = next;
        } else {
            tracing::warn!("Run {} ignored transition {} -> {}", self.id, *state, next);
        }
    }

    /// 工作线程异常终止时强制进入 `FinishedWithFailure`，不经过转换表
    fn abort(&self) {
        let mut state = self.state.write();
        tracing::error!("Run {} aborted in state {}", self.id, *state);
        *state = RunState::FinishedWithFailure;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed.load(Ordering::Relaxed) as f64 / self.total as f64).clamp(0.0, 1.0)
    }
}

/// 运行句柄
#[derive(Debug)]
pub struct RunHandle {
    shared: Arc<RunShared>,
    worker: JoinHandle<Result<CalculationOutput, RunFailure>>,
    sink: DiagnosticsSink,
}

impl RunHandle {
    /// 运行ID
    pub fn id(&self) -> RunId {
        self.shared.id
    }

    /// 当前状态
    pub fn state(&self) -> RunState {
        *self.shared.state.read()
    }

    /// 进度 (0.0-1.0)，按已完成的位置-时段计
    pub fn progress(&self) -> f64 {
        self.shared.progress()
    }

    /// 请求取消：停止调度新的时段，已产生的结果不受影响
    pub fn cancel(&self) {
        tracing::info!("Cancellation requested for run {}", self.shared.id);
        self.shared.cancelled.store(true, Ordering::SeqCst);
    }

    /// 是否已请求取消
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// 工作线程是否已结束
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// 阻塞等待运行结束
    pub fn wait_for_completion(self) -> Result<CalculationOutput, RunFailure> {
        let run_id = self.shared.id;
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = format!("计算线程异常终止: {}", panic_message(payload.as_ref()));
                let event = DiagnosticEvent::error(DiagnosticPhase::Calculate, message);
                self.sink.push(event.clone());
                self.shared.abort();
                Err(RunFailure {
                    run_id,
                    state: RunState::FinishedWithFailure,
                    partial_results: Vec::new(),
                    diagnostics: vec![event],
                })
            }
        }
    }
}

// ============================================================================
// 计算引擎
// ============================================================================

/// 计算引擎
#[derive(Debug, Default)]
pub struct Calculator {
    config: CalculatorConfig,
    events: Arc<EventDispatcher>,
}

impl Calculator {
    /// 创建计算引擎
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            events: Arc::new(EventDispatcher::new()),
        }
    }

    /// 添加事件监听器
    pub fn with_listener(self, listener: Arc<dyn EventListener>) -> Self {
        self.events.add_listener(listener);
        self
    }

    /// 配置
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// 事件分发器
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// 以给定配置启动计算
    pub fn start(
        input: Arc<CalculationInput>,
        config: CalculatorConfig,
        sink: &DiagnosticsSink,
    ) -> Result<RunHandle, CalculatorError> {
        Self::new(config).spawn(input, sink)
    }

    /// 启动计算
    ///
    /// 配置冲突（包括有状态模型与并行时段）在这里同步检出，
    /// 此时不会产生任何计算或部分结果。
    pub fn spawn(
        &self,
        input: Arc<CalculationInput>,
        sink: &DiagnosticsSink,
    ) -> Result<RunHandle, CalculatorError> {
        if let Err(err) = self.check_startup(&input) {
            sink.error(DiagnosticPhase::Calculate, err.to_string());
            return Err(err);
        }

        let mut pool_builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("dk-worker-{}", i));
        if self.config.num_threads > 0 {
            pool_builder = pool_builder.num_threads(self.config.num_threads);
        }
        let pool = pool_builder.build().map_err(|e| {
            sink.error(DiagnosticPhase::Calculate, format!("线程池创建失败: {}", e));
            CalculatorError::ThreadPool(e.to_string())
        })?;

        let shared = Arc::new(RunShared {
            id: RunId::new(),
            state: RwLock::new(RunState::NotStarted),
            cancelled: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
            total: input.locations().len() * input.intervals().len(),
        });

        let context = RunContext {
            shared: shared.clone(),
            input,
            config: self.config.clone(),
            sink: sink.clone(),
            diagnostics: Mutex::new(Vec::new()),
            events: self.events.clone(),
        };

        let worker = std::thread::Builder::new()
            .name(format!("dk-run-{}", shared.id))
            .spawn(move || pool.install(|| context.execute()))
            .map_err(|e| {
                sink.error(DiagnosticPhase::Calculate, format!("工作线程启动失败: {}", e));
                CalculatorError::Spawn(e.to_string())
            })?;

        Ok(RunHandle {
            shared,
            worker,
            sink: sink.clone(),
        })
    }

    fn check_startup(&self, input: &CalculationInput) -> Result<(), CalculatorError> {
        self.config.validate()?;

        if self.config.interval_concurrency.is_parallel() {
            let stateful = input.stateful_locations();
            if !stateful.is_empty() {
                return Err(CalculatorError::StatefulParallelIntervals {
                    locations: stateful,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// 运行上下文（工作线程）
// ============================================================================

/// 单个位置的计算失败原因
#[derive(Debug)]
enum LocationError {
    Model {
        interval: Option<usize>,
        source: ModelError,
    },
    Cancelled,
}

enum LocationOutcome {
    Completed(LocationResult),
    Failed,
    Cancelled,
}

struct RunContext {
    shared: Arc<RunShared>,
    input: Arc<CalculationInput>,
    config: CalculatorConfig,
    sink: DiagnosticsSink,
    /// 本次运行写入 `sink` 的事件副本
    diagnostics: Mutex<Vec<DiagnosticEvent>>,
    events: Arc<EventDispatcher>,
}

impl RunContext {
    fn report(&self, event: DiagnosticEvent) {
        self.diagnostics.lock().push(event.clone());
        self.sink.push(event);
    }

    fn execute(self) -> Result<CalculationOutput, RunFailure> {
        let run_id = self.shared.id;
        let started_at = Utc::now();
        let timer = Instant::now();
        let location_count = self.input.locations().len();

        self.shared.transition(RunState::Running);
        self.events.emit(CalculationEvent::RunStarted {
            run_id,
            locations: location_count,
            intervals: self.input.intervals().len(),
        });
        tracing::info!(
            "Run {} started: {} locations (location concurrency: {}, interval concurrency: {})",
            run_id,
            location_count,
            self.config.location_concurrency,
            self.config.interval_concurrency
        );

        let outcomes: Vec<LocationOutcome> = match self.config.location_concurrency {
            Concurrency::Sequential => (0..location_count)
                .map(|i| self.process_location(i))
                .collect(),
            Concurrency::Parallel => (0..location_count)
                .into_par_iter()
                .map(|i| self.process_location(i))
                .collect(),
        };

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;
        let mut cancelled = 0usize;
        for outcome in outcomes {
            match outcome {
                LocationOutcome::Completed(result) => results.push(result),
                LocationOutcome::Failed => failed += 1,
                LocationOutcome::Cancelled => cancelled += 1,
            }
        }

        // 所有位置都已结束时，迟到的取消请求不改变运行结论
        let state = if cancelled > 0 {
            self.report(DiagnosticEvent::warning(
                DiagnosticPhase::Calculate,
                format!(
                    "计算已取消，完成 {}/{} 个位置",
                    results.len(),
                    location_count
                ),
            ));
            RunState::Cancelled
        } else if failed > 0 {
            RunState::FinishedWithFailure
        } else {
            RunState::FinishedSuccessfully
        };

        self.shared.transition(state);
        let finished_at = Utc::now();
        self.events.emit(CalculationEvent::RunFinished {
            run_id,
            state,
            duration_secs: timer.elapsed().as_secs_f64(),
        });

        if state.is_success() {
            Ok(CalculationOutput {
                run_id,
                location_results: results,
                started_at,
                finished_at,
            })
        } else {
            Err(RunFailure {
                run_id,
                state,
                partial_results: results,
                diagnostics: self.diagnostics.into_inner(),
            })
        }
    }

    fn process_location(&self, index: usize) -> LocationOutcome {
        if self.shared.is_cancelled() {
            return LocationOutcome::Cancelled;
        }

        let run_id = self.shared.id;
        self.events.emit(CalculationEvent::LocationStarted {
            run_id,
            location: index,
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.compute_location(index)));
        let message = match outcome {
            Ok(Ok(result)) => {
                self.events.emit(CalculationEvent::LocationFinished {
                    run_id,
                    location: index,
                    final_damage: result.final_damage(),
                });
                return LocationOutcome::Completed(result);
            }
            Ok(Err(LocationError::Cancelled)) => return LocationOutcome::Cancelled,
            Ok(Err(LocationError::Model {
                interval: Some(interval),
                source,
            })) => format!("时段{}计算失败: {}", interval, source),
            Ok(Err(LocationError::Model {
                interval: None,
                source,
            })) => format!("初始化失败: {}", source),
            Err(payload) => format!("计算异常: {}", panic_message(payload.as_ref())),
        };

        let model = self.input.locations()[index].name();
        self.report(
            DiagnosticEvent::error(DiagnosticPhase::Calculate, format!("{}: {}", model, message))
                .at_location(index),
        );
        self.events.emit(CalculationEvent::LocationFailed {
            run_id,
            location: index,
            error: message,
        });
        LocationOutcome::Failed
    }

    fn compute_location(&self, index: usize) -> Result<LocationResult, LocationError> {
        let location = &self.input.locations()[index];
        let model = location
            .initialize(self.input.geometry())
            .map_err(|source| LocationError::Model {
                interval: None,
                source,
            })?;

        let parallel = self.config.interval_concurrency.is_parallel()
            && !location.requires_sequential_intervals();
        let interval_results = if parallel {
            self.parallel_intervals(model.as_ref())?
        } else {
            self.sequential_intervals(&**location, model.as_ref())?
        };

        Ok(LocationResult::new(
            index,
            location.name(),
            *location.properties(),
            model.z(),
            self.input.intervals(),
            interval_results,
        ))
    }

    /// 按时段顺序计算，传入时段起始累计损伤和上一时段原始增量
    fn sequential_intervals(
        &self,
        location: &dyn DamageModel,
        model: &dyn InitializedModel,
    ) -> Result<Vec<IntervalResult>, LocationError> {
        let intervals = self.input.intervals();
        let mut results = Vec::with_capacity(intervals.len());
        let mut damage = location.properties().initial_damage;
        let mut previous_increment = None;

        for (i, interval) in intervals.iter().enumerate() {
            if self.shared.is_cancelled() {
                return Err(LocationError::Cancelled);
            }
            let context = IntervalContext::sequential(i, damage, previous_increment);
            let result = model
                .compute_interval(interval, context)
                .map_err(|source| LocationError::Model {
                    interval: Some(i),
                    source,
                })?;
            damage += contribution(result.increment_damage);
            previous_increment = Some(result.increment_damage);
            results.push(result);
            self.tick();
        }

        Ok(results)
    }

    /// 并行计算各时段，结果写入按时段序号预分配的槽位
    fn parallel_intervals(
        &self,
        model: &dyn InitializedModel,
    ) -> Result<Vec<IntervalResult>, LocationError> {
        let intervals = self.input.intervals();
        let mut slots: Vec<Option<Result<IntervalResult, LocationError>>> =
            (0..intervals.len()).map(|_| None).collect();

        slots.par_iter_mut().enumerate().for_each(|(i, slot)| {
            let outcome = if self.shared.is_cancelled() {
                Err(LocationError::Cancelled)
            } else {
                model
                    .compute_interval(&intervals[i], IntervalContext::independent(i))
                    .map_err(|source| LocationError::Model {
                        interval: Some(i),
                        source,
                    })
            };
            if outcome.is_ok() {
                self.tick();
            }
            *slot = Some(outcome);
        });

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or(Err(LocationError::Cancelled)))
            .collect()
    }

    fn tick(&self) {
        let completed = self.shared.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let every = self.config.progress_interval;
        if every > 0 && (completed % every == 0 || completed == self.shared.total) {
            self.events.emit(CalculationEvent::Progress {
                run_id: self.shared.id,
                progress: self.shared.progress(),
                completed,
            });
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_progress_with_no_work() {
        let shared = RunShared {
            id: RunId::new(),
            state: RwLock::new(RunState::NotStarted),
            cancelled: AtomicBool::new(false),
            completed: AtomicUsize::new(0),
            total: 0,
        };
        assert_eq!(shared.progress(), 0.0);
        shared.transition(RunState::FinishedSuccessfully);
        assert_eq!(*shared.state.read(), RunState::NotStarted);

        shared.abort();
        assert_eq!(*shared.state.read(), RunState::FinishedWithFailure);
    }

    #[test]
    fn test_failure_into_dk_error() {
        let failure = |state| RunFailure {
            run_id: RunId::new(),
            state,
            partial_results: Vec::new(),
            diagnostics: Vec::new(),
        };
        assert_eq!(DkError::from(failure(RunState::Cancelled)), DkError::Cancelled);
        assert!(matches!(
            DkError::from(failure(RunState::FinishedWithFailure)),
            DkError::Computation(_)
        ));
    }
}
