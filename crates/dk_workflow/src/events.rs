// crates/dk_workflow/src/events.rs

//! 事件系统模块
//!
//! 计算运行过程中的事件定义和分发机制。监听器在工作线程（可能是
//! 多个并行线程）上被调用，必须是 `Send + Sync`。

use crate::run::{RunId, RunState};
use parking_lot::RwLock;
use std::sync::Arc;

/// 计算事件
#[derive(Debug, Clone)]
pub enum CalculationEvent {
    /// 运行已开始
    RunStarted {
        /// 运行ID
        run_id: RunId,
        /// 位置数
        locations: usize,
        /// 时段数
        intervals: usize,
    },
    /// 位置开始计算
    LocationStarted {
        /// 运行ID
        run_id: RunId,
        /// 位置序号
        location: usize,
    },
    /// 位置计算完成
    LocationFinished {
        /// 运行ID
        run_id: RunId,
        /// 位置序号
        location: usize,
        /// 最终累计损伤
        final_damage: f64,
    },
    /// 位置计算失败
    LocationFailed {
        /// 运行ID
        run_id: RunId,
        /// 位置序号
        location: usize,
        /// 错误信息
        error: String,
    },
    /// 进度更新
    Progress {
        /// 运行ID
        run_id: RunId,
        /// 进度 (0.0-1.0)
        progress: f64,
        /// 已完成的位置-时段数
        completed: usize,
    },
    /// 运行结束
    RunFinished {
        /// 运行ID
        run_id: RunId,
        /// 最终状态
        state: RunState,
        /// 运行时长 (秒)
        duration_secs: f64,
    },
}

impl CalculationEvent {
    /// 获取事件对应的运行ID
    pub fn run_id(&self) -> RunId {
        match self {
            Self::RunStarted { run_id, .. } => *run_id,
            Self::LocationStarted { run_id, .. } => *run_id,
            Self::LocationFinished { run_id, .. } => *run_id,
            Self::LocationFailed { run_id, .. } => *run_id,
            Self::Progress { run_id, .. } => *run_id,
            Self::RunFinished { run_id, .. } => *run_id,
        }
    }

    /// 获取事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "RunStarted",
            Self::LocationStarted { .. } => "LocationStarted",
            Self::LocationFinished { .. } => "LocationFinished",
            Self::LocationFailed { .. } => "LocationFailed",
            Self::Progress { .. } => "Progress",
            Self::RunFinished { .. } => "RunFinished",
        }
    }
}

/// 事件监听器trait
pub trait EventListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &CalculationEvent);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&CalculationEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&CalculationEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&CalculationEvent) + Send + Sync,
{
    fn on_event(&self, event: &CalculationEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
pub struct LoggingListener {
    prefix: String,
    verbose: bool,
}

impl LoggingListener {
    /// 创建日志监听器
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            verbose: false,
        }
    }

    /// 设置详细模式（输出每个位置的开始/完成）
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl EventListener for LoggingListener {
    fn on_event(&self, event: &CalculationEvent) {
        let msg = match event {
            CalculationEvent::RunStarted {
                run_id,
                locations,
                intervals,
            } => {
                format!(
                    "Run {} started: {} locations x {} intervals",
                    run_id, locations, intervals
                )
            }
            CalculationEvent::Progress {
                run_id, progress, ..
            } => {
                format!("Run {} progress: {:.1}%", run_id, progress * 100.0)
            }
            CalculationEvent::LocationFailed {
                run_id,
                location,
                error,
            } => {
                tracing::warn!(
                    "{}: Run {} location {} failed: {}",
                    self.prefix,
                    run_id,
                    location,
                    error
                );
                return;
            }
            CalculationEvent::RunFinished {
                run_id,
                state,
                duration_secs,
            } => {
                format!("Run {} finished as {} in {:.2}s", run_id, state, duration_secs)
            }
            CalculationEvent::LocationFinished {
                location,
                final_damage,
                ..
            } if self.verbose => {
                format!("Location {} finished, damage={:.4}", location, final_damage)
            }
            _ if self.verbose => {
                format!("{:?}", event)
            }
            _ => return,
        };

        tracing::info!("{}: {}", self.prefix, msg);
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn EventListener>) {
        let name = listener.name().to_string();
        self.listeners.write().push(listener);
        tracing::debug!("Added event listener: {}", name);
    }

    /// 添加函数式监听器
    pub fn add_fn_listener<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&CalculationEvent) + Send + Sync + 'static,
    {
        let listener = Arc::new(FnListener::new(name, handler));
        self.add_listener(listener);
    }

    /// 移除监听器
    pub fn remove_listener(&self, listener: &Arc<dyn EventListener>) {
        self.listeners
            .write()
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// 分发事件
    pub fn emit(&self, event: CalculationEvent) {
        let listeners = self.listeners.read();

        tracing::trace!("Emitting event: {}", event.name());

        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_dispatcher() {
        let dispatcher = EventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        dispatcher.add_fn_listener("test", move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let run_id = RunId::new();
        dispatcher.emit(CalculationEvent::LocationStarted {
            run_id,
            location: 0,
        });
        dispatcher.emit(CalculationEvent::RunFinished {
            run_id,
            state: RunState::FinishedSuccessfully,
            duration_secs: 0.5,
        });

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_listener() {
        let dispatcher = EventDispatcher::new();
        let listener: Arc<dyn EventListener> = Arc::new(LoggingListener::new("dk"));
        dispatcher.add_listener(listener.clone());
        assert_eq!(dispatcher.listener_count(), 1);

        dispatcher.remove_listener(&listener);
        assert_eq!(dispatcher.listener_count(), 0);
    }

    #[test]
    fn test_event_run_id() {
        let run_id = RunId::new();
        let event = CalculationEvent::Progress {
            run_id,
            progress: 0.5,
            completed: 10,
        };

        assert_eq!(event.run_id(), run_id);
        assert_eq!(event.name(), "Progress");
    }
}
