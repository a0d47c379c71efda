//! Agent lifecycle manager
//!
//! Owns the single agent runtime per deployment. The runtime is built on
//! a background task so no request ever pays the warm-up latency; the
//! state machine here decides whether a query is served, deferred, or
//! triggers a (re)build. All state transitions go through one mutex,
//! and the lock is never held across an await.

use crate::runtime::ChatRuntime;
use concierge_core::{ConversationId, Error};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Fixed user-facing reply when a chat call fails against a ready
/// runtime. The underlying cause is logged, never shown.
pub const TECHNICAL_DIFFICULTIES: &str =
    "I apologize, I'm currently experiencing technical difficulties. Please try again later.";

/// Builds the agent runtime. Injected so the expensive construction
/// (model client, retrieval tool, memory) stays out of this module and
/// tests can substitute fakes.
#[async_trait::async_trait]
pub trait RuntimeFactory: Send + Sync {
    async fn build(&self) -> Result<Arc<dyn ChatRuntime>, Error>;
}

#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// How long an in-flight build is trusted before a query treats it
    /// as stalled and starts a fresh attempt.
    pub max_init_wait: Duration,
    /// Hard ceiling on one build attempt.
    pub build_timeout: Duration,
    /// Hard ceiling on one chat call against a ready runtime.
    pub chat_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_init_wait: Duration::from_secs(30),
            build_timeout: Duration::from_secs(120),
            chat_timeout: Duration::from_secs(90),
        }
    }
}

/// Observable lifecycle state.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentStatus {
    Uninitialized,
    Initializing { elapsed_seconds: f64 },
    Ready,
    Failed { reason: String },
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Uninitialized => "uninitialized",
            AgentStatus::Initializing { .. } => "initializing",
            AgentStatus::Ready => "ready",
            AgentStatus::Failed { .. } => "failed",
        }
    }
}

/// Why a query was deferred instead of answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferReason {
    /// No build was in flight; one has been started.
    Starting,
    /// A build is in flight and still within the trust window.
    StillInitializing,
    /// The in-flight build exceeded the trust window and was restarted.
    InitRestarted,
}

/// Outcome of one query attempt. `Failed` carries the original cause
/// for logging; `reply_text()` renders the fixed user-facing string.
#[derive(Clone, Debug)]
pub enum QueryOutcome {
    Answered(String),
    Deferred {
        reason: DeferReason,
        elapsed_seconds: f64,
    },
    Failed {
        reason: String,
    },
}

impl QueryOutcome {
    pub fn reply_text(&self) -> String {
        match self {
            QueryOutcome::Answered(text) => text.clone(),
            QueryOutcome::Deferred {
                reason: DeferReason::Starting,
                ..
            } => "The assistant is initializing, please try again in a few seconds.".to_string(),
            QueryOutcome::Deferred {
                reason: DeferReason::StillInitializing,
                elapsed_seconds,
            } => format!(
                "The assistant is still initializing, please try again in a few seconds. (elapsed: {:.1}s)",
                elapsed_seconds
            ),
            QueryOutcome::Deferred {
                reason: DeferReason::InitRestarted,
                elapsed_seconds,
            } => format!(
                "The assistant is still initializing and has been restarted, please try again in a few seconds. (elapsed: {:.1}s)",
                elapsed_seconds
            ),
            QueryOutcome::Failed { .. } => TECHNICAL_DIFFICULTIES.to_string(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }
}

/// Internal state. The runtime lives inside the `Ready` variant, so a
/// reader can never observe `Ready` without a runtime.
enum HandleState {
    Uninitialized,
    Initializing { started_at: Instant },
    Ready { runtime: Arc<dyn ChatRuntime> },
    Failed { error: String },
}

struct Inner {
    state: HandleState,
    /// Bumped every time a build starts. A build completion whose epoch
    /// no longer matches belongs to an abandoned attempt and is dropped.
    epoch: u64,
}

struct Shared {
    factory: Arc<dyn RuntimeFactory>,
    config: LifecycleConfig,
    inner: Mutex<Inner>,
}

/// Process-wide singleton owning the agent runtime and its build state.
/// Cheaply cloneable; every clone observes the same state.
#[derive(Clone)]
pub struct AgentHandle {
    shared: Arc<Shared>,
}

enum Dispatch {
    Serve(Arc<dyn ChatRuntime>),
    Defer(DeferReason, f64),
}

impl AgentHandle {
    pub fn new(factory: Arc<dyn RuntimeFactory>, config: LifecycleConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory,
                config,
                inner: Mutex::new(Inner {
                    state: HandleState::Uninitialized,
                    epoch: 0,
                }),
            }),
        }
    }

    /// Start the background build if none has run yet. Idempotent:
    /// while a build is in flight or the runtime is ready, this is a
    /// no-op. Never blocks on the build itself.
    pub fn ensure_started(&self) {
        let epoch = {
            let mut inner = self.shared.inner.lock().unwrap();
            match inner.state {
                HandleState::Initializing { .. } | HandleState::Ready { .. } => return,
                HandleState::Uninitialized | HandleState::Failed { .. } => {
                    Self::begin_build(&mut inner)
                }
            }
        };
        self.spawn_build(epoch);
    }

    /// Pure read of the current lifecycle state.
    pub fn status(&self) -> AgentStatus {
        match &self.shared.inner.lock().unwrap().state {
            HandleState::Uninitialized => AgentStatus::Uninitialized,
            HandleState::Initializing { started_at } => AgentStatus::Initializing {
                elapsed_seconds: started_at.elapsed().as_secs_f64(),
            },
            HandleState::Ready { .. } => AgentStatus::Ready,
            HandleState::Failed { error } => AgentStatus::Failed {
                reason: error.clone(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status(), AgentStatus::Ready)
    }

    /// Central dispatch. Serves the query if the runtime is ready,
    /// otherwise defers and makes sure a build is under way. Never
    /// blocks waiting for the build to finish.
    pub async fn query(&self, conversation: &ConversationId, text: &str) -> QueryOutcome {
        let mut start_epoch = None;
        let dispatch = {
            let mut inner = self.shared.inner.lock().unwrap();
            match &inner.state {
                HandleState::Ready { runtime } => Dispatch::Serve(runtime.clone()),

                HandleState::Initializing { started_at } => {
                    let elapsed = started_at.elapsed();
                    if elapsed < self.shared.config.max_init_wait {
                        info!(
                            "agent still initializing, waited {:.1}s",
                            elapsed.as_secs_f64()
                        );
                        Dispatch::Defer(DeferReason::StillInitializing, elapsed.as_secs_f64())
                    } else {
                        warn!(
                            "agent initialization stalled after {:.1}s, restarting",
                            elapsed.as_secs_f64()
                        );
                        start_epoch = Some(Self::begin_build(&mut inner));
                        Dispatch::Defer(DeferReason::InitRestarted, elapsed.as_secs_f64())
                    }
                }

                HandleState::Uninitialized => {
                    info!("agent not initialized, starting build");
                    start_epoch = Some(Self::begin_build(&mut inner));
                    Dispatch::Defer(DeferReason::Starting, 0.0)
                }

                HandleState::Failed { error } => {
                    info!("agent build previously failed ({}), retrying", error);
                    start_epoch = Some(Self::begin_build(&mut inner));
                    Dispatch::Defer(DeferReason::Starting, 0.0)
                }
            }
        };

        if let Some(epoch) = start_epoch {
            self.spawn_build(epoch);
        }

        match dispatch {
            Dispatch::Defer(reason, elapsed_seconds) => QueryOutcome::Deferred {
                reason,
                elapsed_seconds,
            },
            Dispatch::Serve(runtime) => {
                let chat_timeout = self.shared.config.chat_timeout;
                match tokio::time::timeout(chat_timeout, runtime.chat(conversation, text)).await {
                    Ok(Ok(reply)) => QueryOutcome::Answered(reply),
                    Ok(Err(e)) => {
                        // The runtime stays ready; one failed turn does
                        // not invalidate it.
                        error!("error querying agent: {}", e);
                        QueryOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                    Err(_) => {
                        error!("chat call timed out after {:?}", chat_timeout);
                        QueryOutcome::Failed {
                            reason: format!("chat call timed out after {:?}", chat_timeout),
                        }
                    }
                }
            }
        }
    }

    /// Transition to Initializing and claim a new epoch. Caller must
    /// follow up with `spawn_build` outside the critical section.
    fn begin_build(inner: &mut Inner) -> u64 {
        inner.epoch += 1;
        inner.state = HandleState::Initializing {
            started_at: Instant::now(),
        };
        inner.epoch
    }

    fn spawn_build(&self, epoch: u64) {
        let handle = self.clone();
        tokio::spawn(async move {
            handle.run_build(epoch).await;
        });
    }

    async fn run_build(&self, epoch: u64) {
        info!("starting agent build (attempt {})", epoch);
        let started = Instant::now();

        let build_timeout = self.shared.config.build_timeout;
        let result = match tokio::time::timeout(build_timeout, self.shared.factory.build()).await {
            Ok(result) => result,
            Err(_) => Err(Error::build(format!(
                "build timed out after {:?}",
                build_timeout
            ))),
        };

        let mut inner = self.shared.inner.lock().unwrap();
        if inner.epoch != epoch {
            warn!(
                "discarding result of abandoned build attempt {} (current {})",
                epoch, inner.epoch
            );
            return;
        }

        match result {
            Ok(runtime) => {
                inner.state = HandleState::Ready { runtime };
                info!(
                    "agent build completed in {:.1}s (attempt {})",
                    started.elapsed().as_secs_f64(),
                    epoch
                );
            }
            Err(e) => {
                error!("agent build failed: {}", e);
                inner.state = HandleState::Failed {
                    error: e.to_string(),
                };
            }
        }
    }
}
