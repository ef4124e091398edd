//! Goal engine: progress state machine with goal-reached branching
//!
//! Phases:
//! - ACCUMULATING: current < target
//! - AT_GOAL: current ≥ target after the latest update
//! - CELEBRATING: goal-hit flash, reverts after CELEBRATION_DURATION_MS
//!
//! Deltas (events, `!add`, `!subtract`) run through `apply_delta` and its
//! stop-at-goal gate. Direct assignments (`!set`, `!setgoal`, `!resetgoal`)
//! skip the gate and the branching.
//!
//! Store writes go through one writer task, in issue order. A celebration
//! ends with an un-animated settled update on the live channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::CELEBRATION_DURATION_MS;
use crate::core::command_parser::CommandParser;
use crate::core::store::{ProgressStore, StoreKeys};
use crate::types::{
    ChatMessage, Command, CommandName, EventType, GoalConfig, GoalPhase, InboundEvent,
    ProgressOutput, ProgressState, ReasonCode,
};

/// Capacity of the update channel
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Work for the store writer
enum WriteJob {
    /// Key/value pairs from one mutation
    Set(Vec<(String, f64)>),
    /// Answer once every earlier job is done
    Flush(oneshot::Sender<()>),
}

/// Goal-progress engine, one per overlay session
pub struct GoalEngine {
    /// Resolved configuration
    config: GoalConfig,
    /// Current numbers
    state: ProgressState,
    /// Target changed at runtime and must be persisted too
    target_dirty: bool,
    /// Persistence port
    store: Arc<dyn ProgressStore>,
    /// Keys this session writes
    keys: StoreKeys,
    /// Chat command parser
    parser: CommandParser,
    /// End of the running celebration
    celebrating_until: Option<Instant>,
    /// Bumped per celebration; only the newest one sends the revert
    celebration_seq: Arc<AtomicU64>,
    /// Queue of the store writer, spawned on first write
    writer: Option<mpsc::UnboundedSender<WriteJob>>,
    /// Live update fan-out
    update_tx: broadcast::Sender<ProgressOutput>,
    /// Latest numbers, read by celebration timers
    state_tx: watch::Sender<ProgressState>,
    /// Number of mutations applied
    update_count: u64,
}

impl std::fmt::Debug for GoalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalEngine")
            .field("state", &self.state)
            .field("keys", &self.keys)
            .field("update_count", &self.update_count)
            .finish()
    }
}

impl GoalEngine {
    /// Create engine at the configured starting value
    pub fn new(config: GoalConfig, store: Arc<dyn ProgressStore>) -> Self {
        let keys = StoreKeys::for_title(&config.title);
        let state = ProgressState::new(config.starting_value, config.target);
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(state);
        Self {
            config,
            state,
            target_dirty: false,
            store,
            keys,
            parser: CommandParser::new(),
            celebrating_until: None,
            celebration_seq: Arc::new(AtomicU64::new(0)),
            writer: None,
            update_tx,
            state_tx,
            update_count: 0,
        }
    }

    /// Replace the starting values with persisted ones, if the store has any.
    ///
    /// Store failures keep the defaults. The returned update is not animated.
    pub async fn restore(&mut self) -> ProgressOutput {
        let mut restored = false;

        match self.store.get(&self.keys.current).await {
            Ok(Some(current)) if current.is_finite() => {
                self.state.current = current;
                restored = true;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(key = %self.keys.current, error = %e, "progress read failed"),
        }

        match self.store.get(&self.keys.target).await {
            Ok(Some(target)) if target.is_finite() && target > 0.0 => {
                self.state.target = target;
                self.target_dirty = true;
                restored = true;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(key = %self.keys.target, error = %e, "target read failed"),
        }

        let reason = if restored {
            tracing::debug!(current = self.state.current, goal = self.state.target, "restored progress");
            ReasonCode::R104_RESTORED
        } else {
            ReasonCode::R104_STATE_UNCHANGED
        };
        let output = ProgressOutput::new(self.state, self.phase(), reason, false, false);
        self.notify(&output);
        output
    }

    // =========================================================================
    // Event and command dispatch
    // =========================================================================

    /// Handle one inbound event. `None` when the event does not concern this goal.
    pub fn handle_event(&mut self, event: &InboundEvent) -> Option<ProgressOutput> {
        if let InboundEvent::Message(message) = event {
            if !self.config.enable_chat_commands {
                return None;
            }
            return self.handle_message(message);
        }

        let amount = self.event_amount(event)?;
        if amount > 0.0 {
            Some(self.apply_delta(amount))
        } else {
            None
        }
    }

    /// Amount an event contributes under the configured event type
    fn event_amount(&self, event: &InboundEvent) -> Option<f64> {
        match (self.config.event_type, event) {
            (EventType::Follower, InboundEvent::Follower) => Some(self.config.increment_unit),
            (EventType::Subscriber, InboundEvent::Subscriber) => Some(self.config.increment_unit),
            (EventType::Donation, InboundEvent::Tip { amount }) => Some(*amount),
            (EventType::Cheer, InboundEvent::Cheer { amount }) => Some(*amount),
            _ => None,
        }
    }

    /// Parse and apply a chat message
    pub fn handle_message(&mut self, message: &ChatMessage) -> Option<ProgressOutput> {
        let command = self.parser.parse(message)?;
        Some(self.apply_command(command))
    }

    /// Apply a parsed command
    pub fn apply_command(&mut self, command: Command) -> ProgressOutput {
        let arg = command.arg.unwrap_or(0.0);
        match command.name {
            CommandName::Add => self.apply_delta(arg),
            CommandName::Subtract => self.apply_delta(-arg),
            CommandName::Set => self.set_current(arg),
            CommandName::SetGoal => self.set_target(arg),
            CommandName::ResetGoal => self.reset_to_zero(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `delta` to current progress, then run goal-reached branching
    pub fn apply_delta(&mut self, delta: f64) -> ProgressOutput {
        if !delta.is_finite() {
            return self.unchanged();
        }

        if self.config.stop_at_goal && self.state.is_at_goal() {
            return ProgressOutput::new(
                self.state,
                self.phase(),
                ReasonCode::R101_DELTA_IGNORED_AT_GOAL,
                false,
                false,
            );
        }

        let next = self.state.current + delta;
        if !next.is_finite() {
            tracing::debug!(current = self.state.current, delta, "delta overflows, ignored");
            return self.unchanged();
        }
        self.state.current = next;

        let raised = self.state.target + self.config.increase_after_goal_by;
        let reason = if self.state.is_at_goal() {
            self.start_celebration();
            if self.config.increase_after_goal_by > 0.0 && raised.is_finite() {
                self.state.target = raised;
                self.target_dirty = true;
                tracing::info!(current = self.state.current, goal = self.state.target, "goal reached, target raised");
                ReasonCode::R102_TARGET_RAISED
            } else if self.config.reset_at_goal {
                self.state.current = 0.0;
                tracing::info!(goal = self.state.target, "goal reached, progress reset");
                ReasonCode::R102_RESET_AT_GOAL
            } else {
                tracing::info!(current = self.state.current, goal = self.state.target, "goal reached");
                ReasonCode::R102_GOAL_REACHED
            }
        } else {
            ReasonCode::R101_DELTA_APPLIED
        };

        self.commit(reason)
    }

    /// Assign current progress directly
    pub fn set_current(&mut self, value: f64) -> ProgressOutput {
        if !value.is_finite() {
            return self.unchanged();
        }
        self.state.current = value;
        self.commit(ReasonCode::R103_CURRENT_SET)
    }

    /// Assign the target directly. Non-positive targets are dropped.
    pub fn set_target(&mut self, value: f64) -> ProgressOutput {
        if !(value.is_finite() && value > 0.0) {
            tracing::debug!(value, "ignoring non-positive goal");
            return self.unchanged();
        }
        self.state.target = value;
        self.target_dirty = true;
        self.commit(ReasonCode::R103_TARGET_SET)
    }

    /// Current progress back to zero
    pub fn reset_to_zero(&mut self) -> ProgressOutput {
        self.state.current = 0.0;
        self.commit(ReasonCode::R103_PROGRESS_RESET)
    }

    /// Persist, notify, and build the output for a mutation
    fn commit(&mut self, reason: ReasonCode) -> ProgressOutput {
        self.update_count += 1;
        let persisted = self.persist();
        let output = ProgressOutput::new(self.state, self.phase(), reason, persisted, true);
        self.notify(&output);
        output
    }

    fn unchanged(&self) -> ProgressOutput {
        ProgressOutput::new(
            self.state,
            self.phase(),
            ReasonCode::R104_STATE_UNCHANGED,
            false,
            false,
        )
    }

    // =========================================================================
    // Persistence and notification
    // =========================================================================

    /// Queue store writes without waiting for them. Returns false when no
    /// runtime is available to run the writer.
    fn persist(&mut self) -> bool {
        let mut writes = vec![(self.keys.current.clone(), self.state.current)];
        if self.target_dirty {
            writes.push((self.keys.target.clone(), self.state.target));
        }

        let job = match &self.writer {
            Some(tx) => match tx.send(WriteJob::Set(writes)) {
                Ok(()) => return true,
                // Writer gone with its runtime, start a new one
                Err(mpsc::error::SendError(job)) => job,
            },
            None => WriteJob::Set(writes),
        };

        let Some(tx) = self.spawn_writer() else {
            tracing::warn!("no async runtime, progress not persisted");
            return false;
        };
        let sent = tx.send(job).is_ok();
        self.writer = Some(tx);
        sent
    }

    fn spawn_writer(&self) -> Option<mpsc::UnboundedSender<WriteJob>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_writer(Arc::clone(&self.store), rx));
        Some(tx)
    }

    fn notify(&self, output: &ProgressOutput) {
        self.state_tx.send_replace(self.state);
        // No subscribers is fine
        let _ = self.update_tx.send(output.clone());
    }

    /// Wait until every queued write has reached the store
    pub async fn flush(&self) {
        let Some(tx) = &self.writer else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if tx.send(WriteJob::Flush(done_tx)).is_err() || done_rx.await.is_err() {
            tracing::warn!("progress writer stopped before flush");
        }
    }

    /// Subscribe to live updates
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressOutput> {
        self.update_tx.subscribe()
    }

    // =========================================================================
    // Celebration
    // =========================================================================

    /// Start the flash and schedule the settled update that ends it
    fn start_celebration(&mut self) {
        let duration = Duration::from_millis(CELEBRATION_DURATION_MS);
        self.celebrating_until = Some(Instant::now() + duration);
        let seq = self.celebration_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let latest = self.state_tx.subscribe();
        let update_tx = self.update_tx.clone();
        let celebration_seq = Arc::clone(&self.celebration_seq);

        handle.spawn(async move {
            tokio::time::sleep(duration).await;
            if celebration_seq.load(Ordering::SeqCst) != seq {
                return;
            }
            let state = *latest.borrow();
            let output = ProgressOutput::new(
                state,
                GoalPhase::settled(state.current, state.target),
                ReasonCode::R104_CELEBRATION_ENDED,
                false,
                false,
            );
            let _ = update_tx.send(output);
        });
    }

    /// Is the goal-hit flash still running?
    pub fn is_celebrating(&self) -> bool {
        self.celebrating_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get current phase
    pub fn phase(&self) -> GoalPhase {
        if self.is_celebrating() {
            GoalPhase::Celebrating
        } else {
            GoalPhase::settled(self.state.current, self.state.target)
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn current(&self) -> f64 {
        self.state.current
    }

    pub fn target(&self) -> f64 {
        self.state.target
    }

    pub fn config(&self) -> &GoalConfig {
        &self.config
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Get update count
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Get current output without updating
    pub fn current_output(&self) -> ProgressOutput {
        self.unchanged()
    }
}

/// Drain the write queue in order, one store call at a time
async fn run_writer(store: Arc<dyn ProgressStore>, mut rx: mpsc::UnboundedReceiver<WriteJob>) {
    while let Some(job) = rx.recv().await {
        match job {
            WriteJob::Set(writes) => {
                for (key, value) in writes {
                    if let Err(e) = store.set(&key, value).await {
                        tracing::warn!(key = %key, value, error = %e, "progress write failed");
                    }
                }
            }
            WriteJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
