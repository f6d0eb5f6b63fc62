use std::{sync::Arc, time::Duration};

use shared::{
    domain::{
        CandidateId, GlobalIndicator, PendingVote, SequenceState, SlipArtifact, ViewName,
    },
    error::MachineError,
    tally::{Tally, TallyStore},
};
use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, error, info, warn};

pub mod audio;
pub mod registry;
pub mod view;

pub use audio::{AudioSignal, SilentAudio};
pub use registry::CandidateRegistry;
pub use view::{NullPresenter, ViewPresenter};

/// Timing policy for one vote-casting cycle. The hold window approximates
/// the regulatory slip-display duration and must stay configurable.
#[derive(Debug, Clone)]
pub struct Timings {
    /// Pause between locking the ballot and switching to the slip view.
    pub lock_delay: Duration,
    /// Slip entrance travel, off-screen to resting position.
    pub slip_enter: Duration,
    /// Window during which the slip stays visible and static.
    pub slip_hold: Duration,
    /// Slip exit travel before the artifact is removed.
    pub slip_exit: Duration,
    pub beep_frequency_hz: u32,
    pub beep_duration: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            lock_delay: Duration::from_millis(1000),
            slip_enter: Duration::from_millis(800),
            slip_hold: Duration::from_millis(7000),
            slip_exit: Duration::from_millis(600),
            beep_frequency_hz: 3000,
            beep_duration: Duration::from_millis(2000),
        }
    }
}

/// Point-in-time render surface for the ballot, slip and tally views.
#[derive(Debug, Clone)]
pub struct MachineSnapshot {
    pub state: SequenceState,
    pub global: GlobalIndicator,
    pub lit_candidate: Option<CandidateId>,
    pub printing: bool,
    pub slip: Option<SlipArtifact>,
    pub tally: Tally,
    pub total: u64,
}

struct MachineState {
    phase: SequenceState,
    pending: Option<PendingVote>,
    global: GlobalIndicator,
    lit_candidate: Option<CandidateId>,
    printing: bool,
    slip: Option<SlipArtifact>,
}

impl MachineState {
    fn new() -> Self {
        Self {
            phase: SequenceState::Idle,
            pending: None,
            global: GlobalIndicator::Ready,
            lit_candidate: None,
            printing: false,
            slip: None,
        }
    }
}

struct ControllerInner {
    registry: CandidateRegistry,
    timings: Timings,
    store: Arc<dyn TallyStore>,
    audio: Arc<dyn AudioSignal>,
    presenter: Arc<dyn ViewPresenter>,
    state: Mutex<MachineState>,
}

/// The voting sequence controller: owns the machine's single sequence
/// state and drives the ordered, timed protocol from candidate selection
/// through slip display to the durable tally.
///
/// Selections are disabled for the whole Locked..TallyShown span, which is
/// the machine's only concurrency control: it keeps at most one pending
/// vote in flight without locks or queues. The state mutex is never held
/// across a timed suspension point.
#[derive(Clone)]
pub struct SequenceController {
    inner: Arc<ControllerInner>,
}

impl SequenceController {
    pub fn new(
        registry: CandidateRegistry,
        timings: Timings,
        store: Arc<dyn TallyStore>,
        audio: Arc<dyn AudioSignal>,
        presenter: Arc<dyn ViewPresenter>,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                registry,
                timings,
                store,
                audio,
                presenter,
                state: Mutex::new(MachineState::new()),
            }),
        }
    }

    pub fn registry(&self) -> &CandidateRegistry {
        &self.inner.registry
    }

    pub async fn snapshot(&self) -> MachineSnapshot {
        let tally = self.inner.store.snapshot().await;
        let state = self.inner.state.lock().await;
        MachineSnapshot {
            state: state.phase,
            global: state.global,
            lit_candidate: state.lit_candidate,
            printing: state.printing,
            slip: state.slip.clone(),
            total: tally.total(),
            tally,
        }
    }

    /// Runs one complete vote-casting sequence for the selected candidate.
    ///
    /// Valid only while the ballot is open (`Idle`); a selection arriving
    /// mid-sequence is rejected, never queued. Returns once the tally view
    /// is shown, or with a `Persistence` error if the vote could not be
    /// made durable, in which case the sequence halts in `Recording` for
    /// `on_retry_record` or `operator_reset`.
    pub async fn on_candidate_selected(
        &self,
        candidate_id: CandidateId,
    ) -> Result<(), MachineError> {
        let slip = {
            let mut state = self.inner.state.lock().await;
            if state.phase != SequenceState::Idle {
                warn!(
                    state = ?state.phase,
                    candidate_id = candidate_id.0,
                    "selection ignored; ballot is locked"
                );
                return Err(MachineError::InvalidTransition {
                    state: state.phase,
                    action: "candidate_selected",
                });
            }
            let candidate = self
                .inner
                .registry
                .get(candidate_id)
                .ok_or(MachineError::UnknownCandidate(candidate_id))?;

            state.phase = SequenceState::Locked;
            state.global = GlobalIndicator::Busy;
            state.lit_candidate = Some(candidate_id);
            state.pending = Some(PendingVote { candidate_id });
            SlipArtifact::for_candidate(candidate)
        };
        info!(candidate_id = candidate_id.0, "ballot locked; vote sequence started");

        let timings = &self.inner.timings;
        sleep(timings.lock_delay).await;

        self.inner.presenter.show(ViewName::Slip).await;
        {
            let mut state = self.inner.state.lock().await;
            state.phase = SequenceState::SlipEntering;
            state.slip = Some(slip);
            state.printing = true;
        }
        sleep(timings.slip_enter).await;

        self.set_phase(SequenceState::SlipHolding).await;
        sleep(timings.slip_hold).await;

        self.set_phase(SequenceState::SlipExiting).await;
        sleep(timings.slip_exit).await;

        {
            let mut state = self.inner.state.lock().await;
            state.slip = None;
            state.printing = false;
            state.phase = SequenceState::Recording;
        }

        if let Err(e) = self.inner.store.record(candidate_id).await {
            error!(
                candidate_id = candidate_id.0,
                error = %e,
                "vote not recorded; sequence halted, retry or escalate"
            );
            return Err(e);
        }
        self.complete_recording(candidate_id).await;
        Ok(())
    }

    /// Retries the durable write after a failed `Recording` phase. The
    /// pending vote is already counted in memory, so the retry persists
    /// without incrementing again.
    pub async fn on_retry_record(&self) -> Result<(), MachineError> {
        let candidate_id = {
            let state = self.inner.state.lock().await;
            match (state.phase, state.pending) {
                (SequenceState::Recording, Some(pending)) => pending.candidate_id,
                _ => {
                    warn!(state = ?state.phase, "retry ignored; no halted recording");
                    return Err(MachineError::InvalidTransition {
                        state: state.phase,
                        action: "retry_record",
                    });
                }
            }
        };

        if let Err(e) = self.inner.store.flush().await {
            error!(error = %e, "retry failed; vote still not durable");
            return Err(e);
        }
        self.complete_recording(candidate_id).await;
        Ok(())
    }

    /// Opens a fresh ballot after the tally has been shown.
    pub async fn on_next_voter(&self) -> Result<(), MachineError> {
        {
            let mut state = self.inner.state.lock().await;
            if state.phase != SequenceState::TallyShown {
                warn!(state = ?state.phase, "next-voter ignored outside tally view");
                return Err(MachineError::InvalidTransition {
                    state: state.phase,
                    action: "next_voter",
                });
            }
            state.global = GlobalIndicator::Ready;
            state.lit_candidate = None;
            state.phase = SequenceState::Idle;
        }
        self.inner.presenter.show(ViewName::Ballot).await;
        info!("ballot reopened for next voter");
        Ok(())
    }

    /// Administrative wholesale reset of the tally. Permitted only while
    /// no vote is in flight; the caller is responsible for operator
    /// confirmation before invoking it.
    pub async fn on_clear_tally(&self) -> Result<(), MachineError> {
        let rerender = {
            let state = self.inner.state.lock().await;
            match state.phase {
                SequenceState::Idle => false,
                SequenceState::TallyShown => true,
                other => {
                    warn!(state = ?other, "clear-tally ignored while a vote is in flight");
                    return Err(MachineError::InvalidTransition {
                        state: other,
                        action: "clear_tally",
                    });
                }
            }
        };

        self.inner.store.clear().await?;
        info!("tally cleared by administrative action");
        if rerender {
            self.inner.presenter.show(ViewName::Tally).await;
        }
        Ok(())
    }

    /// Operator-level escape from a halted `Recording` phase. This is an
    /// administrative override, not a normal transition: the pending vote
    /// stays in the in-memory tally but may not be durable.
    pub async fn operator_reset(&self) -> Result<(), MachineError> {
        {
            let mut state = self.inner.state.lock().await;
            if state.phase != SequenceState::Recording {
                warn!(state = ?state.phase, "operator reset ignored; no halted recording");
                return Err(MachineError::InvalidTransition {
                    state: state.phase,
                    action: "operator_reset",
                });
            }
            warn!(
                pending = ?state.pending,
                "operator reset; reopening ballot without a durable record"
            );
            state.pending = None;
            state.slip = None;
            state.printing = false;
            state.lit_candidate = None;
            state.global = GlobalIndicator::Ready;
            state.phase = SequenceState::Idle;
        }
        self.inner.presenter.show(ViewName::Ballot).await;
        Ok(())
    }

    async fn complete_recording(&self, candidate_id: CandidateId) {
        let timings = &self.inner.timings;
        self.inner
            .audio
            .play(timings.beep_frequency_hz, timings.beep_duration)
            .await;

        {
            let mut state = self.inner.state.lock().await;
            state.pending = None;
            state.lit_candidate = None;
            state.global = GlobalIndicator::Off;
            state.phase = SequenceState::TallyShown;
        }
        self.inner.presenter.show(ViewName::Tally).await;
        info!(candidate_id = candidate_id.0, "vote recorded; tally shown");
    }

    async fn set_phase(&self, phase: SequenceState) {
        let mut state = self.inner.state.lock().await;
        debug!(from = ?state.phase, to = ?phase, "sequence phase transition");
        state.phase = phase;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
