//! Terminal rendering of the machine views and the confirmation tone.

use std::{io::Write, sync::OnceLock, time::Duration};

use async_trait::async_trait;
use machine_core::{AudioSignal, MachineSnapshot, SequenceController, ViewPresenter};
use shared::domain::{GlobalIndicator, ViewName};
use tracing::debug;

/// Renders the active view as ASCII on stdout. Each `show` redraws the
/// target view from a fresh controller snapshot, so re-entering the same
/// view always reflects current state.
pub struct TerminalPresenter {
    controller: OnceLock<SequenceController>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            controller: OnceLock::new(),
        }
    }

    /// Wires the controller in after construction; the controller itself
    /// owns the presenter, so this closes the loop.
    pub fn attach(&self, controller: SequenceController) {
        let _ = self.controller.set(controller);
    }
}

#[async_trait]
impl ViewPresenter for TerminalPresenter {
    async fn show(&self, view: ViewName) {
        let Some(controller) = self.controller.get() else {
            return;
        };
        let snapshot = controller.snapshot().await;
        match view {
            ViewName::Ballot => render_ballot(controller, &snapshot),
            ViewName::Slip => render_slip(&snapshot),
            ViewName::Tally => render_tally(controller, &snapshot),
        }
    }
}

fn lamp(on: bool) -> &'static str {
    if on {
        "(*)"
    } else {
        "( )"
    }
}

fn global_lamp(global: GlobalIndicator) -> &'static str {
    match global {
        GlobalIndicator::Ready => "READY",
        GlobalIndicator::Busy => "BUSY",
        GlobalIndicator::Off => "-",
    }
}

fn render_ballot(controller: &SequenceController, snapshot: &MachineSnapshot) {
    println!();
    println!("==== BALLOT UNIT ==== status: {}", global_lamp(snapshot.global));
    for candidate in controller.registry().iter() {
        println!(
            "  {:>2}  {:<24} {}  [press {}]",
            candidate.id.0,
            candidate.name,
            lamp(snapshot.lit_candidate == Some(candidate.id)),
            candidate.id.0,
        );
    }
    println!("=====================");
}

fn render_slip(snapshot: &MachineSnapshot) {
    println!();
    println!("==== VVPAT WINDOW ==== printing: {}", lamp(snapshot.printing));
    match &snapshot.slip {
        Some(slip) => {
            println!("  +------------------------+");
            println!("  | {:<22} |", slip.serial);
            println!("  | {:<22} |", slip.candidate_name);
            println!("  | {:<22} |", slip.symbol_ref);
            println!("  +------------------------+");
        }
        None => println!("  (slip printing...)"),
    }
    println!("======================");
}

fn render_tally(controller: &SequenceController, snapshot: &MachineSnapshot) {
    println!();
    println!("==== TALLY ====");
    for candidate in controller.registry().iter() {
        println!(
            "  {:<24} {:>5}",
            candidate.name,
            snapshot.tally.count(candidate.id)
        );
    }
    println!("  {:<24} {:>5}", "TOTAL VOTES", snapshot.total);
    println!("===============");
    println!("press 'n' for the next voter");
}

/// Terminal-bell confirmation tone. The BEL byte carries no frequency, so
/// the configured pitch is only logged; the playback window is still
/// honoured because it gates the tally view.
pub struct TerminalBell;

#[async_trait]
impl AudioSignal for TerminalBell {
    async fn play(&self, frequency_hz: u32, duration: Duration) {
        print!("\x07");
        let _ = std::io::stdout().flush();
        debug!(frequency_hz, duration_ms = duration.as_millis() as u64, "confirmation tone");
        tokio::time::sleep(duration).await;
    }
}
