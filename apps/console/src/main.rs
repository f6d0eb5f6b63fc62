use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use machine_core::{SequenceController, ViewPresenter};
use shared::{
    domain::{CandidateId, ViewName},
    error::MachineError,
    tally::TallyStore,
};
use storage::FileTallyStore;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

mod config;
mod ui;

use config::load_settings;
use ui::{TerminalBell, TerminalPresenter};

#[derive(Parser, Debug)]
struct Args {
    /// Machine configuration file.
    #[arg(long, default_value = "machine.toml")]
    config: PathBuf,
    /// Overrides the tally record location from the config.
    #[arg(long)]
    tally_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(path) = args.tally_path {
        settings.tally_path = path.display().to_string();
    }

    let store = Arc::new(FileTallyStore::open(&settings.tally_path).await?);
    let tally = store.load().await;
    info!(
        path = %settings.tally_path,
        total = tally.total(),
        "tally record loaded"
    );

    let presenter = Arc::new(TerminalPresenter::new());
    let controller = SequenceController::new(
        settings.registry()?,
        settings.timings(),
        store,
        Arc::new(TerminalBell),
        presenter.clone(),
    );
    presenter.attach(controller.clone());
    presenter.show(ViewName::Ballot).await;

    println!("digits cast a vote | n: next voter | r: retry record | reset: operator reset | clear: clear tally | q: quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "q" | "quit" => break,
            "n" => report(controller.on_next_voter().await),
            "r" => report(controller.on_retry_record().await),
            "reset" => report(controller.operator_reset().await),
            "clear" => confirm_and_clear(&controller, &mut lines).await?,
            other => match other.parse::<i64>() {
                Ok(id) => spawn_vote(&controller, CandidateId(id)),
                Err(_) => {
                    println!("unrecognized input '{other}'");
                }
            },
        }
    }

    Ok(())
}

fn spawn_vote(controller: &SequenceController, candidate_id: CandidateId) {
    let controller = controller.clone();
    tokio::spawn(async move {
        if let Err(error) = controller.on_candidate_selected(candidate_id).await {
            warn!(%error, "vote sequence did not complete");
            println!("rejected: {error}");
        }
    });
}

async fn confirm_and_clear(
    controller: &SequenceController,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    println!("SECRET ACTION: clear all votes? y/N");
    let confirm = lines.next_line().await?.unwrap_or_default();
    if confirm.trim().eq_ignore_ascii_case("y") {
        report(controller.on_clear_tally().await);
    } else {
        println!("clear aborted");
    }
    Ok(())
}

fn report(result: Result<(), MachineError>) {
    if let Err(error) = result {
        println!("rejected: {error}");
    }
}
