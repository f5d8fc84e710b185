use cheque_reminder::{
    fetch::{Fetcher, SharedLinkSource},
    logging,
    notify::smtp::SmtpSender,
    run, Config, RunOutcome,
};
use chrono::Local;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    logging::init();

    std::panic::set_hook(Box::new(|info| {
        error!("panic: {}", info);
    }));

    info!("cheque reminder starting");

    // ─── 2) configuration ────────────────────────────────────────────
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "configuration loaded");

    // ─── 3) wire the pipeline ────────────────────────────────────────
    let fetcher = match Fetcher::new() {
        Ok(f) => f,
        Err(e) => {
            error!(error = %format!("{:#}", e), "could not build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let source = SharedLinkSource::new(config.shared_url.clone(), fetcher);
    let sender = SmtpSender::from_config(&config);
    let today = Local::now().date_naive();

    // ─── 4) run once ─────────────────────────────────────────────────
    match run(&source, &sender, today) {
        Ok(RunOutcome::Sent { reminders, target }) => {
            info!(reminders, due_date = %target, "reminder check completed; email sent");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::NothingDue {
            cheque_payments,
            target,
        }) => {
            info!(cheque_payments, due_date = %target, "reminder check completed; nothing due");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "reminder check failed");
            ExitCode::FAILURE
        }
    }
}
