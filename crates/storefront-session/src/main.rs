//! storefront-session - drive the storefront sign-in flows from a terminal.
//!
//! Each invocation plays one page load: the session is hydrated from local
//! storage, one flow runs, and Ctrl-C tears the page down.

mod terminal;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use storefront_session_core::flows::request_url;
use storefront_session_core::{
    AuthContext, CallbackOutcome, Config, PageScope, VerificationOutcome, VerificationPresentation,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use terminal::{TerminalAlerts, TerminalNavigator};

#[derive(Parser)]
#[command(name = "storefront-session", version, about = "Storefront session and credential lifecycle")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify an emailed magic link
    Verify {
        /// Link URL or path, e.g. /verify-email?token=...
        url: String,
        #[arg(long, value_enum, default_value_t = Presentation::Customer)]
        presentation: Presentation,
    },
    /// Complete an identity-provider redirect
    Callback {
        /// Callback URL or path, e.g. /auth/callback?token=...
        url: String,
    },
    /// Finish a callback that was interrupted after its token was saved
    Resume,
    /// Sign out
    Logout {
        /// Skip the confirmation prompt
        #[arg(long, conflicts_with = "cancel")]
        confirm: bool,
        /// Back out without signing out
        #[arg(long)]
        cancel: bool,
    },
    /// Show the current session
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum Presentation {
    Customer,
    Registration,
}

impl From<Presentation> for VerificationPresentation {
    fn from(p: Presentation) -> Self {
        match p {
            Presentation::Customer => VerificationPresentation::customer(),
            Presentation::Registration => VerificationPresentation::registration(),
        }
    }
}

/// Log file name prefix when a log directory is configured
const LOG_FILE_PREFIX: &str = "storefront-session.log";

/// Initialize the tracing subscriber for logging
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Tear the page down on Ctrl-C so late responses are ignored.
fn teardown_on_interrupt(scope: &PageScope) {
    let scope = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, tearing down page");
            scope.teardown();
        }
    });
}

fn prompt_confirmation() -> Result<bool> {
    print!("Sign out? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;
    let _log_guard = init_tracing(&config);
    debug!(api = %config.api_base_url, "Config loaded");

    let tokens = config.open_token_store()?;
    let client = config.identity_client()?;
    let ctx = AuthContext::hydrate(
        Arc::new(client),
        tokens,
        Arc::new(TerminalNavigator),
        Arc::new(TerminalAlerts),
        config.routes.clone(),
    );

    let scope = PageScope::new();
    teardown_on_interrupt(&scope);

    match cli.command {
        Command::Verify { url, presentation } => {
            let request = request_url(&url).context("Invalid verification URL")?;
            let flow = ctx.verification(presentation.into());

            let printer = spawn_outcome_printer(flow.subscribe());
            let outcome = flow.run(&request, &scope).await;
            finish_printer(printer, &outcome).await;
            if let VerificationOutcome::Failure(_) = outcome {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Callback { url } => {
            let request = request_url(&url).context("Invalid callback URL")?;
            return Ok(report_callback(ctx.oauth_callback().run(&request, &scope).await));
        }
        Command::Resume => {
            if !ctx.tokens.has_pending_callback()? {
                println!("Nothing to resume");
                return Ok(ExitCode::SUCCESS);
            }
            return Ok(report_callback(ctx.oauth_callback().resume(&scope).await));
        }
        Command::Logout { confirm, cancel } => {
            let flow = ctx.logout();
            if !cancel && (confirm || prompt_confirmation()?) {
                flow.confirm();
            } else {
                flow.cancel();
            }
        }
        Command::Status => {
            let session = ctx.session.snapshot();
            match session.user() {
                Some(user) => {
                    println!("Signed in as {}", user.display_name().unwrap_or("(unnamed)"));
                    println!("{}", serde_json::to_string_pretty(user)?);
                }
                None => println!("Signed out"),
            }
            if ctx.tokens.has_pending_callback()? {
                println!("A sign-in was interrupted; run `storefront-session resume`");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_callback(outcome: CallbackOutcome) -> ExitCode {
    match outcome {
        CallbackOutcome::SignedIn(user) => {
            println!("Signed in as {}", user.display_name().unwrap_or("(unnamed)"));
            ExitCode::SUCCESS
        }
        CallbackOutcome::Failed(_) => ExitCode::FAILURE,
        CallbackOutcome::Abandoned => {
            println!("Page closed before sign-in finished");
            ExitCode::FAILURE
        }
    }
}

/// Echoes each published outcome until a terminal one has been printed.
fn spawn_outcome_printer(
    mut outcomes: watch::Receiver<VerificationOutcome>,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut printed = Vec::new();
        while outcomes.changed().await.is_ok() {
            let outcome = outcomes.borrow_and_update().clone();
            println!("{}", outcome.message());
            printed.push(outcome.message().to_string());
            if outcome.is_terminal() {
                break;
            }
        }
        printed
    })
}

/// A terminal outcome is always printed before returning. A torn-down run
/// never publishes one, so its printer is stopped instead.
async fn finish_printer(
    printer: JoinHandle<Vec<String>>,
    outcome: &VerificationOutcome,
) -> Vec<String> {
    if outcome.is_terminal() {
        printer.await.unwrap_or_default()
    } else {
        printer.abort();
        Vec::new()
    }
}
