mod config;
mod console;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use askprompt_auth::{AuthBackend, AuthClient, LoginFlow, LoginOutcome, AUTHENTICATED_ROUTE};
use askprompt_core::{
    classify_intent, matching_rule, normalize_text, FormField, FormVariant, OAuthProvider,
};
use askprompt_observability::{init_tracing, SessionMetrics};
use askprompt_session::{ChatController, RewriteBackend, SendReport};
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::config::AppConfig;
use crate::console::{render_message, ConsoleNotifier, SystemClipboard};

#[derive(Debug, Parser)]
#[command(name = "askprompt")]
#[command(about = "Turn casual requests into structured AI prompts")]
struct Cli {
    /// Use the in-memory identity provider instead of the hosted one.
    #[arg(long, global = true, env = "ASKPROMPT_OFFLINE")]
    offline: bool,

    /// Print machine-readable results.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat {
        #[arg(long)]
        demo: bool,
        #[arg(long)]
        rewrite_url: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Simulated latency of the local template rewriter.
        #[arg(long)]
        latency_ms: Option<u64>,
    },
    Classify {
        text: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    MagicLink {
        #[arg(long)]
        email: String,
    },
    Oauth {
        #[arg(long)]
        provider: String,
        /// Skip the prompt and exchange this code right away.
        #[arg(long)]
        code: Option<String>,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("askprompt_cli", "warn");
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    match cli.command {
        Command::Chat {
            demo,
            rewrite_url,
            timeout_secs,
            latency_ms,
        } => {
            if demo {
                config.demo_mode = true;
            }
            if let Some(url) = rewrite_url {
                config.rewrite_url = Some(url);
            }
            if let Some(seconds) = timeout_secs.filter(|seconds| *seconds > 0) {
                config.rewrite_timeout = Duration::from_secs(seconds);
            }

            let rewriter = config.build_rewriter(latency_ms.map(Duration::from_millis))?;
            run_chat(&config, rewriter, cli.json).await?;
        }
        Command::Classify { text } => {
            let normalized = normalize_text(&text);
            let report = json!({
                "normalized": normalized,
                "intent": classify_intent(&text),
                "rule": matching_rule(&normalized).map(|rule| rule.name()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_line("Password: ")?,
            };
            let mut flow = login_flow(&config, cli.offline, FormVariant::EmailPassword)?;
            flow.set_field(FormField::Email, email);
            flow.set_field(FormField::Password, password);
            let outcome = flow.submit().await;
            report_outcome(&outcome, cli.json)?;
        }
        Command::MagicLink { email } => {
            let mut flow = login_flow(&config, cli.offline, FormVariant::EmailOnly)?;
            flow.set_field(FormField::Email, email);
            let outcome = flow.submit().await;
            report_outcome(&outcome, cli.json)?;
        }
        Command::Oauth { provider, code } => {
            let provider = OAuthProvider::parse(&provider)
                .ok_or_else(|| anyhow!("unsupported provider {provider}"))?;
            let client = config.build_auth(cli.offline)?;

            let redirect = client
                .sign_in_with_provider(provider, &config.oauth_redirect)
                .await
                .map_err(|err| anyhow!(err.message))?;
            println!("Open this URL to continue with {}:\n{}\n", provider.as_str(), redirect.authorize_url);

            let code = match code {
                Some(code) => code,
                None => prompt_line("Paste the `code` from the redirect: ")?,
            };
            let session = client
                .complete_provider_sign_in(code.trim())
                .await
                .map_err(|err| anyhow!(err.message))
                .context("provider sign-in failed")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                println!(
                    "Signed in as {} -> {AUTHENTICATED_ROUTE}",
                    session.user.email.as_deref().unwrap_or(&session.user.id)
                );
            }
        }
        Command::ResetPassword { email } => {
            let mut flow = login_flow(&config, cli.offline, FormVariant::EmailOnly)?;
            flow.set_field(FormField::Email, email);
            let outcome = flow.request_password_reset().await;
            report_outcome(&outcome, cli.json)?;
        }
    }

    Ok(())
}

async fn run_chat(config: &AppConfig, rewriter: RewriteBackend, json: bool) -> Result<()> {
    let backend = rewriter.name();
    if let RewriteBackend::Http(http) = &rewriter {
        println!("Rewriting through {}", http.endpoint());
    }
    let mut controller = ChatController::new(
        config.session_config(),
        rewriter,
        Arc::new(ConsoleNotifier::default()),
        SessionMetrics::shared(),
    );

    println!("AskPrompt chat ({backend} rewriter). /copy N, /history, /metrics, /quit.");
    print_history(&controller);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim_end_matches(['\r', '\n']);
        let command = input.trim();
        if command.eq_ignore_ascii_case("/quit") || command.eq_ignore_ascii_case("exit") {
            break;
        }
        if command == "/history" {
            print_history(&controller);
            continue;
        }
        if command == "/metrics" {
            let snapshot = controller.metrics().snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            continue;
        }
        if let Some(index) = command.strip_prefix("/copy") {
            copy_by_index(&mut controller, index.trim());
            continue;
        }

        match controller.send(input).await? {
            SendReport::Answered { reply } | SendReport::Rewritten { reply } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&reply)?);
                } else {
                    let index = controller.session().messages().len();
                    println!("\n{}", render_message(index, &reply, false));
                }
            }
            SendReport::Failed(_) | SendReport::Rejected(_) => {}
        }
    }

    Ok(())
}

fn print_history(controller: &ChatController<RewriteBackend>) {
    let session = controller.session();
    let copied = session.recently_copied();
    for (position, message) in session.messages().iter().enumerate() {
        let marked = copied == Some(message.id.as_str());
        println!("{}", render_message(position + 1, message, marked));
    }
}

fn copy_by_index(controller: &mut ChatController<RewriteBackend>, raw: &str) {
    let Some(id) = raw
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| controller.session().messages().get(index))
        .map(|message| message.id.clone())
    else {
        println!("usage: /copy N, where N is a message number from /history");
        return;
    };

    // Failures already surfaced as a notice.
    let _ = controller.copy(&id, &SystemClipboard);
}

fn login_flow(
    config: &AppConfig,
    offline: bool,
    variant: FormVariant,
) -> Result<LoginFlow<AuthBackend>> {
    let client = config.build_auth(offline)?;
    Ok(LoginFlow::new(
        variant,
        client,
        config.oauth_redirect.clone(),
        Arc::new(ConsoleNotifier::default()),
        SessionMetrics::shared(),
    ))
}

fn report_outcome(outcome: &LoginOutcome, json: bool) -> Result<()> {
    if json {
        let value = match outcome {
            LoginOutcome::Invalid(errors) => json!({ "status": "invalid", "field_errors": errors }),
            LoginOutcome::Authenticated { route, session } => {
                json!({ "status": "authenticated", "route": route, "session": session })
            }
            LoginOutcome::MagicLinkSent { email } => json!({ "status": "email_sent", "email": email }),
            LoginOutcome::PasswordResetSent { email } => {
                json!({ "status": "reset_requested", "email": email })
            }
            LoginOutcome::Failed(err) => json!({ "status": "failed", "error": err.message }),
            LoginOutcome::Busy => json!({ "status": "busy" }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match outcome {
            LoginOutcome::Invalid(errors) => {
                for (field, message) in errors {
                    eprintln!("{}: {message}", field.as_str());
                }
            }
            LoginOutcome::Authenticated { route, session } => {
                println!(
                    "Signed in as {} -> {route}",
                    session.user.email.as_deref().unwrap_or(&session.user.id)
                );
            }
            LoginOutcome::MagicLinkSent { .. }
            | LoginOutcome::PasswordResetSent { .. }
            | LoginOutcome::Failed(_)
            | LoginOutcome::Busy => {}
        }
    }

    match outcome {
        LoginOutcome::Authenticated { .. }
        | LoginOutcome::MagicLinkSent { .. }
        | LoginOutcome::PasswordResetSent { .. } => Ok(()),
        _ => Err(anyhow!("sign-in did not complete")),
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed reading from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
