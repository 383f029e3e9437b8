//! Detective Desk console
//!
//! A line-oriented front end: open a case, ask questions, buy hints.
//! Usage: `detective-desk [config.toml]`

use anyhow::Context;
use chrono::Utc;
use detective_desk::game::{HintPayment, ResyncReport};
use detective_desk::storage::{FileStore, SharedStore};
use detective_desk::{CaseSession, CaseType, Desk, DeskConfig, ScriptedEngine, Speaker};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

struct Console {
    desk: Desk,
    session: Option<CaseSession>,
    running: bool,
}

impl Console {
    /// Process a command and return output lines
    async fn process_command(&mut self, line: &str) -> anyhow::Result<Vec<String>> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        if command.is_empty() {
            return Ok(vec![]);
        }

        let now = Utc::now();

        match command.to_lowercase().as_str() {
            "help" | "?" => Ok(vec![
                "  cases                      - List case types and their energy cost".to_string(),
                "  start <type>               - Open a case (homicide, missing, heist)".to_string(),
                "  ask <question>             - Question the scene (bare text works too)".to_string(),
                "  hint [credit|energy|rewarded] - Unlock a hint".to_string(),
                "  bonus                      - Claim the daily bonus".to_string(),
                "  status                     - Balances and current case".to_string(),
                "  history                    - Closed cases".to_string(),
                "  abandon                    - Drop the current case".to_string(),
                "  quit                       - Leave the desk".to_string(),
            ]),

            "cases" => Ok(CaseType::ALL
                .iter()
                .map(|t| format!("  {:<16} {} energy  {}", t.display_name(), t.energy_cost(), t.tagline()))
                .collect()),

            "start" => {
                if self.session.is_some() {
                    return Ok(vec!["A case is already open. Finish or abandon it first.".to_string()]);
                }
                let Some(case_type) = CaseType::from_slug(rest) else {
                    return Ok(vec![format!("Unknown case type: '{}'", rest)]);
                };
                match self.desk.start_case(case_type, now).await? {
                    Some(session) => {
                        let snapshot = session.snapshot();
                        let mut out = vec![
                            format!("== {} ==", snapshot.title()),
                            snapshot.synopsis().to_string(),
                        ];
                        out.extend(snapshot.turns().iter().map(|t| format!("> {}", t.text)));
                        self.session = Some(session);
                        Ok(out)
                    }
                    None => {
                        let economy = self.desk.economy().await;
                        Ok(vec![format!(
                            "Not enough energy ({} needed, {} left). Next refill in {} min.",
                            case_type.energy_cost(),
                            economy.energy(),
                            economy.time_until_next_refill(now).num_minutes()
                        )])
                    }
                }
            }

            "ask" => self.ask(rest).await,

            "hint" => {
                let payment = if rest.is_empty() {
                    HintPayment::Credit
                } else {
                    match HintPayment::from_slug(rest) {
                        Some(payment) => payment,
                        None => return Ok(vec![format!("Unknown payment: '{}'", rest)]),
                    }
                };
                let Some(session) = self.session.as_mut() else {
                    return Ok(vec!["No open case.".to_string()]);
                };
                match self.desk.unlock_hint(session, payment, now).await? {
                    Some(hint) => Ok(vec![format!("[hint via {}] {}", hint.method.label(), hint.text)]),
                    None => Ok(vec!["Hint not available.".to_string()]),
                }
            }

            "bonus" => {
                if self.desk.claim_daily_bonus(now).await? {
                    Ok(vec!["Daily bonus claimed: +1 energy, +1 hint credit.".to_string()])
                } else {
                    let wait = self.desk.economy().await.time_until_daily_bonus(now);
                    Ok(vec![format!("Bonus already claimed. Back in {} min.", wait.num_minutes())])
                }
            }

            "status" => {
                let economy = self.desk.economy().await;
                let mut out = vec![
                    format!("Energy: {}/{}", economy.energy(), economy.max_energy()),
                    format!("Hint credits: {}", economy.hint_credits()),
                    format!("Subscription: {}", if economy.has_subscription() { "active" } else { "none" }),
                ];
                if let Some(session) = &self.session {
                    let snapshot = session.snapshot();
                    out.push(format!("Case: {} [{}]", snapshot.title(), snapshot.status()));
                    out.extend(snapshot.clues().iter().map(|c| format!("  clue: {}", c.brief())));
                    out.extend(
                        snapshot
                            .suspects()
                            .iter()
                            .map(|s| format!("  suspect: {} ({}) - {}", s.name, s.occupation, s.trust)),
                    );
                }
                Ok(out)
            }

            "history" => {
                let history = self.desk.history().await;
                if history.is_empty() {
                    return Ok(vec!["No closed cases yet.".to_string()]);
                }
                Ok(history
                    .logs()
                    .iter()
                    .map(|log| {
                        format!(
                            "  {}  {:<24} {:<20} {} turns",
                            log.date.format("%Y-%m-%d %H:%M"),
                            log.title,
                            log.status,
                            log.turns
                        )
                    })
                    .collect())
            }

            "abandon" => match self.session.take() {
                Some(session) => {
                    self.desk.abandon(session).await?;
                    Ok(vec!["Case abandoned.".to_string()])
                }
                None => Ok(vec!["No open case.".to_string()]),
            },

            "quit" | "exit" => {
                self.running = false;
                Ok(vec!["Case files locked. Goodnight, detective.".to_string()])
            }

            _ => self.ask(line).await,
        }
    }

    async fn ask(&mut self, question: &str) -> anyhow::Result<Vec<String>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(vec!["No open case. Try 'start homicide'.".to_string()]);
        };

        let before = session.snapshot().turns().len();
        if !self.desk.ask(session, question, Utc::now()).await? {
            return Ok(vec![]);
        }

        let snapshot = session.snapshot();
        let mut out: Vec<String> = snapshot.turns()[before..]
            .iter()
            .filter(|t| t.speaker == Speaker::Engine)
            .flat_map(|t| {
                std::iter::once(format!("> {}", t.text))
                    .chain(t.new_clues.iter().map(|c| format!("  new clue: {}", c.title)))
            })
            .collect();

        if session.is_closed() {
            out.push(format!("Case closed: {}", snapshot.status()));
            self.session = None;
        }
        Ok(out)
    }
}

/// Warning shown when a resumed case could not be fully replayed
fn resume_notice(report: &ResyncReport) -> Option<String> {
    if report.aligned {
        return None;
    }
    Some(format!(
        "Warning: the saved case could only be partly restored ({} of {} steps); \
         some earlier responses may repeat.",
        report.replayed, report.expected
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DeskConfig::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => DeskConfig::default(),
    };

    let store: SharedStore = Arc::new(
        FileStore::open(&config.storage.path)
            .await
            .with_context(|| format!("opening {}", config.storage.path.display()))?,
    );
    let engine = Arc::new(ScriptedEngine::default().with_latency(config.engine.latency()));
    let desk = Desk::open(config, store, engine, Utc::now()).await?;

    let session = match desk.resume(Utc::now()).await? {
        Some((session, report)) => {
            if let Some(notice) = resume_notice(&report) {
                println!("{}", notice);
            }
            println!("Resumed '{}'.", session.snapshot().title());
            if !session.input_text().is_empty() {
                println!("Unsent draft: {}", session.input_text());
            }
            Some(session)
        }
        None => None,
    };

    let mut console = Console {
        desk,
        session,
        running: true,
    };

    println!("Detective Desk v{}. Type 'help' for commands.", detective_desk::VERSION);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while console.running {
        stdout.write_all(b"desk> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match console.process_command(&line).await {
            Ok(output) => {
                for line in output {
                    println!("{}", line);
                }
            }
            Err(e) => println!("Error: {:#}", e),
        }
    }

    Ok(())
}
