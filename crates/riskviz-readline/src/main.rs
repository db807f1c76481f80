use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use riskviz_client::{AgentApiClient, ApiConfig, WorkbookApiClient};
use riskviz_core::conversation::{Message, MessageRole};
use riskviz_core::notify::Notifier;
use riskviz_core::pipeline::AgentPipeline;
use riskviz_core::workbook::WorkbookBackend;
use riskviz_infrastructure::JsonConversationRepository;

const SUGGESTED_PROMPTS: &[&str] = &[
    "What are the top safety risks in our facility?",
    "Show me incident trends for the last quarter",
    "How can we improve our safety training program?",
    "What are the most common types of near misses?",
    "Analyze the correlation between training and incidents",
    "What safety metrics should we track?",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/sheets".to_string(),
                "/sheet".to_string(),
                "/example".to_string(),
                "/reset".to_string(),
                "/health".to_string(),
                "/clear".to_string(),
                "/quit".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Notifier that renders transient notifications on stderr, the terminal
/// analog of a toast.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        eprintln!("{}", message.bright_green());
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message.bright_red());
    }
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}", format!("> {}", message.content).green()),
        MessageRole::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
}

/// The main entry point for the Riskviz chat REPL.
///
/// Sets up the HTTP clients from the environment, restores the persisted
/// conversation, and runs a rustyline loop that feeds questions to the agent
/// pipeline and slash commands to the workbook service.
#[tokio::main]
async fn main() -> Result<()> {
    // ===== Backend Initialization =====
    let config = ApiConfig::from_env();
    let agent = Arc::new(AgentApiClient::new(&config));
    let workbook = Arc::new(WorkbookApiClient::new(&config));
    let repository = Arc::new(JsonConversationRepository::default_location()?);
    let notifier = Arc::new(TerminalNotifier);

    let pipeline = AgentPipeline::new(agent, workbook.clone(), repository, notifier);
    pipeline.load().await?;

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Safety AI Agent ===".bright_magenta().bold());
    println!(
        "{}",
        "Ask questions about your safety data. '/sheets' lists sheets, '/clear' clears the chat, '/quit' exits."
            .bright_black()
    );
    println!();

    let history = pipeline.messages().await;
    if history.is_empty() {
        println!("{}", "Try asking:".bright_black());
        for prompt in SUGGESTED_PROMPTS {
            println!("{}", format!("  - {}", prompt).bright_black());
        }
        println!();
    } else {
        for message in &history {
            print_message(message);
        }
    }

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "/quit" || trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(command, &pipeline, workbook.as_ref()).await;
                    continue;
                }

                println!("{}", format!("> {}", trimmed).green());
                match pipeline.submit_question(trimmed).await {
                    Ok(Some(reply)) => print_message(&reply),
                    Ok(None) => {}
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(e) => {
                eprintln!("{}", format!("Readline error: {:?}", e).red());
                break;
            }
        }
    }

    Ok(())
}

async fn handle_command(command: &str, pipeline: &AgentPipeline, workbook: &WorkbookApiClient) {
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "sheets" => match pipeline.refresh_sheets().await {
            Ok(sheets) if sheets.is_empty() => {
                println!("{}", "No workbook loaded".bright_black());
            }
            Ok(sheets) => {
                for sheet in sheets {
                    println!(
                        "{}",
                        format!(
                            "  {} ({} rows, {} columns)",
                            sheet.name, sheet.row_count, sheet.column_count
                        )
                        .bright_black()
                    );
                }
            }
            Err(e) => eprintln!("{}", format!("Failed to list sheets: {}", e).red()),
        },
        "sheet" => {
            if arg.is_empty() {
                pipeline.select_sheet(None).await;
                println!("{}", "Sheet selection reset to automatic".bright_black());
            } else {
                pipeline.select_sheet(Some(arg.to_string())).await;
                println!("{}", format!("Using sheet '{}'", arg).bright_black());
            }
        }
        "example" => {
            // The pipeline notifies on both outcomes
            let _ = pipeline.load_example().await;
        }
        "reset" => match workbook.reset().await {
            Ok(()) => println!("{}", "Workbook reset".bright_black()),
            Err(e) => eprintln!("{}", format!("Failed to reset workbook: {}", e).red()),
        },
        "health" => match workbook.health_check().await {
            Ok(()) => println!("{}", "Backend is healthy".bright_green()),
            Err(e) => eprintln!("{}", format!("Backend unreachable: {}", e).red()),
        },
        "clear" => {
            if let Err(e) = pipeline.clear().await {
                eprintln!("{}", format!("Failed to clear conversation: {}", e).red());
            }
        }
        _ => println!("{}", "Unknown command".bright_black()),
    }
}
