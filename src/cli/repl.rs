use std::io::{self, Write};
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::cli::App;
use crate::client::models::PaperFile;
use crate::flows::{AskOutcome, ANSWER_FALLBACK};
use crate::session::{Message, MessageKind, Session};

const HELP: &str = "\
Commands:
  /upload <path>   upload and analyze a PDF, then open it
  /sessions        list your papers
  /switch <n>      open paper number n
  /new             leave the current paper (back to upload)
  /delete <n>      delete paper number n
  /history         show the current transcript again
  /export [path]   write the current transcript to a text file
  /help            show this help
  /exit            quit
Anything else is a question about the open paper.";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Upload(String),
    Sessions,
    Switch(usize),
    New,
    Delete(usize),
    History,
    Export(Option<String>),
    Help,
    Exit,
    Ask(String),
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            return ReplCommand::Empty;
        }
        if !text.starts_with('/') {
            return ReplCommand::Ask(text.to_string());
        }

        let (name, arg) = match text.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (text, ""),
        };

        match name {
            "/upload" if arg.is_empty() => ReplCommand::Invalid("usage: /upload <path>".into()),
            "/upload" => ReplCommand::Upload(arg.to_string()),
            "/sessions" | "/list" => ReplCommand::Sessions,
            "/switch" => parse_position(arg, "/switch").map_or_else(|e| e, ReplCommand::Switch),
            "/new" => ReplCommand::New,
            "/delete" => parse_position(arg, "/delete").map_or_else(|e| e, ReplCommand::Delete),
            "/history" => ReplCommand::History,
            "/export" if arg.is_empty() => ReplCommand::Export(None),
            "/export" => ReplCommand::Export(Some(arg.to_string())),
            "/help" => ReplCommand::Help,
            "/exit" | "/quit" => ReplCommand::Exit,
            other => ReplCommand::Invalid(format!("unknown command {} (try /help)", other)),
        }
    }
}

fn parse_position(arg: &str, name: &str) -> Result<usize, ReplCommand> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReplCommand::Invalid(format!("usage: {} <n>", name))),
    }
}

pub async fn run_repl(app: App, initial_file: Option<PathBuf>) {
    run_repl_with(app, initial_file, BufReader::new(tokio::io::stdin())).await
}

/// Runs the prompt loop over any line source. Background uploads and questions
/// are awaited when input ends; `/exit` leaves without waiting for them.
pub async fn run_repl_with<R>(app: App, initial_file: Option<PathBuf>, input: R)
where
    R: AsyncBufRead + Unpin,
{
    println!("--- paperchat ---");
    println!("Backend: {}", app.backend.base_url());
    println!("Type /help for commands, /exit to quit.");
    println!("-----------------");

    let mut tasks = JoinSet::new();
    if let Some(path) = initial_file {
        start_upload(&app, &mut tasks, path.display().to_string());
    }

    let mut lines = input.lines();
    loop {
        while tasks.try_join_next().is_some() {}
        print_prompt(&app);

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Exit => {
                if !tasks.is_empty() {
                    debug!("Exiting with {} background tasks unfinished", tasks.len());
                }
                return;
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Invalid(msg) => println!("{}", msg),
            ReplCommand::Upload(path) => start_upload(&app, &mut tasks, path),
            ReplCommand::Sessions => list_sessions(&app),
            ReplCommand::New => {
                app.store.set_active(None);
                println!("No paper open. Use /upload <path> to add one.");
            }
            ReplCommand::Switch(n) => {
                let target = app.store.lock().nth(n).map(|s| s.id);
                match target {
                    Some(id) => {
                        app.store.set_active(Some(id));
                        if let Some(session) = app.store.get(id) {
                            print_transcript(&session);
                        }
                    }
                    None => println!("No paper number {}.", n),
                }
            }
            ReplCommand::Delete(n) => {
                let target = app.store.lock().nth(n).map(|s| (s.id, s.file_name.clone()));
                match target {
                    Some((id, name)) => {
                        app.store.delete_session(id);
                        println!("Deleted {}.", name);
                    }
                    None => println!("No paper number {}.", n),
                }
            }
            ReplCommand::History => match app.store.active() {
                Some(session) => print_transcript(&session),
                None => println!("No paper open."),
            },
            ReplCommand::Export(path) => export_active(&app, path).await,
            ReplCommand::Ask(question) => start_question(&app, &mut tasks, question),
        }
    }

    while tasks.join_next().await.is_some() {}
}

fn print_prompt(app: &App) {
    let label = app
        .store
        .active()
        .map(|s| s.file_name)
        .unwrap_or_else(|| "upload".to_string());
    print!("\n{}> ", label);
    let _ = io::stdout().flush();
}

fn print_message(message: &Message) {
    let speaker = match message.kind {
        MessageKind::User => "You",
        MessageKind::Assistant => "Assistant",
        MessageKind::Error => "Error",
    };
    println!("{}: {}", speaker, message.content);
}

fn print_transcript(session: &Session) {
    println!("=== {} ===", session.file_name);
    for message in session.transcript() {
        print_message(message);
    }
}

fn list_sessions(app: &App) {
    let store = app.store.lock();
    if store.is_empty() {
        println!("No papers uploaded yet.");
        return;
    }
    for (i, session) in store.sessions().iter().enumerate() {
        let marker = if store.active_id() == Some(session.id) { "*" } else { " " };
        println!(
            "{} {:>2}. {:<40} {:>3} messages  ({})",
            marker,
            i + 1,
            session.file_name,
            session.exchange_count(),
            session.created_at.format("%H:%M:%S")
        );
    }
}

fn start_upload(app: &App, tasks: &mut JoinSet<()>, path: String) {
    if app.upload.is_busy() {
        println!("An upload is already running; wait for it to finish.");
        return;
    }

    let upload = app.upload.clone();
    let store = app.store.clone();
    let notifier = app.notifier.clone();

    println!("Uploading {}...", path);
    tasks.spawn(async move {
        let file = match PaperFile::open(&path).await {
            Ok(file) => file,
            Err(e) => {
                notifier.error(&format!("Could not read {}: {}", path, e));
                return;
            }
        };

        if let Ok(paper) = upload.submit(&file).await {
            let session = store.create_session(paper.file_reference, &paper.file_name);
            println!();
            print_transcript(&session);
        }
    });
}

fn start_question(app: &App, tasks: &mut JoinSet<()>, question: String) {
    let Some(session) = app.store.active() else {
        println!("No paper open. Use /upload <path> or /switch <n> first.");
        return;
    };

    // Claimed here, before spawning, so a second line typed right away sees it.
    let pending = match app.conversation.begin(Some(&session), &question) {
        Ok(pending) => pending,
        Err(AskOutcome::Busy) => {
            println!("Still waiting for the previous answer about {}.", session.file_name);
            return;
        }
        Err(_) => return,
    };

    let conversation = app.conversation.clone();
    let store = app.store.clone();

    println!("(thinking...)");
    tasks.spawn(async move {
        let outcome = conversation.finish(pending).await;
        let still_open = store.lock().active_id() == Some(session.id);

        match outcome {
            AskOutcome::Skipped | AskOutcome::Busy => {}
            _ if !still_open => println!("\n[reply ready in {}]", session.file_name),
            AskOutcome::Answered(answer) => {
                println!();
                print_message(&Message::assistant(answer));
            }
            AskOutcome::Failed => {
                println!();
                print_message(&Message::error(ANSWER_FALLBACK));
            }
        }
    });
}

async fn export_active(app: &App, path: Option<String>) {
    let Some(session) = app.store.active() else {
        println!("No paper open.");
        return;
    };

    let export_path = path.unwrap_or_else(|| format!("session_{}.txt", session.id));
    match tokio::fs::write(&export_path, session.export_transcript()).await {
        Ok(()) => println!("Transcript exported to: {}", export_path),
        Err(e) => app.notifier.error(&format!("Failed to export {}: {}", export_path, e)),
    }
}
