pub mod commands;
pub mod repl;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::cli::commands::Commands;
use crate::client::{
    models::{FileReference, PaperFile},
    HttpBackend, RemoteService,
};
use crate::config::AppConfig;
use crate::flows::conversation::ANSWER_FAILED_NOTICE;
use crate::flows::{Conversation, UploadFlow, ANSWER_FALLBACK};
use crate::notify::{Notifier, TerminalNotifier};
use crate::session::StoreHandle;

/// Everything a front end needs, wired against one backend and one store.
#[derive(Clone)]
pub struct App {
    pub backend: Arc<HttpBackend>,
    pub store: StoreHandle,
    pub notifier: Arc<dyn Notifier>,
    pub upload: Arc<UploadFlow>,
    pub conversation: Arc<Conversation>,
}

impl App {
    pub fn new(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let backend = Arc::new(HttpBackend::new(config.backend.base_url.clone()));
        let service: Arc<dyn RemoteService> = backend.clone();
        let store = StoreHandle::new();

        Self {
            upload: Arc::new(UploadFlow::new(service.clone(), notifier.clone())),
            conversation: Arc::new(Conversation::new(service, store.clone(), notifier.clone())),
            backend,
            store,
            notifier,
        }
    }
}

pub async fn run_cli(command: Commands, config: AppConfig) -> ExitCode {
    let app = App::new(&config, Arc::new(TerminalNotifier));

    match command {
        Commands::Chat { file } => {
            repl::run_repl(app, file).await;
            ExitCode::SUCCESS
        }
        Commands::Upload { path } => upload_once(&app, &path).await,
        Commands::Ask { pdf_id, question } => ask_once(&app, pdf_id, &question).await,
        Commands::Health => match app.backend.health().await {
            Ok(text) => {
                println!("{} is up: {}", app.backend.base_url(), text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Backend at {} is unreachable: {}", app.backend.base_url(), e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn upload_once(app: &App, path: &Path) -> ExitCode {
    let file = match PaperFile::open(path).await {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match app.upload.submit(&file).await {
        Ok(paper) => {
            println!("{}\t{}", paper.file_reference, paper.file_name);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// One question against an already uploaded paper. Nothing is recorded in the store.
async fn ask_once(app: &App, pdf_id: String, question: &str) -> ExitCode {
    let question = question.trim();
    if question.is_empty() {
        eprintln!("Nothing to ask: the question is empty.");
        return ExitCode::FAILURE;
    }

    let file_reference = FileReference::new(pdf_id);
    match app.backend.ask_question(&file_reference, question).await {
        Ok(answer) => {
            println!("{}", answer);
            ExitCode::SUCCESS
        }
        Err(e) => {
            app.notifier.error(ANSWER_FAILED_NOTICE);
            eprintln!("{} ({})", ANSWER_FALLBACK, e);
            ExitCode::FAILURE
        }
    }
}
