// ABOUTME: CLI entrypoint for the little-plans command
// ABOUTME: Handles session gating, error exit codes and command dispatch

use clap::Parser;
use indicatif::ProgressBar;
use little_plans::{
    api::StoreClient,
    auth::{resolve_credentials, Credentials, Session},
    cli::{Cli, Commands},
    config::{log_level, Settings},
    docx::AltChunkConverter,
    editor::ExternalEditor,
    page::{EditFollowUp, Page, Services},
    platform::{DirectorySink, StdoutNotifier, SystemClipboard},
    DocumentId, Error, Result,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// How long `edit --copy` keeps the selection for a clipboard manager to take.
const EDIT_CLIPBOARD_HOLD: Duration = Duration::from_secs(2);

fn main() {
    if let Err(e) = run() {
        eprintln!("little-plans: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn open_session(settings: &Settings, creds: Credentials) -> Result<Session> {
    let user_id = match creds.user_id {
        Some(id) => id,
        None => {
            let client = StoreClient::new(
                settings.api_base.clone(),
                settings.anon_key.clone(),
                creds.access_token.clone(),
            )?;
            client
                .current_user_id()
                .map_err(|e| Error::Auth(format!("token rejected: {}", e)))?
        }
    };

    Ok(Session {
        access_token: creds.access_token,
        user_id,
    })
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::from_cli(&cli)?;

    let creds = resolve_credentials(
        cli.token.clone(),
        cli.user_id.clone(),
        Some(settings.paths.session_file.as_path()),
    )?;
    let session = creds.map(|c| open_session(&settings, c)).transpose()?;

    let command = cli.command();
    let clipboard = match command {
        Commands::Copy { .. } => SystemClipboard::until_replaced(),
        _ => SystemClipboard::holding(EDIT_CLIPBOARD_HOLD),
    };
    let services = Services {
        notifier: Box::new(StdoutNotifier),
        clipboard: Box::new(clipboard),
        downloads: Box::new(DirectorySink::new(settings.paths.download_dir.clone())),
        converter: Box::new(AltChunkConverter),
    };

    let pb = spinner("Fetching documents...");
    let page = Page::open(
        session,
        |session| {
            StoreClient::new(
                settings.api_base.clone(),
                settings.anon_key.clone(),
                session.access_token.clone(),
            )
        },
        settings.platform,
        services,
    );
    pb.finish_and_clear();
    let mut page = page?;
    settings.paths.ensure_dirs()?;

    match command {
        Commands::List => {
            println!("{}", page.list().to_table());
        }
        Commands::Download { id, open } => {
            if let Some(path) = page.download(&DocumentId::new(id))? {
                println!("Saved {}", path.display());
                if open {
                    open::that(&path)?;
                }
            }
        }
        Commands::Show { id } => {
            page.edit(&DocumentId::new(id))?;
            println!("{}", page.lightbox().info());
            println!("{}", page.editor().get_html());
            page.close();
        }
        Commands::Copy { id } => {
            page.edit(&DocumentId::new(id))?;
            if cfg!(target_os = "linux") {
                eprintln!("Holding the clipboard until something else is copied...");
            }
            let copied = page.copy();
            page.close();
            copied?;
        }
        Commands::Edit {
            id,
            download,
            copy,
            discard,
        } => {
            page.edit(&DocumentId::new(id))?;

            let editor = ExternalEditor::from_env(settings.paths.tmp_dir.clone());
            let edited = match editor.edit(&page.editor().get_html()) {
                Ok(html) => html,
                Err(e) => {
                    page.close();
                    return Err(e);
                }
            };
            page.set_editor_html(&edited);

            let outcome = page.finish_edit(EditFollowUp {
                copy,
                download,
                discard,
            })?;
            if let Some(path) = outcome.downloaded {
                println!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}
