//! The interactive chat loop

use crate::client::{AskBackend, AskClient, AskResponse};
use crate::config::Config;
use crate::error::AskError;
use crate::events::TuiEvent;
use crate::tui::{self, EventHandler};
use crate::ui::chat::{ChatAction, ChatController};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

type AskOutcome = Result<AskResponse, AskError>;

/// Run one request on its own task. Exactly one outcome is always sent,
/// even if the request task panics, so the in-flight flag gets reset.
pub fn spawn_query(
    backend: Arc<dyn AskBackend>,
    query: String,
    tx: mpsc::UnboundedSender<AskOutcome>,
) {
    tokio::spawn(async move {
        let request = tokio::spawn(async move { backend.ask(&query).await });
        let outcome = match request.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "ask task ended abnormally");
                Err(AskError::Interrupted)
            }
        };
        let _ = tx.send(outcome);
    });
}

/// Run the full-screen chat until the user quits
pub async fn run(config: Config) -> Result<()> {
    let client = AskClient::new(&config)?;
    info!(url = client.url(), "starting chat");
    let backend: Arc<dyn AskBackend> = Arc::new(client);

    let mut controller = ChatController::new(config.ui.clone());
    controller.initialize();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = event_loop(&mut terminal, &mut controller, backend).await;
    tui::restore()?;

    result
}

async fn event_loop(
    terminal: &mut tui::Tui,
    controller: &mut ChatController,
    backend: Arc<dyn AskBackend>,
) -> Result<()> {
    let mut events = EventHandler::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<AskOutcome>();

    loop {
        terminal.draw(|frame| controller.render(frame))?;
        controller.after_render();

        tokio::select! {
            Some(outcome) = rx.recv() => controller.finish_query(outcome),
            event = events.next() => match event {
                Some(TuiEvent::Key(key)) => match controller.handle_key(key) {
                    ChatAction::Ask(query) => spawn_query(backend.clone(), query, tx.clone()),
                    ChatAction::Exit => break,
                    ChatAction::None => {}
                },
                Some(TuiEvent::Paste(text)) => controller.handle_paste(&text),
                Some(TuiEvent::Resize) | Some(TuiEvent::Tick) => {}
                None => break,
            },
        }
    }

    info!("chat closed");
    Ok(())
}
