use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chat_logging::chat_warn;
use chatbot_core::{update, AttachedFile, Msg, SessionState, SessionViewModel};
use chatbot_engine::BackendSettings;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::EffectRunner;
use crate::tui;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Shell-local UI state that never belongs in the session core.
#[derive(Default)]
pub struct Shell {
    pub focus: InputFocus,
    pub path_input: String,
    pub path_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    Question,
    FilePath,
}

pub fn run(settings: BackendSettings) -> Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let effects = EffectRunner::new(settings, msg_tx.clone())
        .map_err(|err| anyhow::anyhow!("engine startup failed: {err}"))?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = event_loop(&mut terminal, &effects, msg_tx, msg_rx);
    tui::restore()?;
    result
}

fn event_loop(
    terminal: &mut tui::Tui,
    effects: &EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
) -> Result<()> {
    let epoch = Instant::now();
    let mut state = SessionState::new();
    let mut shell = Shell::default();
    let mut view = state.view();
    let mut should_quit = false;

    terminal.draw(|frame| ui::render(frame, &view, &shell))?;

    loop {
        let mut shell_dirty = false;
        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    shell_dirty = handle_key(key, &view, &mut shell, &msg_tx, &mut should_quit);
                }
                Event::Resize(_, _) => shell_dirty = true,
                _ => {}
            }
        }

        if should_quit {
            let _ = msg_tx.send(Msg::QuitRequested);
        }
        let now_ms = epoch.elapsed().as_millis() as u64;
        let _ = msg_tx.send(Msg::Tick { now_ms });

        let mut dirty = shell_dirty;
        while let Ok(msg) = msg_rx.try_recv() {
            let (next, pending_effects) = update(std::mem::take(&mut state), msg);
            state = next;
            effects.enqueue(pending_effects);
            if state.consume_dirty() {
                dirty = true;
            }
        }

        if should_quit {
            return Ok(());
        }
        if dirty {
            view = state.view();
            terminal.draw(|frame| ui::render(frame, &view, &shell))?;
        }
    }
}

/// Translates one key press into session messages or shell-local edits.
/// Returns whether shell-only state changed and a redraw is due.
fn handle_key(
    key: KeyEvent,
    view: &SessionViewModel,
    shell: &mut Shell,
    msg_tx: &mpsc::Sender<Msg>,
    should_quit: &mut bool,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        *should_quit = true;
        return false;
    }

    match shell.focus {
        InputFocus::Question => match key.code {
            KeyCode::Char('o') if ctrl => {
                shell.focus = InputFocus::FilePath;
                shell.path_input.clear();
                shell.path_error = None;
                true
            }
            KeyCode::Char('x') if ctrl => {
                let _ = msg_tx.send(Msg::AttachmentCleared);
                false
            }
            KeyCode::Enter => {
                let _ = msg_tx.send(Msg::Submitted);
                false
            }
            KeyCode::Esc => {
                shell.path_error = None;
                let _ = msg_tx.send(Msg::AlertDismissed);
                true
            }
            KeyCode::Backspace => {
                let mut text = view.input.clone();
                text.pop();
                let _ = msg_tx.send(Msg::InputChanged(text));
                false
            }
            KeyCode::Char(c) if !ctrl => {
                let mut text = view.input.clone();
                text.push(c);
                let _ = msg_tx.send(Msg::InputChanged(text));
                false
            }
            _ => false,
        },
        InputFocus::FilePath => match key.code {
            KeyCode::Esc => {
                shell.focus = InputFocus::Question;
                true
            }
            KeyCode::Enter => {
                shell.focus = InputFocus::Question;
                let path = shell.path_input.trim().to_string();
                if !path.is_empty() {
                    match load_attachment(Path::new(&path)) {
                        Ok(file) => {
                            shell.path_error = None;
                            let _ = msg_tx.send(Msg::FileSelected(file));
                        }
                        Err(err) => {
                            chat_warn!("could not read attachment {}: {}", path, err);
                            shell.path_error =
                                Some(format!("No se pudo leer el archivo: {path}"));
                        }
                    }
                }
                true
            }
            KeyCode::Backspace => {
                shell.path_input.pop();
                true
            }
            KeyCode::Char(c) if !ctrl => {
                shell.path_input.push(c);
                true
            }
            _ => false,
        },
    }
}

fn load_attachment(path: &Path) -> std::io::Result<AttachedFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("documento.pdf")
        .to_string();
    Ok(AttachedFile {
        name,
        mime: mime_for_path(path).to_string(),
        bytes,
    })
}

fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
