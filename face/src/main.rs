//! Otto Face Entry Point
//!
//! Launches the terminal face and the voice loop behind it.
//!
//! Usage:
//!   otto-face
//!
//! Configuration is read from `~/.config/otto/otto.toml`; see
//! `otto_core::OttoConfig` for the knobs. `RUST_LOG` controls logging.

use std::io;
use std::panic;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use otto_core::speech::{ScriptedRecognizer, SilentSynthesizer};
use otto_core::{Assistant, AssistantHandle, OttoConfig};
use otto_face::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("otto-face requires a terminal (TTY)");
        std::process::exit(1);
    }

    let config = OttoConfig::load()?;
    let handle = AssistantHandle::new();

    // Voice loop on its own task. Real microphone/synthesizer backends
    // plug in through the SpeechRecognizer/SpeechSynthesizer traits; the
    // default wiring replays a short demo conversation.
    let voice_handle = handle.clone();
    let voice_config = config.clone();
    tokio::spawn(async move {
        let recognizer = ScriptedRecognizer::new(vec![
            format!("{} are you there", voice_config.wake_word),
            "set a timer for one minute".to_string(),
        ]);
        match Assistant::new(
            &voice_config,
            voice_handle,
            Box::new(recognizer),
            Box::new(SilentSynthesizer),
        ) {
            Ok(mut assistant) => {
                if let Err(err) = assistant.run().await {
                    tracing::warn!(error = %err, "voice loop ended with error");
                }
            }
            Err(err) => tracing::warn!(error = %err, "voice loop failed to start"),
        }
    });

    // Restore the terminal even when we panic mid-frame
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&config, handle, &mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    config: &OttoConfig,
    handle: AssistantHandle,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> anyhow::Result<()> {
    let mut app = App::new(config, handle)?;
    app.run(terminal).await
}
