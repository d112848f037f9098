use coinscope::app::App;
use coinscope::data::{HttpTransport, MarketClient};
use coinscope::config::{self, AppConfig};
use coinscope::logging;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let path = config::config_path();
    let loaded = config::load_config(&path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    logging::init(&config.log_file)?;
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, path = %path.display(), "ignoring config file, using defaults");
    }
    tracing::info!(base_url = %config.base_url, top_n = config.top_n, "starting");

    let transport = HttpTransport::new(config.request_timeout())?;
    let client = MarketClient::new(&config.base_url, transport);
    let mut app = App::new(client, &config);

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let result = app.run(&mut terminal).await;

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = config::save_window(&path, app.window()) {
        tracing::warn!(error = %e, path = %path.display(), "chart window not saved");
    }

    result?;
    Ok(())
}
