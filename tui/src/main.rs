use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use directories::ProjectDirs;
use dotenvy::dotenv;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing_subscriber::EnvFilter;
use ud_core::Store;

mod app;
mod config;
mod feedback;

use crate::app::{AddField, App, Mode, handle_key};
use crate::config::{Cli, DICTIONARY_ENV, LOG_ENV, load_config, resolve_dictionary_path};
use crate::feedback::{SystemClipboard, get_cue_backend};

const TICK_MS: u64 = 100;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let data_dir = ProjectDirs::from("com", "urdudictionary", "Urdu Dictionary")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"));
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let log_path = env::var(LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join("dictionary.log"));
    init_logging(&log_path)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("config.toml"));
    let config = load_config(&config_path)?;

    let csv_path = resolve_dictionary_path(
        cli.dictionary.as_deref(),
        env::var(DICTIONARY_ENV).ok(),
        &config.dictionary,
        &data_dir,
    );
    let (store, load_error) = Store::open_or_empty(csv_path);

    let sound_enabled = config.feedback.sound_enabled && !cli.no_sound;
    let mut app = App::new(
        store,
        config.batch.slots,
        get_cue_backend(sound_enabled),
        Box::new(SystemClipboard::new()),
    );
    if let Some(err) = load_error {
        app.show_message(format!("Could not load the dictionary: {err}"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("error: {err}");
    }

    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(TICK_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

fn ui(frame: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    frame.render_widget(render_header(app), chunks[0]);
    match app.mode {
        Mode::Translate => render_translate(frame, app, chunks[1]),
        Mode::Batch => render_batch(frame, app, chunks[1]),
        Mode::AddWord => render_add(frame, app, chunks[1]),
        Mode::Browse => render_browse(frame, app, chunks[1]),
        Mode::Message => frame.render_widget(render_message(app), chunks[1]),
    }
    frame.render_widget(render_footer(app), chunks[2]);
}

fn active_style() -> Style {
    Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::BOLD)
}

fn input_box<'a>(value: &'a str, title: &'a str, active: bool) -> Paragraph<'a> {
    Paragraph::new(value)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(if active {
                    active_style()
                } else {
                    Style::default()
                }),
        )
        .wrap(Wrap { trim: false })
}

fn render_header(app: &App) -> Paragraph<'_> {
    let mut text = Text::default();
    text.lines.push(Line::from(format!(
        "Loaded translation file: {}",
        app.store.path().display()
    )));
    text.lines.push(Line::from(format!("Entries: {}", app.store.len())));

    Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("English to Urdu Dictionary"),
        )
        .wrap(Wrap { trim: true })
}

fn render_translate(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    frame.render_widget(
        input_box(&app.word_input, "Enter an English word to translate", true),
        chunks[0],
    );

    let result = Paragraph::new(Line::from(Span::styled(
        app.result.as_deref().unwrap_or(""),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title("Translation"))
    .wrap(Wrap { trim: false });
    frame.render_widget(result, chunks[1]);
}

fn render_add(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)].as_ref())
        .split(area);

    let mut text = Text::default();
    text.lines.push(Line::from("Add New Translation"));
    if let Some(message) = &app.message {
        text.lines.push(Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    let header = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Add"))
        .wrap(Wrap { trim: false });
    frame.render_widget(header, chunks[0]);

    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    frame.render_widget(
        input_box(&app.english_input, "English Word", app.add_field == AddField::English),
        boxes[0],
    );
    frame.render_widget(
        input_box(&app.urdu_input, "Urdu Translation", app.add_field == AddField::Urdu),
        boxes[1],
    );
}

fn render_batch(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut constraints = vec![Constraint::Length(3); app.batch_inputs.len()];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let titles: Vec<String> = (1..=app.batch_inputs.len())
        .map(|slot| format!("Word {slot}"))
        .collect();
    for (idx, input) in app.batch_inputs.iter().enumerate() {
        frame.render_widget(
            input_box(input, &titles[idx], idx == app.batch_selection),
            rows[idx],
        );
    }
}

fn render_browse(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let lines = app.browse_lines();
    let available = area.height.saturating_sub(2) as usize;
    let start = app
        .browse_scroll
        .min(lines.len().saturating_sub(available));
    let end = (start + available).min(lines.len());

    let mut text = Text::default();
    for (idx, line) in lines[start..end].iter().enumerate() {
        if start + idx == app.browse_scroll {
            text.lines.push(Line::from(Span::styled(
                line.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
        } else {
            text.lines.push(Line::from(line.clone()));
        }
    }

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Dictionary"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_message(app: &App) -> Paragraph<'_> {
    let message = app.message.clone().unwrap_or_default();
    Paragraph::new(message)
        .block(Block::default().borders(Borders::ALL).title("Message"))
        .wrap(Wrap { trim: false })
}

fn render_footer(app: &App) -> Paragraph<'_> {
    let info = match app.mode {
        Mode::Translate => {
            "Enter translate | Esc clear | Ctrl+Y copy | Ctrl+A add | Ctrl+B multiple | Ctrl+L browse | Ctrl+R reload | Ctrl+Q quit"
        }
        Mode::AddWord => "Enter save | Tab switch | Esc back | Ctrl+Q quit",
        Mode::Batch => "Up/Down or Tab move | Enter process | Esc back | Ctrl+Q quit",
        Mode::Browse => "Up/Down or j/k scroll | PgUp/PgDn page | Esc back | Ctrl+Q quit",
        Mode::Message => "Any key back | Ctrl+Q quit",
    };

    Paragraph::new(info).block(Block::default().borders(Borders::ALL).title("Keys"))
}
