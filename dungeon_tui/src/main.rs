use anyhow::{Context, Result};
use clap::Parser;
use dungeon_core::{
    Dungeon, GeneratorConfig, LayoutGenerator,
    navigation::{ActionOutcome, GameOption, PlayerLocation, available_options, process_action},
    player::Player,
    save::{self, DEFAULT_SAVE_FILE, SaveGame},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::PathBuf,
    time::Duration,
};

/// How many past messages stay visible.
const MESSAGE_HISTORY: usize = 8;

#[derive(Parser, Debug)]
#[command(version, about = "Explore a procedurally generated dungeon", long_about = None)]
struct Args {
    /// Grid width; drawn from 3..=5 when omitted
    #[arg(long, requires = "height")]
    width: Option<usize>,

    /// Grid height; drawn from 3..=5 when omitted
    #[arg(long, requires = "width")]
    height: Option<usize>,

    /// Seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from a save file instead of generating
    #[arg(short, long, value_name = "SAVE_FILE")]
    load: Option<PathBuf>,

    /// Where 's' writes the game
    #[arg(long, value_name = "SAVE_FILE", default_value = DEFAULT_SAVE_FILE)]
    save: PathBuf,

    /// Log file (the terminal is taken over by the UI)
    #[arg(long, value_name = "LOG_FILE", default_value = "dungeon.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

struct App {
    dungeon: Dungeon,
    location: PlayerLocation,
    player: Player,
    /// Options offered in the current room, numbered from 1.
    options: Vec<GameOption>,
    messages: Vec<String>,
    save_path: PathBuf,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Flag to control if the game is over.
    game_over: bool,
}

impl App {
    fn new(game: SaveGame, save_path: PathBuf) -> Result<Self> {
        let options = available_options(&game.dungeon, &game.player_location)?;
        let mut app = App {
            dungeon: game.dungeon,
            location: game.player_location,
            player: game.player,
            options,
            messages: vec!["You enter the dungeon. Find the exit.".to_string()],
            save_path,
            should_quit: false,
            game_over: false,
        };
        app.check_game_over();
        Ok(app)
    }

    fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.messages.len() > MESSAGE_HISTORY {
            self.messages.remove(0);
        }
    }

    /// Applies the option numbered `choice`.
    fn choose(&mut self, choice: char) {
        if self.game_over {
            return;
        }
        match process_action(&self.dungeon, &mut self.location, &choice.to_string()) {
            Ok(ActionOutcome::Moved {
                direction,
                to,
                reached_exit,
            }) => {
                self.push_message(format!("You move {direction} to ({}, {}).", to.x, to.y));
                if reached_exit {
                    self.push_message("You have found the exit of the level!");
                }
            }
            Ok(ActionOutcome::Escaped) => {
                self.push_message("Congratulations! You escaped the dungeon.");
                self.game_over = true;
            }
            Err(e) => self.push_message(format!("Invalid option: {e}")),
        }
        match available_options(&self.dungeon, &self.location) {
            Ok(options) => self.options = options,
            Err(e) => {
                log::error!("lost track of the player: {e}");
                self.push_message(format!("Error: {e}"));
            }
        }
        self.check_game_over();
    }

    fn check_game_over(&mut self) {
        if !self.game_over && self.player.is_game_over() {
            self.push_message("Your health has run out. Game over.");
            self.game_over = true;
        }
    }

    fn save(&mut self) {
        let game = SaveGame {
            dungeon: self.dungeon.clone(),
            player_location: self.location,
            player: self.player.clone(),
        };
        match save::save_dungeon(&self.save_path, &game) {
            Ok(()) => self.push_message(format!("Game saved to {}.", self.save_path.display())),
            Err(e) => {
                log::error!("save failed: {e}");
                self.push_message(format!("Could not save: {e}"));
            }
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(&args)?;

    let game = match &args.load {
        Some(path) => save::load_dungeon(path)
            .with_context(|| format!("Failed to load save file {}", path.display()))?,
        None => new_game(&args)?,
    };
    let mut app = App::new(game, args.save.clone())?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Logs go to a file because stdout and stderr belong to the UI.
fn init_logging(args: &Args) -> Result<()> {
    use simplelog::LevelFilter::{Debug, Info, Off};

    let file = File::create(&args.log_file)
        .with_context(|| format!("Failed to create log file {}", args.log_file.display()))?;
    simplelog::WriteLogger::init(
        if args.verbose { Debug } else { Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        file,
    )
    .context("Failed to initialize logging")?;
    Ok(())
}

fn new_game(args: &Args) -> Result<SaveGame> {
    let mut generator = LayoutGenerator::new(GeneratorConfig::default(), args.seed);
    let dungeon = match (args.width, args.height) {
        (Some(width), Some(height)) => generator.generate(width, height)?,
        _ => generator.generate_random_size()?,
    };
    let player_location =
        PlayerLocation::at_start(&dungeon).context("Generated dungeon has no active level")?;
    log::info!(
        "new dungeon generated (seed {:?}), player at {}",
        args.seed,
        player_location.coords()
    );
    Ok(SaveGame {
        dungeon,
        player_location,
        player: Player::default(),
    })
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let poll_interval = Duration::from_millis(250);

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                        KeyCode::Char('s') => app.save(),
                        KeyCode::Char(c) if c.is_ascii_digit() => app.choose(c),
                        _ => {}
                    }
                }
            }
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),      // Current room
            Constraint::Min(4),         // Options
            Constraint::Percentage(35), // Messages
            Constraint::Length(2),      // Help
        ])
        .split(frame.area());

    render_room(frame, main_layout[0], app);
    render_options(frame, main_layout[1], app);
    render_messages(frame, main_layout[2], &app.messages);

    let help_text = Paragraph::new("Press a number to choose, 's' to save, 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[3]);
}

/// Describes the room the player stands in.
fn render_room(frame: &mut Frame, area: Rect, app: &App) {
    let here = app.location.coords();
    let level = app.dungeon.level(app.location.level);
    let player = &app.player;
    let mut lines = vec![
        Line::from(format!(
            "Position ({}, {}) on level {}",
            here.x, here.y, app.location.level
        )),
        Line::from(format!(
            "Health {}/{}  XP {}  Inventory: {}",
            player.health,
            player.max_health,
            player.experience,
            if player.inventory.is_empty() {
                "empty".to_string()
            } else {
                player.inventory.join(", ")
            }
        )),
    ];
    if let Some(level) = level {
        if let Some(room) = level.room(here) {
            lines.push(Line::from(Span::styled(
                room.id.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if here == level.exit_coords {
            lines.push(Line::from(Span::styled(
                "A large door stands before you. It seems to be the exit.",
                Style::default().fg(Color::Green).bold(),
            )));
        }
    }

    let room_widget =
        Paragraph::new(lines).block(Block::default().title("Dungeon").borders(Borders::ALL));
    frame.render_widget(room_widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = if app.game_over {
        vec![ListItem::new("The adventure is over. Press 'q' to quit.")]
    } else {
        app.options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let style = match option {
                    GameOption::Exit => Style::default().fg(Color::Green),
                    GameOption::Move { .. } => Style::default(),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::Yellow)),
                    Span::styled(option.label(), style),
                ]))
            })
            .collect()
    };

    let options_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Options"));
    frame.render_widget(options_widget, area);
}

fn render_messages(frame: &mut Frame, area: Rect, messages: &[String]) {
    let lines: Vec<Line> = messages.iter().map(|m| Line::from(m.as_str())).collect();
    let messages_widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Log"));
    frame.render_widget(messages_widget, area);
}
