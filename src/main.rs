// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::fs::{self, File, OpenOptions};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

mod app;
use app::{Action, App, Phase};

mod content;
use content::{BundledSource, DirSource, Library};

mod countdown;

mod session;
use session::{Rating, StudyMode};

mod settings;
use settings::{REPEAT_RANGE, SettingsStore, TIMER_RANGE, project_dirs};

mod speech;
use speech::{CommandSpeaker, SilentSpeaker, Speaker};

mod ui;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::prelude::*;

const LOG_FILE: &str = "interview-wiz.log";

// --------------------------------------------------
// コマンドライン
// --------------------------------------------------

#[derive(Parser)]
#[command(name = "interview-wiz", version, about = "Spoken-English interview sentence drills")]
struct Cli {
    /// categories.json と各カテゴリファイルのあるディレクトリ (省略時は同梱データ)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// 設定ファイルのパス
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// 読み上げに使うプログラム (say, espeak-ng など)
    #[arg(long, global = true)]
    tts: Option<String>,

    /// 読み上げをしない
    #[arg(long, global = true)]
    mute: bool,

    /// ログの出力先
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// 学習を始める (既定)
    Drill,
    /// カテゴリ一覧を表示
    Categories,
    /// 設定を対話的に変更
    Configure,
    /// 現在の設定を表示
    Settings,
}

// --------------------------------------------------
// メイン関数
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone());

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(SettingsStore::default_path);

    match cli.command.unwrap_or(Command::Drill) {
        Command::Drill => run_drill(&cli, settings_path),
        Command::Categories => list_categories(&cli),
        Command::Configure => configure(settings_path),
        Command::Settings => show_settings(settings_path),
    }
}

/// TUI が端末を使うので、ログはファイルに出す
fn init_logging(path: Option<PathBuf>) {
    let path = path.or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(LOG_FILE)));
    let Some(path) = path else {
        return;
    };

    match open_log_file(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            log::info!("INTERVIEW WiZ starting up...");
        }
        Err(e) => eprintln!("{:#}", e),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))
}

fn open_library(data_dir: Option<&Path>) -> Result<Library> {
    let library = match data_dir {
        Some(dir) => {
            let source = DirSource::new(dir);
            log::info!("reading content from {}", source.root().display());
            Library::open(Box::new(source))
        }
        None => Library::open(Box::new(BundledSource)),
    };
    library.context("failed to load the category index")
}

fn make_speaker(cli: &Cli) -> Box<dyn Speaker> {
    if cli.mute {
        return Box::new(SilentSpeaker);
    }
    let speaker = match &cli.tts {
        Some(program) => CommandSpeaker::for_program(program),
        None => CommandSpeaker::platform_default(),
    };
    log::info!("speech program: {}", speaker.program());
    Box::new(speaker)
}

fn run_drill(cli: &Cli, settings_path: PathBuf) -> Result<()> {
    let library = open_library(cli.data_dir.as_deref())?;
    let settings = SettingsStore::open(settings_path);
    let mut app = App::new(library, settings, make_speaker(cli));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App) -> io::Result<()> {
    let mut last = Instant::now();

    loop {
        terminal.draw(|f| ui::ui(f, &app.view()))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c');
                    if ctrl_c {
                        break;
                    }
                    if app.notice().is_some() {
                        // 通知はどのキーでも閉じる
                        app.dispatch(Action::DismissNotice);
                    } else if is_quit(app.phase(), key.code) {
                        break;
                    } else if let Some(action) = action_for(app.phase(), key.code) {
                        app.dispatch(action);
                    }
                }
            }
        }

        // タイマー・遅延処理・読み上げを進める
        let now = Instant::now();
        app.tick(now - last);
        last = now;
    }

    log::info!("bye");
    Ok(())
}

fn is_quit(phase: Phase, code: KeyCode) -> bool {
    phase == Phase::Menu && matches!(code, KeyCode::Esc | KeyCode::Char('q'))
}

/// キー入力 → 操作 (画面ごと)
fn action_for(phase: Phase, code: KeyCode) -> Option<Action> {
    let action = match (phase, code) {
        (Phase::Menu, KeyCode::Up | KeyCode::Char('k')) => Action::SelectPrev,
        (Phase::Menu, KeyCode::Down | KeyCode::Char('j')) => Action::SelectNext,
        (Phase::Menu, KeyCode::Enter) => Action::StartSelected,
        (Phase::Menu, KeyCode::Char('r')) => Action::Start(StudyMode::Random),
        (Phase::Menu, KeyCode::Char('a')) => Action::Start(StudyMode::All),
        (Phase::Menu, KeyCode::Char('s')) => Action::OpenSettings,
        (Phase::Menu, KeyCode::Char('c')) => Action::ClearCache,

        (Phase::Settings, KeyCode::Up | KeyCode::Char('k')) => Action::SelectPrev,
        (Phase::Settings, KeyCode::Down | KeyCode::Char('j')) => Action::SelectNext,
        (Phase::Settings, KeyCode::Left | KeyCode::Char('h')) => Action::AdjustSetting(-1),
        (Phase::Settings, KeyCode::Right | KeyCode::Char('l')) => Action::AdjustSetting(1),
        (Phase::Settings, KeyCode::Enter | KeyCode::Char(' ')) => Action::ToggleSetting,
        (Phase::Settings, KeyCode::Esc | KeyCode::Char('q')) => Action::CloseSettings,

        (Phase::Prompt, KeyCode::Enter | KeyCode::Char(' ')) => Action::Reveal,
        (Phase::Prompt, KeyCode::Char('p')) => Action::TogglePause,

        (Phase::Answer, KeyCode::Char('1')) => Action::Rate(Rating::Easy),
        (Phase::Answer, KeyCode::Char('2')) => Action::Rate(Rating::Normal),
        (Phase::Answer, KeyCode::Char('3')) => Action::Rate(Rating::Hard),
        (Phase::Answer, KeyCode::Enter | KeyCode::Char('n')) => Action::Next,
        (Phase::Answer, KeyCode::Char(' ')) => Action::Replay,

        (Phase::Complete, KeyCode::Char('r')) => Action::Restart,
        (Phase::Complete, KeyCode::Enter | KeyCode::Char('h')) => Action::Home,

        (Phase::Prompt | Phase::Answer, KeyCode::Esc | KeyCode::Char('b')) => Action::Home,
        (Phase::Complete, KeyCode::Esc) => Action::Home,

        _ => return None,
    };
    Some(action)
}

// --------------------------------------------------
// TUI 以外のサブコマンド
// --------------------------------------------------

fn list_categories(cli: &Cli) -> Result<()> {
    let library = open_library(cli.data_dir.as_deref())?;
    let mut total = 0;
    for (i, c) in library.categories().iter().enumerate() {
        println!(
            "{:>2}. {} {}  {}",
            i + 1,
            c.emoji,
            style(&c.name).bold(),
            style(format!("{} sentences", c.count)).dim()
        );
        println!("    {}", style(&c.id).cyan());
        total += c.count;
    }
    println!("{}", style(format!("{} sentences in total", total)).green());
    Ok(())
}

fn configure(settings_path: PathBuf) -> Result<()> {
    let mut store = SettingsStore::open(settings_path);
    let current = store.settings();
    let theme = ColorfulTheme::default();

    let timer_duration: u32 = Input::with_theme(&theme)
        .with_prompt(format!(
            "Seconds to answer ({}-{})",
            TIMER_RANGE.0, TIMER_RANGE.1
        ))
        .default(current.timer_duration)
        .validate_with(|v: &u32| {
            if (TIMER_RANGE.0..=TIMER_RANGE.1).contains(v) {
                Ok(())
            } else {
                Err("out of range")
            }
        })
        .interact_text()?;

    let auto_play = Confirm::with_theme(&theme)
        .with_prompt("Show and read the answer when time is up?")
        .default(current.auto_play)
        .interact()?;

    let choices: Vec<String> = (REPEAT_RANGE.0..=REPEAT_RANGE.1)
        .map(|n| n.to_string())
        .collect();
    let picked = Select::with_theme(&theme)
        .with_prompt("How many times to read each answer")
        .items(&choices[..])
        .default(current.repeat_count.saturating_sub(REPEAT_RANGE.0) as usize)
        .interact()?;

    store.update(|s| {
        s.timer_duration = timer_duration;
        s.auto_play = auto_play;
        s.repeat_count = REPEAT_RANGE.0 + picked as u32;
    })?;
    println!(
        "{} {}",
        style("Saved").green().bold(),
        store.path().display()
    );
    Ok(())
}

fn show_settings(settings_path: PathBuf) -> Result<()> {
    let store = SettingsStore::open(settings_path);
    println!("{}", style(store.path().display()).dim());
    println!("{}", serde_json::to_string_pretty(&store.settings())?);
    Ok(())
}
