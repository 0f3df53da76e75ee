// ============================================
// src/app.rs
// アプリ全体の状態 (画面遷移・タイマー・遅延処理・読み上げ)
// ============================================

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::content::{CacheInfo, Category, Library, Origin};
use crate::countdown::{Countdown, Urgency};
use crate::session::{Rating, Session, SessionLabel, Stats, StudyMode, shuffle};
use crate::settings::{Settings, SettingsStore};
use crate::speech::{SpeechSequencer, Speaker};

/// 答えを出してから読み上げ開始まで
pub const ANSWER_SPEECH_DELAY: Duration = Duration::from_millis(500);
/// 評価してから次の問題まで (選択表示を見せる)
pub const RATING_ADVANCE_DELAY: Duration = Duration::from_millis(1000);

// --------------------------------------------------
// 入力と状態
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    /// メニューから開く設定画面
    Settings,
    /// 韓国語を表示、タイマー作動中
    Prompt,
    /// 英語を表示、タイマー停止
    Answer,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    TimerDuration,
    AutoPlay,
    RepeatCount,
}

impl SettingField {
    pub const ALL: [SettingField; 3] = [
        SettingField::TimerDuration,
        SettingField::AutoPlay,
        SettingField::RepeatCount,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let pos = self.position();
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        Self::ALL[next]
    }
}

/// ユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectPrev,
    SelectNext,
    StartSelected,
    Start(StudyMode),
    OpenSettings,
    CloseSettings,
    AdjustSetting(i32),
    ToggleSetting,
    ClearCache,
    Reveal,
    TogglePause,
    Next,
    Replay,
    Rate(Rating),
    Restart,
    Home,
    DismissNotice,
}

/// 時間差で実行する処理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    PlayAnswer,
    Advance,
}

#[derive(Debug)]
struct Pending {
    left: Duration,
    what: Deferred,
}

// --------------------------------------------------
// 描画用のビュー
// --------------------------------------------------

pub struct View<'a> {
    /// 閉じるまで他の操作を受け付けない通知
    pub notice: Option<&'a str>,
    pub screen: Screen<'a>,
}

pub struct StudyHeader<'a> {
    pub label: &'a SessionLabel,
    pub progress: (usize, usize),
    pub origin: Option<&'a Origin>,
}

pub enum Screen<'a> {
    Menu {
        categories: &'a [Category],
        selected: usize,
        cache: CacheInfo,
    },
    Settings {
        settings: Settings,
        selected: SettingField,
    },
    Prompt {
        header: StudyHeader<'a>,
        korean: &'a str,
        time_left: u32,
        urgency: Urgency,
        timer_running: bool,
    },
    Answer {
        header: StudyHeader<'a>,
        korean: &'a str,
        english: &'a str,
        pronunciation: String,
        speaking: bool,
        rating: Option<Rating>,
    },
    Complete {
        label: &'a SessionLabel,
        stats: Stats,
    },
}

// --------------------------------------------------
// アプリ本体
// --------------------------------------------------

pub struct App {
    library: Library,
    settings: SettingsStore,
    speaker: Box<dyn Speaker>,
    sequencer: SpeechSequencer,
    rng: StdRng,

    phase: Phase,
    session: Option<Session>,
    countdown: Countdown,
    pending: Vec<Pending>,

    menu_cursor: usize,
    settings_cursor: SettingField,
    /// 直前に押した評価 (次の問題に移るまで表示)
    selected_rating: Option<Rating>,
    notice: Option<String>,
}

impl App {
    pub fn new(library: Library, settings: SettingsStore, speaker: Box<dyn Speaker>) -> Self {
        Self::with_rng(library, settings, speaker, StdRng::from_os_rng())
    }

    pub fn with_rng(
        library: Library,
        settings: SettingsStore,
        speaker: Box<dyn Speaker>,
        rng: StdRng,
    ) -> Self {
        Self {
            library,
            settings,
            speaker,
            sequencer: SpeechSequencer::new(),
            rng,
            phase: Phase::Menu,
            session: None,
            countdown: Countdown::new(),
            pending: Vec::new(),
            menu_cursor: 0,
            settings_cursor: SettingField::TimerDuration,
            selected_rating: None,
            notice: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> Settings {
        self.settings.settings()
    }

    #[cfg(test)]
    pub fn time_left(&self) -> u32 {
        self.countdown.time_left()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[cfg(test)]
    pub fn is_speaking(&self) -> bool {
        self.sequencer.is_playing()
    }

    /// 操作を処理する。今の画面で意味のない操作は無視
    pub fn dispatch(&mut self, action: Action) {
        if self.notice.is_some() {
            if action == Action::DismissNotice {
                self.notice = None;
            }
            return;
        }

        match (self.phase, action) {
            (Phase::Menu, Action::SelectPrev) => self.move_menu_cursor(false),
            (Phase::Menu, Action::SelectNext) => self.move_menu_cursor(true),
            (Phase::Menu, Action::StartSelected) => {
                let id = self
                    .library
                    .categories()
                    .get(self.menu_cursor)
                    .map(|c| c.id.clone());
                if let Some(id) = id {
                    self.start(StudyMode::Category(id));
                }
            }
            (Phase::Menu, Action::Start(mode)) => self.start(mode),
            (Phase::Menu, Action::OpenSettings) => self.phase = Phase::Settings,
            (Phase::Menu, Action::ClearCache) => self.library.clear_cache(),

            (Phase::Settings, Action::SelectPrev) => {
                self.settings_cursor = self.settings_cursor.step(false)
            }
            (Phase::Settings, Action::SelectNext) => {
                self.settings_cursor = self.settings_cursor.step(true)
            }
            (Phase::Settings, Action::AdjustSetting(delta)) => self.change_setting(delta),
            (Phase::Settings, Action::ToggleSetting) => {
                if self.settings_cursor == SettingField::AutoPlay {
                    self.change_setting(1);
                }
            }
            (Phase::Settings, Action::CloseSettings) => self.phase = Phase::Menu,

            (Phase::Prompt, Action::Reveal) => self.reveal(),
            (Phase::Prompt, Action::TogglePause) => self.toggle_pause(),

            (Phase::Answer, Action::Next) => self.advance(),
            (Phase::Answer, Action::Replay) => self.play_answer(),
            (Phase::Answer, Action::Rate(rating)) => self.rate(rating),

            (Phase::Complete, Action::Restart) => self.restart(),

            (Phase::Prompt | Phase::Answer | Phase::Complete, Action::Home) => self.go_home(),

            (phase, action) => log::trace!("ignored {:?} in {:?}", action, phase),
        }
    }

    /// 経過時間を進める (タイマー・遅延処理・読み上げ)
    pub fn tick(&mut self, elapsed: Duration) {
        let mut due = Vec::new();
        self.pending.retain_mut(|p| {
            p.left = p.left.saturating_sub(elapsed);
            if p.left.is_zero() {
                due.push(p.what);
                false
            } else {
                true
            }
        });

        if self.countdown.tick(elapsed) && self.phase == Phase::Prompt {
            if self.settings().auto_play {
                self.reveal();
            } else {
                log::debug!("time up, waiting for manual reveal");
            }
        }

        for what in due {
            if self.phase != Phase::Answer {
                continue;
            }
            match what {
                Deferred::PlayAnswer => self.play_answer(),
                Deferred::Advance => self.advance(),
            }
        }

        self.sequencer.tick(self.speaker.as_mut(), elapsed);
    }

    // --------------------------------------------------
    // 画面遷移
    // --------------------------------------------------

    fn start(&mut self, mode: StudyMode) {
        let (label, sentences) = match mode {
            StudyMode::Category(id) => match self.library.load_category(&id) {
                Ok(payload) => (
                    SessionLabel::new(
                        payload.category.name.clone(),
                        payload.category.emoji.clone(),
                    ),
                    payload.sentences.clone(),
                ),
                Err(e) => {
                    self.notify(format!("Could not load category data: {}", e));
                    return;
                }
            },
            StudyMode::Random => {
                let all = self.library.load_all();
                (
                    SessionLabel::new("Random Mode", "🔀"),
                    shuffle(&all, &mut self.rng),
                )
            }
            StudyMode::All => (
                SessionLabel::new("All Sentences", "📚"),
                self.library.load_all(),
            ),
        };

        log::info!(
            "study started: {} ({} sentences)",
            label.name,
            sentences.len()
        );
        self.clear_transients();
        self.session = Some(Session::new(label, sentences));
        self.show_prompt();
    }

    fn show_prompt(&mut self) {
        let complete = self.session.as_ref().is_none_or(Session::is_complete);
        if complete {
            self.show_complete();
            return;
        }
        self.phase = Phase::Prompt;
        self.selected_rating = None;
        self.countdown.start(self.settings().timer_duration);
    }

    fn reveal(&mut self) {
        self.countdown.reset();
        self.phase = Phase::Answer;
        self.selected_rating = None;
        if self.settings().auto_play {
            self.schedule(Deferred::PlayAnswer, ANSWER_SPEECH_DELAY);
        }
    }

    fn play_answer(&mut self) {
        let repeat = self.settings().repeat_count;
        if let Some(sentence) = self.session.as_ref().and_then(Session::current) {
            self.sequencer
                .play(self.speaker.as_mut(), &sentence.english, repeat);
        }
    }

    fn rate(&mut self, rating: Rating) {
        if self.pending.iter().any(|p| p.what == Deferred::Advance) {
            log::debug!("rating ignored, already moving on");
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.rate(rating);
        }
        self.selected_rating = Some(rating);
        self.schedule(Deferred::Advance, RATING_ADVANCE_DELAY);
    }

    fn advance(&mut self) {
        self.clear_transients();
        if let Some(session) = self.session.as_mut() {
            session.advance();
        }
        self.show_prompt();
    }

    fn show_complete(&mut self) {
        self.clear_transients();
        self.phase = Phase::Complete;
        if let Some(session) = &self.session {
            let stats = session.stats();
            log::info!(
                "study complete: {} (total {}, easy {}, normal {}, hard {})",
                session.label().name,
                stats.total,
                stats.easy,
                stats.normal,
                stats.hard
            );
        }
    }

    fn restart(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.restart();
        }
        self.clear_transients();
        self.show_prompt();
    }

    fn go_home(&mut self) {
        self.clear_transients();
        self.session = None;
        self.phase = Phase::Menu;
    }

    /// 一時停止は残り時間を保持しない。再開すると最初から数え直す
    fn toggle_pause(&mut self) {
        if self.countdown.is_running() {
            self.countdown.reset();
        } else {
            self.countdown.start(self.settings().timer_duration);
        }
    }

    // --------------------------------------------------
    // 補助
    // --------------------------------------------------

    fn schedule(&mut self, what: Deferred, delay: Duration) {
        self.pending.push(Pending { left: delay, what });
    }

    /// タイマー・遅延処理・読み上げをすべて止める
    fn clear_transients(&mut self) {
        self.pending.clear();
        self.sequencer.stop(self.speaker.as_mut());
        self.countdown.reset();
        self.selected_rating = None;
    }

    fn notify(&mut self, message: String) {
        log::error!("{}", message);
        self.notice = Some(message);
    }

    fn move_menu_cursor(&mut self, forward: bool) {
        let len = self.library.categories().len();
        if len == 0 {
            return;
        }
        self.menu_cursor = if forward {
            (self.menu_cursor + 1) % len
        } else {
            (self.menu_cursor + len - 1) % len
        };
    }

    fn change_setting(&mut self, delta: i32) {
        let field = self.settings_cursor;
        let result = self.settings.update(|s| match field {
            SettingField::TimerDuration => {
                s.timer_duration = s.timer_duration.saturating_add_signed(delta)
            }
            SettingField::AutoPlay => s.auto_play = !s.auto_play,
            SettingField::RepeatCount => {
                s.repeat_count = s.repeat_count.saturating_add_signed(delta)
            }
        });
        if let Err(e) = result {
            self.notify(format!("Could not save settings: {:#}", e));
        }
    }

    // --------------------------------------------------
    // ビュー
    // --------------------------------------------------

    fn header<'a>(&self, session: &'a Session) -> StudyHeader<'a> {
        StudyHeader {
            label: session.label(),
            progress: session.progress(),
            origin: session.current().and_then(|s| s.origin.as_ref()),
        }
    }

    pub fn view(&self) -> View<'_> {
        let menu = || Screen::Menu {
            categories: self.library.categories(),
            selected: self.menu_cursor,
            cache: self.library.cache_info(),
        };

        let screen = match (self.phase, self.session.as_ref()) {
            (Phase::Settings, _) => Screen::Settings {
                settings: self.settings(),
                selected: self.settings_cursor,
            },
            (Phase::Complete, Some(session)) => Screen::Complete {
                label: session.label(),
                stats: session.stats(),
            },
            (Phase::Prompt, Some(session)) => match session.current() {
                Some(sentence) => Screen::Prompt {
                    header: self.header(session),
                    korean: &sentence.korean,
                    time_left: self.countdown.time_left(),
                    urgency: self.countdown.urgency(),
                    timer_running: self.countdown.is_running(),
                },
                None => menu(),
            },
            (Phase::Answer, Some(session)) => match session.current() {
                Some(sentence) => Screen::Answer {
                    header: self.header(session),
                    korean: &sentence.korean,
                    english: &sentence.english,
                    pronunciation: sentence.pronunciation_guide(),
                    speaking: self.sequencer.is_playing(),
                    rating: self.selected_rating,
                },
                None => menu(),
            },
            _ => menu(),
        };

        View {
            notice: self.notice(),
            screen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::MemorySource;
    use crate::speech::fake::FakeSpeaker;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        speaker: FakeSpeaker,
        _dir: TempDir,
    }

    fn harness(sizes: &[(&str, usize)], auto_play: bool, repeat_count: u32) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = SettingsStore::open(dir.path().join("settings.json"));
        settings
            .update(|s| {
                s.auto_play = auto_play;
                s.repeat_count = repeat_count;
            })
            .unwrap();
        let library = Library::open(Box::new(MemorySource::with_sizes(sizes))).unwrap();
        let speaker = FakeSpeaker::default();
        let app = App::with_rng(
            library,
            settings,
            Box::new(speaker.clone()),
            StdRng::seed_from_u64(3),
        );
        Harness {
            app,
            speaker,
            _dir: dir,
        }
    }

    fn start_category(app: &mut App, id: &str) {
        app.dispatch(Action::Start(StudyMode::Category(id.to_string())));
    }

    #[test]
    fn three_sentence_drill_ends_with_full_stats() {
        let Harness { mut app, _dir, .. } = harness(&[("c", 3)], false, 1);
        start_category(&mut app, "c");
        assert_eq!(app.phase(), Phase::Prompt);

        for rating in [Rating::Easy, Rating::Hard, Rating::Normal] {
            app.dispatch(Action::Reveal);
            assert_eq!(app.phase(), Phase::Answer);
            app.dispatch(Action::Rate(rating));
            assert_eq!(app.phase(), Phase::Answer);
            app.tick(RATING_ADVANCE_DELAY);
        }

        assert_eq!(app.phase(), Phase::Complete);
        assert_eq!(
            app.session().unwrap().stats(),
            Stats {
                total: 3,
                easy: 1,
                normal: 1,
                hard: 1,
            }
        );
        assert_eq!(app.session().unwrap().index(), 3);
    }

    #[test]
    fn expiry_with_autoplay_reveals_then_speaks() {
        let Harness {
            mut app,
            speaker,
            _dir,
        } = harness(&[("c", 2)], true, 2);
        start_category(&mut app, "c");
        assert_eq!(app.time_left(), 10);

        app.tick(Duration::from_secs(10));
        assert_eq!(app.phase(), Phase::Answer);
        assert!(speaker.spoken().is_empty());

        app.tick(ANSWER_SPEECH_DELAY);
        assert_eq!(speaker.spoken(), vec!["c-en-0"]);
        assert!(app.is_speaking());
    }

    #[test]
    fn expiry_without_autoplay_stalls_on_prompt() {
        let Harness { mut app, _dir, .. } = harness(&[("c", 2)], false, 1);
        start_category(&mut app, "c");

        app.tick(Duration::from_secs(10));
        assert_eq!(app.phase(), Phase::Prompt);
        assert_eq!(app.time_left(), 0);

        app.tick(Duration::from_secs(30));
        assert_eq!(app.phase(), Phase::Prompt);
        assert_eq!(app.time_left(), 0);
    }

    #[test]
    fn pause_then_resume_restarts_full_duration() {
        let Harness { mut app, _dir, .. } = harness(&[("c", 1)], false, 1);
        start_category(&mut app, "c");

        app.tick(Duration::from_secs(4));
        assert_eq!(app.time_left(), 6);

        app.dispatch(Action::TogglePause);
        assert_eq!(app.time_left(), 0);
        app.tick(Duration::from_secs(20));
        assert_eq!(app.phase(), Phase::Prompt);

        app.dispatch(Action::TogglePause);
        assert_eq!(app.time_left(), 10);
    }

    #[test]
    fn second_rating_before_advance_is_ignored() {
        let Harness { mut app, _dir, .. } = harness(&[("c", 2)], false, 1);
        start_category(&mut app, "c");
        app.dispatch(Action::Reveal);
        app.dispatch(Action::Rate(Rating::Easy));
        app.dispatch(Action::Rate(Rating::Hard));

        let stats = app.session().unwrap().stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.hard, 0);

        app.tick(RATING_ADVANCE_DELAY);
        assert_eq!(app.session().unwrap().index(), 1);
        assert_eq!(app.phase(), Phase::Prompt);
    }

    #[test]
    fn home_cancels_pending_advance_and_speech() {
        let Harness {
            mut app,
            speaker,
            _dir,
        } = harness(&[("c", 2)], true, 3);
        start_category(&mut app, "c");
        app.dispatch(Action::Reveal);
        app.tick(ANSWER_SPEECH_DELAY);
        assert!(speaker.is_busy());

        app.dispatch(Action::Rate(Rating::Normal));
        app.dispatch(Action::Home);
        assert!(!speaker.is_busy());

        app.tick(Duration::from_secs(2));
        assert_eq!(app.phase(), Phase::Menu);
        assert!(app.session().is_none());
    }

    #[test]
    fn replay_while_speaking_is_ignored() {
        let Harness {
            mut app,
            speaker,
            _dir,
        } = harness(&[("c", 1)], false, 1);
        start_category(&mut app, "c");
        app.dispatch(Action::Reveal);
        assert!(speaker.spoken().is_empty());

        app.dispatch(Action::Replay);
        app.dispatch(Action::Replay);
        assert_eq!(speaker.spoken().len(), 1);

        speaker.finish();
        app.tick(Duration::from_millis(50));
        app.dispatch(Action::Replay);
        assert_eq!(speaker.spoken().len(), 2);
    }

    #[test]
    fn all_mode_keeps_category_order() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 2), ("b", 3)], false, 1);
        app.dispatch(Action::Start(StudyMode::All));

        let session = app.session().unwrap();
        let korean: Vec<&str> = session
            .sentences()
            .iter()
            .map(|s| s.korean.as_str())
            .collect();
        assert_eq!(korean, vec!["a-ko-0", "a-ko-1", "b-ko-0", "b-ko-1", "b-ko-2"]);
        assert_eq!(session.label().name, "All Sentences");
    }

    #[test]
    fn random_mode_uses_every_sentence_once() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 4), ("b", 5)], false, 1);
        app.dispatch(Action::Start(StudyMode::Random));

        let mut korean: Vec<String> = app
            .session()
            .unwrap()
            .sentences()
            .iter()
            .map(|s| s.korean.clone())
            .collect();
        korean.sort();
        let mut expected: Vec<String> = (0..4)
            .map(|i| format!("a-ko-{}", i))
            .chain((0..5).map(|i| format!("b-ko-{}", i)))
            .collect();
        expected.sort();
        assert_eq!(korean, expected);
    }

    #[test]
    fn missing_category_raises_notice() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 1)], false, 1);
        start_category(&mut app, "nope");

        assert_eq!(app.phase(), Phase::Menu);
        assert!(app.notice().unwrap().contains("nope"));

        // 通知中は他の操作を受け付けない
        app.dispatch(Action::Start(StudyMode::All));
        assert!(app.session().is_none());

        app.dispatch(Action::DismissNotice);
        assert!(app.notice().is_none());
    }

    #[test]
    fn unreadable_category_raises_notice_and_stays_on_menu() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MemorySource::with_sizes(&[("a", 2), ("broken", 1)]);
        source.payloads.remove("broken.json");
        let library = Library::open(Box::new(source)).unwrap();
        let mut app = App::with_rng(
            library,
            SettingsStore::open(dir.path().join("settings.json")),
            Box::new(FakeSpeaker::default()),
            StdRng::seed_from_u64(3),
        );

        start_category(&mut app, "broken");
        assert_eq!(app.phase(), Phase::Menu);
        assert!(app.session().is_none());
        assert!(app.notice().unwrap().contains("broken.json"));

        app.dispatch(Action::DismissNotice);
        start_category(&mut app, "a");
        assert_eq!(app.phase(), Phase::Prompt);
    }

    #[test]
    fn failed_settings_write_keeps_value_and_raises_notice() {
        let dir = tempfile::tempdir().unwrap();
        // ディレクトリには書き込めない
        let library = Library::open(Box::new(MemorySource::with_sizes(&[("a", 1)]))).unwrap();
        let mut app = App::with_rng(
            library,
            SettingsStore::open(dir.path()),
            Box::new(FakeSpeaker::default()),
            StdRng::seed_from_u64(3),
        );

        app.dispatch(Action::OpenSettings);
        app.dispatch(Action::AdjustSetting(5));

        assert!(app.notice().unwrap().contains("Could not save settings"));
        assert_eq!(app.settings().timer_duration, 15);
        assert_eq!(app.phase(), Phase::Settings);
    }

    #[test]
    fn empty_category_completes_immediately() {
        let Harness { mut app, _dir, .. } = harness(&[("empty", 0)], false, 1);
        start_category(&mut app, "empty");
        assert_eq!(app.phase(), Phase::Complete);
    }

    #[test]
    fn restart_replays_the_same_sequence() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 3)], false, 1);
        app.dispatch(Action::Start(StudyMode::Random));
        let order: Vec<String> = app
            .session()
            .unwrap()
            .sentences()
            .iter()
            .map(|s| s.korean.clone())
            .collect();

        for _ in 0..3 {
            app.dispatch(Action::Reveal);
            app.dispatch(Action::Next);
        }
        assert_eq!(app.phase(), Phase::Complete);

        app.dispatch(Action::Restart);
        let session = app.session().unwrap();
        assert_eq!(app.phase(), Phase::Prompt);
        assert_eq!(session.index(), 0);
        assert_eq!(session.stats(), Stats::default());
        let again: Vec<String> = session.sentences().iter().map(|s| s.korean.clone()).collect();
        assert_eq!(again, order);
    }

    #[test]
    fn start_selected_uses_menu_cursor() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 1), ("b", 2)], false, 1);
        app.dispatch(Action::SelectNext);
        app.dispatch(Action::StartSelected);
        assert_eq!(app.session().unwrap().label().name, "b name");

        app.dispatch(Action::Home);
        app.dispatch(Action::SelectNext);
        app.dispatch(Action::SelectPrev);
        app.dispatch(Action::SelectPrev);
        app.dispatch(Action::StartSelected);
        assert_eq!(app.session().unwrap().label().name, "a name");
    }

    #[test]
    fn settings_screen_changes_are_saved() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 1)], true, 2);
        app.dispatch(Action::OpenSettings);
        assert_eq!(app.phase(), Phase::Settings);

        app.dispatch(Action::AdjustSetting(5));
        app.dispatch(Action::SelectNext);
        app.dispatch(Action::ToggleSetting);
        app.dispatch(Action::SelectNext);
        app.dispatch(Action::AdjustSetting(-1));
        app.dispatch(Action::CloseSettings);

        let expected = Settings {
            timer_duration: 15,
            auto_play: false,
            repeat_count: 1,
        };
        assert_eq!(app.settings(), expected);
        assert_eq!(app.phase(), Phase::Menu);
        let reloaded = SettingsStore::open(_dir.path().join("settings.json"));
        assert_eq!(reloaded.settings(), expected);
    }

    #[test]
    fn view_describes_the_prompt() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 2)], false, 1);
        start_category(&mut app, "a");
        app.tick(Duration::from_secs(6));

        match app.view().screen {
            Screen::Prompt {
                header,
                korean,
                time_left,
                urgency,
                timer_running,
            } => {
                assert_eq!(korean, "a-ko-0");
                assert_eq!(header.progress, (1, 2));
                assert_eq!(time_left, 4);
                assert_eq!(urgency, Urgency::Warning);
                assert!(timer_running);
            }
            _ => panic!("expected prompt screen"),
        }
    }

    #[test]
    fn clear_cache_from_menu() {
        let Harness { mut app, _dir, .. } = harness(&[("a", 1)], false, 1);
        start_category(&mut app, "a");
        app.dispatch(Action::Home);
        match app.view().screen {
            Screen::Menu { cache, .. } => assert_eq!(cache.size, 1),
            _ => panic!("expected menu"),
        }

        app.dispatch(Action::ClearCache);
        match app.view().screen {
            Screen::Menu { cache, .. } => assert_eq!(cache.size, 0),
            _ => panic!("expected menu"),
        }
    }
}
