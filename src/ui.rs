// ============================================
// src/ui.rs
// UI描画 (View → ratatui ウィジェット)
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use crate::app::{Screen, SettingField, StudyHeader, View};
use crate::countdown::Urgency;
use crate::session::Rating;
use crate::settings::Settings;

pub fn ui(f: &mut Frame, view: &View) {
    let size = f.area();
    // 枠線を描画
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Interview Wiz !");
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    match &view.screen {
        Screen::Menu {
            categories,
            selected,
            cache,
        } => {
            let lines: Vec<Line> = categories
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let text = format!("{} {}  ({} sentences)", c.emoji, c.name, c.count);
                    if i == *selected {
                        Line::from(format!("> {}", text))
                            .style(Style::default().fg(Color::Black).bg(Color::White))
                    } else {
                        Line::from(format!("  {}", text)).style(Style::default().fg(Color::Gray))
                    }
                })
                .collect();
            let cache_text = if cache.size == 0 {
                "cache: empty".to_string()
            } else {
                format!("cache: {} ({})", cache.size, cache.categories.join(", "))
            };
            render_menu_layout(f, inner_area, lines, cache_text);
        }
        Screen::Settings { settings, selected } => render_settings(f, inner_area, settings, *selected),
        Screen::Prompt {
            header,
            korean,
            time_left,
            urgency,
            timer_running,
        } => {
            let chunks = study_chunks(inner_area);
            render_header(f, &chunks, header);

            f.render_widget(
                Paragraph::new(*korean)
                    .style(Style::default().fg(Color::White).bold())
                    .wrap(Wrap { trim: true })
                    .centered(),
                chunks[3],
            );

            // タイマー (残りが少ないほど色を強く)
            let color = match urgency {
                Urgency::Normal => Color::Green,
                Urgency::Warning => Color::Yellow,
                Urgency::Danger => Color::Red,
            };
            let timer_text = if *timer_running {
                format!("⏱ {}", time_left)
            } else {
                format!("⏸ {}", time_left)
            };
            f.render_widget(
                Paragraph::new(timer_text)
                    .style(Style::default().fg(color).bold())
                    .centered(),
                chunks[5],
            );

            render_keys(f, chunks[7], "[Space] answer  [p] pause/resume  [b] menu");
        }
        Screen::Answer {
            header,
            korean,
            english,
            pronunciation,
            speaking,
            rating,
        } => {
            let chunks = study_chunks(inner_area);
            render_header(f, &chunks, header);

            let mut lines = vec![
                Line::from(*korean).style(Style::default().fg(Color::DarkGray)),
                Line::from(""),
                Line::from(*english).style(Style::default().fg(Color::White).bold()),
                Line::from(pronunciation.as_str()).style(Style::default().fg(Color::Gray)),
            ];
            if *speaking {
                lines.push(Line::from("🔊 ...").style(Style::default().fg(Color::Cyan)));
            }
            f.render_widget(
                Paragraph::new(lines).wrap(Wrap { trim: true }).centered(),
                chunks[3],
            );

            // 評価ボタン (選んだものを反転)
            let mut spans = Vec::new();
            for (key, label, value) in [
                ("1", "Easy", Rating::Easy),
                ("2", "Normal", Rating::Normal),
                ("3", "Hard", Rating::Hard),
            ] {
                let style = if *rating == Some(value) {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Yellow)
                };
                spans.push(Span::styled(format!(" [{}] {} ", key, label), style));
                spans.push(Span::raw("  "));
            }
            f.render_widget(Paragraph::new(Line::from(spans)).centered(), chunks[5]);

            render_keys(f, chunks[7], "[Space] play again  [n] next  [b] menu");
        }
        Screen::Complete { label, stats } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // [0] 見出し
                    Constraint::Length(1), // [1] 空白
                    Constraint::Min(4),    // [2] 集計
                    Constraint::Length(1), // [3] キー案内
                ])
                .split(inner_area);

            f.render_widget(
                Paragraph::new(format!("🎉 {} {} complete!", label.emoji, label.name))
                    .style(Style::default().fg(Color::Magenta).bold())
                    .centered(),
                chunks[0],
            );
            let lines = vec![
                Line::from(format!("Total  {}", stats.total)).bold(),
                Line::from(format!("Easy   {}", stats.easy)).style(Style::default().fg(Color::Green)),
                Line::from(format!("Normal {}", stats.normal)).style(Style::default().fg(Color::Yellow)),
                Line::from(format!("Hard   {}", stats.hard)).style(Style::default().fg(Color::Red)),
            ];
            f.render_widget(Paragraph::new(lines).centered(), chunks[2]);
            render_keys(f, chunks[3], "[r] restart  [h] menu");
        }
    }

    if let Some(notice) = view.notice {
        render_notice(f, size, notice);
    }
}

fn render_menu_layout(f: &mut Frame, area: Rect, lines: Vec<Line>, cache_text: String) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 見出し
            Constraint::Length(1), // [1] 空白
            Constraint::Min(1),    // [2] カテゴリ一覧
            Constraint::Length(1), // [3] キャッシュ情報
            Constraint::Length(1), // [4] キー案内
        ])
        .split(area);

    f.render_widget(
        Paragraph::new("✨ Pick a category and start practicing")
            .style(Style::default().fg(Color::White).bold())
            .centered(),
        chunks[0],
    );
    f.render_widget(Paragraph::new(lines), chunks[2]);
    f.render_widget(
        Paragraph::new(cache_text).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
    render_keys(
        f,
        chunks[4],
        "[Enter] start  [r] random  [a] all  [s] settings  [c] clear cache  [q] quit",
    );
}

fn render_settings(f: &mut Frame, area: Rect, settings: &Settings, selected: SettingField) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 見出し
            Constraint::Length(1), // [1] 空白
            Constraint::Min(3),    // [2] 項目
            Constraint::Length(1), // [3] キー案内
        ])
        .split(area);

    f.render_widget(
        Paragraph::new("⚙ Settings")
            .style(Style::default().fg(Color::White).bold())
            .centered(),
        chunks[0],
    );

    let lines: Vec<Line> = SettingField::ALL
        .iter()
        .map(|field| {
            let text = match field {
                SettingField::TimerDuration => {
                    format!("Timer duration   {}s", settings.timer_duration)
                }
                SettingField::AutoPlay => format!(
                    "Auto play        {}",
                    if settings.auto_play { "ON" } else { "OFF" }
                ),
                SettingField::RepeatCount => format!("Repeat count     {}", settings.repeat_count),
            };
            if *field == selected {
                Line::from(format!("> {}", text))
                    .style(Style::default().fg(Color::Black).bg(Color::White))
            } else {
                Line::from(format!("  {}", text))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[2]);
    render_keys(f, chunks[3], "[↑↓] select  [←→] change  [Enter] toggle  [Esc] back");
}

/// 出題画面の共通レイアウト
fn study_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] セッション名
            Constraint::Length(1), // [1] 進捗ゲージ
            Constraint::Length(1), // [2] 出典カテゴリ
            Constraint::Min(3),    // [3] 本文
            Constraint::Length(1), // [4] 空白
            Constraint::Length(1), // [5] タイマー / 評価
            Constraint::Length(1), // [6] 空白
            Constraint::Length(1), // [7] キー案内
        ])
        .split(area)
}

fn render_header(f: &mut Frame, chunks: &[Rect], header: &StudyHeader) {
    f.render_widget(
        Paragraph::new(format!("{} {}", header.label.emoji, header.label.name))
            .style(Style::default().fg(Color::White).bold()),
        chunks[0],
    );

    let (current, total) = header.progress;
    let ratio = if total > 0 {
        (current as f64 / total as f64).min(1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::NONE))
        .gauge_style(Style::default().fg(Color::Magenta).bg(Color::Black))
        .ratio(ratio)
        .label(format!("{}/{}", current, total));
    f.render_widget(gauge, chunks[1]);

    if let Some(origin) = header.origin {
        f.render_widget(
            Paragraph::new(format!("{} {}", origin.emoji, origin.name))
                .style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );
    }
}

fn render_keys(f: &mut Frame, area: Rect, text: &str) {
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        area,
    );
}

/// エラー通知 (中央のポップアップ)
fn render_notice(f: &mut Frame, area: Rect, message: &str) {
    let width = area.width.saturating_sub(4).min(60);
    let height = 6.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error")
        .border_style(Style::default().fg(Color::Red));
    let body = Paragraph::new(vec![
        Line::from(message),
        Line::from(""),
        Line::from("press any key").style(Style::default().fg(Color::DarkGray)),
    ])
    .block(block)
    .wrap(Wrap { trim: true })
    .centered();

    f.render_widget(Clear, popup);
    f.render_widget(body, popup);
}
