// ============================================
// src/countdown.rs
// 出題ごとのカウントダウンタイマー
// ============================================

use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

/// 残り時間に応じた表示の強さ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    /// 残り5秒以下
    Warning,
    /// 残り3秒以下
    Danger,
}

/// 1秒ずつ減るカウントダウン。経過時間は `tick` で外から与える
#[derive(Debug, Default)]
pub struct Countdown {
    time_left: u32,
    running: bool,
    /// 1秒に満たない経過時間の持ち越し
    carry: Duration,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, seconds: u32) {
        self.time_left = seconds;
        self.running = true;
        self.carry = Duration::ZERO;
    }

    /// 停止して残り時間を 0 に戻す
    pub fn reset(&mut self) {
        self.time_left = 0;
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn urgency(&self) -> Urgency {
        match self.time_left {
            0..=3 => Urgency::Danger,
            4..=5 => Urgency::Warning,
            _ => Urgency::Normal,
        }
    }

    /// 経過時間を進める。このtickで0になったら true (タイマーは止まる)
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.carry += elapsed;
        while self.carry >= SECOND {
            self.carry -= SECOND;
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.reset();
                return true;
            }
        }
        false
    }
}
