// ============================================
// src/session.rs
// 学習セッション (例文の並び・進行位置・評価の集計)
// ============================================

use rand::Rng;

use crate::content::Sentence;

/// 自己評価
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Easy,
    Normal,
    Hard,
}

/// 評価の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: u32,
    pub easy: u32,
    pub normal: u32,
    pub hard: u32,
}

impl Stats {
    pub fn record(&mut self, rating: Rating) {
        self.total += 1;
        match rating {
            Rating::Easy => self.easy += 1,
            Rating::Normal => self.normal += 1,
            Rating::Hard => self.hard += 1,
        }
    }
}

/// 出題モード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyMode {
    /// 1カテゴリを元の順番で
    Category(String),
    /// 全カテゴリを連結してシャッフル
    Random,
    /// 全カテゴリを連結順のまま
    All,
}

/// 画面上部に出すセッション名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLabel {
    pub name: String,
    pub emoji: String,
}

impl SessionLabel {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }
}

/// 1回分の学習の流れ
#[derive(Debug, Clone)]
pub struct Session {
    label: SessionLabel,
    sentences: Vec<Sentence>,
    /// 常に 0..=sentences.len()
    index: usize,
    stats: Stats,
}

impl Session {
    pub fn new(label: SessionLabel, sentences: Vec<Sentence>) -> Self {
        Self {
            label,
            sentences,
            index: 0,
            stats: Stats::default(),
        }
    }

    pub fn label(&self) -> &SessionLabel {
        &self.label
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// 今の例文。全部終わっていれば None
    pub fn current(&self) -> Option<&Sentence> {
        self.sentences.get(self.index)
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.sentences.len()
    }

    /// 次へ進む。終わりに到達したら true
    pub fn advance(&mut self) -> bool {
        if self.index < self.sentences.len() {
            self.index += 1;
        }
        self.is_complete()
    }

    pub fn rate(&mut self, rating: Rating) {
        self.stats.record(rating);
    }

    /// 同じ並びで最初からやり直す (シャッフルし直さない)
    pub fn restart(&mut self) {
        self.index = 0;
        self.stats = Stats::default();
    }

    /// 表示用の進捗 (何問目, 全問数)
    pub fn progress(&self) -> (usize, usize) {
        let total = self.sentences.len();
        ((self.index + 1).min(total), total)
    }
}

/// Fisher–Yates: 後ろから i と [0, i] の一様乱数位置を入れ替える
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
