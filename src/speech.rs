// ============================================
// src/speech.rs
// 英文の読み上げ (外部TTSプログラム) と繰り返し再生
// ============================================

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use thiserror::Error;

/// 読み上げと読み上げの間の休み
pub const UTTERANCE_GAP: Duration = Duration::from_millis(500);

/// 既定の読み上げ速度 (各エンジンの標準 175wpm の 0.8 倍)
const WORDS_PER_MINUTE: u32 = 140;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("failed to start speech program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// 読み上げエンジン
pub trait Speaker {
    /// 読み上げ開始。再生中のものがあれば先に止める
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    /// まだ読み上げ中か (false になったら1回分の終了)
    fn is_speaking(&mut self) -> bool;
}

// --------------------------------------------------
// 外部プログラムで読み上げる
// --------------------------------------------------

pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// 既知のプログラムなら英語(米国)の声と速度を指定する
    pub fn for_program(program: &str) -> Self {
        let rate = WORDS_PER_MINUTE.to_string();
        let name = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);
        let args = match name {
            "say" => vec!["-r".to_string(), rate],
            "espeak" | "espeak-ng" => vec![
                "-v".to_string(),
                "en-us".to_string(),
                "-s".to_string(),
                rate,
            ],
            _ => Vec::new(),
        };
        Self::new(program, args)
    }

    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::for_program("say")
        } else {
            Self::for_program("espeak-ng")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.cancel();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn is_speaking(&mut self) -> bool {
        let finished = match self.child.as_mut() {
            None => return false,
            Some(child) => match child.try_wait() {
                Ok(None) => false,
                Ok(Some(_)) => true,
                Err(e) => {
                    log::warn!("lost track of {}: {}", self.program, e);
                    true
                }
            },
        };
        if finished {
            self.child = None;
        }
        !finished
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 音を出さない (`--mute`)。読み上げは即座に終わる
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        log::debug!("muted: {}", text);
        Ok(())
    }

    fn cancel(&mut self) {}

    fn is_speaking(&mut self) -> bool {
        false
    }
}

// --------------------------------------------------
// 繰り返し再生
// --------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Speaking,
    Resting(Duration),
}

#[derive(Debug)]
struct Playback {
    text: String,
    repeat: u32,
    spoken: u32,
    step: Step,
}

/// 同じ英文を指定回数、1回ずつ終わりを待って読み上げる
#[derive(Debug, Default)]
pub struct SpeechSequencer {
    playback: Option<Playback>,
}

impl SpeechSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// 再生開始。再生中なら無視する (キューには積まない)
    pub fn play(&mut self, speaker: &mut dyn Speaker, text: &str, repeat: u32) -> bool {
        if self.playback.is_some() {
            log::debug!("speech already playing, ignoring request");
            return false;
        }
        if repeat == 0 {
            return false;
        }
        if let Err(e) = speaker.speak(text) {
            log::warn!("speech failed: {}", e);
            return false;
        }
        self.playback = Some(Playback {
            text: text.to_string(),
            repeat,
            spoken: 0,
            step: Step::Speaking,
        });
        true
    }

    /// 読み上げの終了を確認し、休みを挟んで次の回を始める
    pub fn tick(&mut self, speaker: &mut dyn Speaker, elapsed: Duration) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let step = playback.step;
        match step {
            Step::Speaking => {
                if speaker.is_speaking() {
                    return;
                }
                playback.spoken += 1;
                if playback.spoken >= playback.repeat {
                    self.playback = None;
                } else {
                    playback.step = Step::Resting(UTTERANCE_GAP);
                }
            }
            Step::Resting(left) => {
                let left = left.saturating_sub(elapsed);
                if !left.is_zero() {
                    playback.step = Step::Resting(left);
                    return;
                }
                match speaker.speak(&playback.text) {
                    Ok(()) => playback.step = Step::Speaking,
                    Err(e) => {
                        log::warn!("speech failed: {}", e);
                        self.playback = None;
                    }
                }
            }
        }
    }

    /// 再生を打ち切る
    pub fn stop(&mut self, speaker: &mut dyn Speaker) {
        if self.playback.take().is_some() {
            speaker.cancel();
        }
    }
}
