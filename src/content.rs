// ============================================
// src/content.rs
// カテゴリと例文データの読み込み・キャッシュ
// ============================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// カテゴリ一覧のファイル名
pub const INDEX_FILE: &str = "categories.json";

/// バイナリに埋め込んだ標準データ (ファイル名, 中身)
const BUNDLED_FILES: &[(&str, &str)] = &[
    (INDEX_FILE, include_str!("../data/categories.json")),
    ("self-introduction.json", include_str!("../data/self-introduction.json")),
    ("strengths.json", include_str!("../data/strengths.json")),
    ("teamwork.json", include_str!("../data/teamwork.json")),
    ("closing.json", include_str!("../data/closing.json")),
];

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bundled content has no file named {0}")]
    NotBundled(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),
}

// --------------------------------------------------
// データ構造
// --------------------------------------------------

/// カテゴリ一覧の1項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub file: String,
    pub count: usize,
}

#[derive(Deserialize)]
struct CategoryIndex {
    categories: Vec<Category>,
}

/// カテゴリファイル内のヘッダ部分
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInfo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

/// 全カテゴリ混合モードで付与する出典
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub name: String,
    pub emoji: String,
}

/// 例文 (韓国語 → 英語)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sentence {
    pub korean: String,
    pub english: String,
    #[serde(skip)]
    pub origin: Option<Origin>,
}

impl Sentence {
    /// 発音ガイド: 小文字化して句読点を落とす
    pub fn pronunciation_guide(&self) -> String {
        let plain: String = self
            .english
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '.' | ',' | '!' | '?'))
            .collect();
        format!("[{}]", plain)
    }
}

/// カテゴリファイル1つ分
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryPayload {
    pub category: CategoryInfo,
    pub sentences: Vec<Sentence>,
}

// --------------------------------------------------
// データソース
// --------------------------------------------------

/// カテゴリ一覧と各カテゴリファイルの読み出し口
pub trait ContentSource {
    fn read_index(&self) -> Result<Vec<Category>, ContentError>;
    fn read_category(&self, category: &Category) -> Result<CategoryPayload, ContentError>;
}

fn parse<T: for<'de> Deserialize<'de>>(name: &str, text: &str) -> Result<T, ContentError> {
    serde_json::from_str(text).map_err(|source| ContentError::Parse {
        name: name.to_string(),
        source,
    })
}

/// ディレクトリから読む (`<root>/categories.json`, `<root>/<file>`)
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, name: &str) -> Result<String, ContentError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| ContentError::Io { path, source })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirSource {
    fn read_index(&self) -> Result<Vec<Category>, ContentError> {
        let index: CategoryIndex = parse(INDEX_FILE, &self.read(INDEX_FILE)?)?;
        Ok(index.categories)
    }

    fn read_category(&self, category: &Category) -> Result<CategoryPayload, ContentError> {
        parse(&category.file, &self.read(&category.file)?)
    }
}

/// バイナリ埋め込みデータから読む
pub struct BundledSource;

impl BundledSource {
    fn read(name: &str) -> Result<&'static str, ContentError> {
        BUNDLED_FILES
            .iter()
            .find(|(file, _)| *file == name)
            .map(|(_, text)| *text)
            .ok_or_else(|| ContentError::NotBundled(name.to_string()))
    }
}

impl ContentSource for BundledSource {
    fn read_index(&self) -> Result<Vec<Category>, ContentError> {
        let index: CategoryIndex = parse(INDEX_FILE, Self::read(INDEX_FILE)?)?;
        Ok(index.categories)
    }

    fn read_category(&self, category: &Category) -> Result<CategoryPayload, ContentError> {
        parse(&category.file, Self::read(&category.file)?)
    }
}

// --------------------------------------------------
// キャッシュ
// --------------------------------------------------

/// キャッシュの中身の概要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub size: usize,
    pub categories: Vec<String>,
}

/// カテゴリID → 読み込み済みデータ。破棄は `clear` のみ
#[derive(Default)]
pub struct CategoryCache {
    entries: HashMap<String, Rc<CategoryPayload>>,
}

impl CategoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// キャッシュにあればそれを返し、なければ読み込んで保存する
    pub fn get(
        &mut self,
        category: &Category,
        source: &dyn ContentSource,
    ) -> Result<Rc<CategoryPayload>, ContentError> {
        if let Some(payload) = self.entries.get(&category.id) {
            log::debug!("cache hit: {}", category.id);
            return Ok(Rc::clone(payload));
        }

        let payload = Rc::new(source.read_category(category)?);
        log::info!(
            "loaded category {} ({} sentences)",
            category.id,
            payload.sentences.len()
        );
        self.entries.insert(category.id.clone(), Rc::clone(&payload));
        Ok(payload)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        log::info!("category cache cleared");
    }

    pub fn info(&self) -> CacheInfo {
        let mut categories: Vec<String> = self.entries.keys().cloned().collect();
        categories.sort();
        CacheInfo {
            size: self.entries.len(),
            categories,
        }
    }
}

// --------------------------------------------------
// ライブラリ (一覧 + キャッシュ + ソース)
// --------------------------------------------------

pub struct Library {
    source: Box<dyn ContentSource>,
    categories: Vec<Category>,
    cache: CategoryCache,
}

impl Library {
    /// 一覧を読み込んでライブラリを開く
    pub fn open(source: Box<dyn ContentSource>) -> Result<Self, ContentError> {
        let categories = source.read_index()?;
        log::info!("category index loaded: {} categories", categories.len());
        Ok(Self {
            source,
            categories,
            cache: CategoryCache::new(),
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn load_category(&mut self, id: &str) -> Result<Rc<CategoryPayload>, ContentError> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ContentError::CategoryNotFound(id.to_string()))?;
        self.cache.get(category, self.source.as_ref())
    }

    /// 全カテゴリを一覧順に連結する。読めないカテゴリは飛ばす
    pub fn load_all(&mut self) -> Vec<Sentence> {
        let mut all = Vec::new();
        for category in &self.categories {
            match self.cache.get(category, self.source.as_ref()) {
                Ok(payload) => {
                    all.extend(payload.sentences.iter().map(|s| Sentence {
                        origin: Some(Origin {
                            name: category.name.clone(),
                            emoji: category.emoji.clone(),
                        }),
                        ..s.clone()
                    }));
                }
                Err(e) => log::warn!("skipping category {}: {}", category.id, e),
            }
        }
        log::info!("all categories loaded: {} sentences", all.len());
        all
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }
}

// --------------------------------------------------
// テスト用のメモリ上ソース
// --------------------------------------------------
