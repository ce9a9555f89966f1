//! 表裏ペアの作成
//!
//! ソート済みの画像パス一覧を、戦略に従って PhotoPair に組む。

use crate::types::{PairingStrategy, PhotoPair};
use std::collections::HashMap;
use std::path::Path;

/// auto 戦略でのグループ
#[derive(Debug, Clone, PartialEq, Eq)]
enum Group {
    /// front/back を含まない名前のファイル
    Single(String),
    Sides {
        front: Option<String>,
        back: Option<String>,
    },
}

/// 画像パス一覧からペアを作る
///
/// - `Single`: 1枚ずつ表のみ
/// - `Sequential`: 2枚ずつ（表, 裏）
/// - `Auto`: ファイル名の front/back でグループ化
pub fn create_pairs(files: &[String], strategy: PairingStrategy) -> Vec<PhotoPair> {
    match strategy {
        PairingStrategy::Auto => pair_auto(files),
        PairingStrategy::Sequential => pair_sequential(files),
        PairingStrategy::Single => pair_single(files),
    }
}

fn pair_single(files: &[String]) -> Vec<PhotoPair> {
    files
        .iter()
        .enumerate()
        .map(|(i, file)| PhotoPair {
            id: format!("photo_{:04}", i),
            front: Some(file.clone()),
            back: None,
        })
        .collect()
}

fn pair_sequential(files: &[String]) -> Vec<PhotoPair> {
    files
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| PhotoPair {
            id: format!("photo_{:04}", i),
            front: chunk.first().cloned(),
            back: chunk.get(1).cloned(),
        })
        .collect()
}

/// ファイル名で表裏をまとめる
///
/// キーは最初に使ったファイルの役割（単独 / 表裏）が確保する。
/// 役割の衝突や単独ファイル同士の衝突では既存グループを壊さず、
/// 後から来たファイルを `<キー>_<n>` の表のみペアとして別に出す。
fn pair_auto(files: &[String]) -> Vec<PhotoPair> {
    let mut groups: Vec<(String, Group)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collisions: HashMap<String, usize> = HashMap::new();

    for file in files {
        let stem = file_stem(file);
        let lower = stem.to_lowercase();

        let (key, slot) = if lower.contains("front") {
            (side_key(&lower, "front"), Some(true))
        } else if lower.contains("back") {
            (side_key(&lower, "back"), Some(false))
        } else {
            (stem, None)
        };

        let claimed = match index.get(&key).copied() {
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, new_group(file, slot)));
                continue;
            }
            Some(i) => match (&mut groups[i].1, slot) {
                (Group::Sides { front, .. }, Some(true)) => {
                    *front = Some(file.clone());
                    true
                }
                (Group::Sides { back, .. }, Some(false)) => {
                    *back = Some(file.clone());
                    true
                }
                _ => false,
            },
        };

        if !claimed {
            // 実在するファイル名と重なる番号は飛ばす
            let n = collisions.entry(key.clone()).or_insert(1);
            let split_key = loop {
                *n += 1;
                let candidate = format!("{}_{}", key, n);
                if !index.contains_key(&candidate) {
                    break candidate;
                }
            };
            log::warn!(
                "ペアキーが衝突しました: {} → {} として単独扱い",
                file,
                split_key
            );
            index.insert(split_key.clone(), groups.len());
            groups.push((split_key, Group::Single(file.clone())));
        }
    }

    groups
        .into_iter()
        .map(|(id, group)| match group {
            Group::Single(file) => PhotoPair {
                id,
                front: Some(file),
                back: None,
            },
            Group::Sides { front, back } => PhotoPair { id, front, back },
        })
        .collect()
}

fn new_group(file: &str, slot: Option<bool>) -> Group {
    match slot {
        Some(true) => Group::Sides {
            front: Some(file.to_string()),
            back: None,
        },
        Some(false) => Group::Sides {
            front: None,
            back: Some(file.to_string()),
        },
        None => Group::Single(file.to_string()),
    }
}

/// 小文字化済みの名前から面のトークンと `_` を除いたキー
fn side_key(lower: &str, token: &str) -> String {
    lower.replace(token, "").replace('_', "").trim().to_string()
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
