// スナップショットパーサーサービス
//
// YAMLスナップショットファイルの読み込み、解析、マージ処理を行うサービス。
// ディレクトリ全体のスナップショットファイルをスキャンし、統合されたスナップショットを生成します。
//
// DTO変換はDtoConverterServiceに委譲しています。

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::IoError;
use crate::core::snapshot::SchemaSnapshot;
use crate::services::snapshot_io::dto::SnapshotDto;
use crate::services::snapshot_io::dto_converter::DtoConverterService;

/// スナップショットパーサーサービス
///
/// YAMLスナップショットファイルの解析とマージを行います。
/// DTO変換はDtoConverterServiceに委譲しています。
#[derive(Debug, Clone, Default)]
pub struct SnapshotParserService {
    /// DTO変換サービス
    dto_converter: DtoConverterService,
}

impl SnapshotParserService {
    /// 新しいSnapshotParserServiceを作成
    pub fn new() -> Self {
        Self {
            dto_converter: DtoConverterService::new(),
        }
    }

    /// 指定されたディレクトリからすべてのYAMLファイルを読み込み、統合されたスナップショットを返す
    ///
    /// 全ファイルの由来は一致している必要があります。
    ///
    /// # Arguments
    ///
    /// * `snapshot_dir` - スナップショットファイルが格納されたディレクトリ
    ///
    /// # Returns
    ///
    /// 統合されたスナップショット
    ///
    /// # Errors
    ///
    /// - ディレクトリが存在しない場合
    /// - YAMLファイルの解析に失敗した場合
    /// - ファイル間で由来が一致しない場合
    /// - YAMLファイルが1つも存在しない場合
    pub fn parse_snapshot_directory(&self, snapshot_dir: &Path) -> Result<SchemaSnapshot> {
        // ディレクトリの存在確認
        if !snapshot_dir.exists() {
            return Err(IoError::FileNotFound {
                path: snapshot_dir.display().to_string(),
            }
            .into());
        }

        if !snapshot_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "The specified path is not a directory: {}",
                snapshot_dir.display()
            ));
        }

        let yaml_files = self.scan_yaml_files(snapshot_dir)?;
        if yaml_files.is_empty() {
            return Err(anyhow::anyhow!(
                "No snapshot files found in: {}",
                snapshot_dir.display()
            ));
        }

        debug!(file_count = yaml_files.len(), "Merging snapshot files");

        // 各YAMLファイルを解析してスナップショットをマージ
        let mut merged: Option<SchemaSnapshot> = None;

        for file_path in yaml_files {
            let snapshot = self
                .parse_snapshot_file(&file_path)
                .with_context(|| format!("Failed to parse snapshot file: {:?}", file_path))?;

            match merged {
                None => merged = Some(snapshot),
                Some(ref mut base) => {
                    if base.provenance != snapshot.provenance {
                        return Err(anyhow::anyhow!(
                            "Snapshot provenance mismatch in {:?}: expected '{}', found '{}'",
                            file_path,
                            base.provenance,
                            snapshot.provenance
                        ));
                    }
                    for object in snapshot.objects.into_values() {
                        base.add_object(object);
                    }
                }
            }
        }

        merged.ok_or_else(|| {
            anyhow::anyhow!("No snapshot files found in: {}", snapshot_dir.display())
        })
    }

    /// 単一のYAMLファイルを解析してスナップショットに変換
    ///
    /// # Arguments
    ///
    /// * `file_path` - スナップショットファイルのパス
    ///
    /// # Returns
    ///
    /// 解析されたスナップショット
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない場合
    /// - ファイルの読み込みに失敗した場合
    /// - YAMLの解析に失敗した場合
    pub fn parse_snapshot_file(&self, file_path: &Path) -> Result<SchemaSnapshot> {
        // ファイルの存在確認
        if !file_path.exists() {
            return Err(IoError::FileNotFound {
                path: file_path.display().to_string(),
            }
            .into());
        }

        // ファイル内容を読み込み
        let content = fs::read_to_string(file_path).map_err(|e| IoError::FileRead {
            path: file_path.display().to_string(),
            cause: e.to_string(),
        })?;

        // YAMLをDTOにデシリアライズ
        let dto: SnapshotDto =
            serde_saphyr::from_str(&content).map_err(|e| self.format_parse_error(file_path, e))?;

        // DTOを内部モデルに変換（DtoConverterServiceに委譲）
        self.dto_converter.dto_to_snapshot(&dto)
    }

    /// YAML文字列を解析してスナップショットに変換
    ///
    /// # Arguments
    ///
    /// * `content` - YAML文字列
    pub fn parse_snapshot_str(&self, content: &str) -> Result<SchemaSnapshot> {
        let dto: SnapshotDto = serde_saphyr::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse snapshot: {}", e))?;

        self.dto_converter.dto_to_snapshot(&dto)
    }

    /// ディレクトリ内のYAMLファイルを収集（ファイル名順）
    fn scan_yaml_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| IoError::FileRead {
            path: dir.display().to_string(),
            cause: e.to_string(),
        })?;

        let mut yaml_files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IoError::FileRead {
                path: dir.display().to_string(),
                cause: e.to_string(),
            })?;
            let path = entry.path();
            if path.is_file() {
                if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
                    if extension == "yaml" || extension == "yml" {
                        yaml_files.push(path);
                    }
                }
            }
        }

        yaml_files.sort();
        Ok(yaml_files)
    }

    /// serde_saphyrエラーから行番号を抽出
    fn extract_line_from_error(&self, error: &serde_saphyr::Error) -> Option<usize> {
        let error_message = error.to_string();
        let re = Regex::new(r"line (\d+)").ok()?;
        re.captures(&error_message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// エラーメッセージのフォーマット
    fn format_parse_error(&self, file_path: &Path, error: serde_saphyr::Error) -> anyhow::Error {
        match self.extract_line_from_error(&error) {
            Some(line) => anyhow::anyhow!(
                "Failed to parse snapshot file {:?} at line {}: {}",
                file_path,
                line,
                error
            ),
            None => anyhow::anyhow!("Failed to parse snapshot file {:?}: {}", file_path, error),
        }
    }
}
