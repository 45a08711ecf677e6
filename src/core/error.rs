// エラー型定義
//
// エンジン全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ReconcileError, ComparisonIssue, IoError を定義します。

use thiserror::Error;

use crate::core::snapshot::ObjectKind;

/// スナップショットの側
///
/// 比較においてどちら側のスナップショットかを表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSide {
    /// 参照側（望ましい状態）
    Reference,
    /// 比較側（現在の状態）
    Compared,
}

impl std::fmt::Display for SnapshotSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSide::Reference => write!(f, "reference"),
            SnapshotSide::Compared => write!(f, "compared"),
        }
    }
}

/// 照合エラー
///
/// 差分計算・ポリシー適用時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// Policy contract violation
    ///
    /// ベースラインポリシーの出力が、書き換えを前提とした形状と
    /// 一致しない場合に発生します。推測による続行はせず即座に失敗します。
    #[error("Policy contract violation in '{policy}': {message}")]
    PolicyContract {
        /// 違反を検出したポリシー名
        policy: String,
        /// エラーメッセージ
        message: String,
    },

    /// Incomplete comparison
    ///
    /// 要求されたオブジェクトペアの片側が欠落している場合に発生します。
    /// 欠落側のデフォルト値を捏造することはしません。
    #[error("Incomplete comparison for {kind} '{name}': missing {missing_side} side")]
    IncompleteComparison {
        /// オブジェクト種別
        kind: ObjectKind,
        /// オブジェクト名
        name: String,
        /// 欠落している側
        missing_side: SnapshotSide,
    },

    /// Mismatched object pair
    ///
    /// 種別または名前の異なるオブジェクト同士をペアにしようとした場合に発生します。
    #[error("Mismatched object pair: expected '{expected}', got '{actual}'")]
    MismatchedPair {
        /// 期待された修飾名
        expected: String,
        /// 実際の修飾名
        actual: String,
    },
}

impl ReconcileError {
    /// ポリシー契約違反かどうか
    pub fn is_policy_contract(&self) -> bool {
        matches!(self, ReconcileError::PolicyContract { .. })
    }

    /// 不完全比較エラーかどうか
    pub fn is_incomplete_comparison(&self) -> bool {
        matches!(self, ReconcileError::IncompleteComparison { .. })
    }

    /// ペア不一致エラーかどうか
    pub fn is_mismatched_pair(&self) -> bool {
        matches!(self, ReconcileError::MismatchedPair { .. })
    }
}

/// 比較イシュー
///
/// 単一属性の比較失敗を表現します。エラーではなく収集対象であり、
/// 他の属性・他のオブジェクトペアの処理は中断されません。
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonIssue {
    /// オブジェクト種別
    pub object_kind: ObjectKind,
    /// オブジェクト名
    pub object_name: String,
    /// 属性名
    pub attribute: String,
    /// イシューメッセージ
    pub message: String,
}

impl ComparisonIssue {
    /// 新しい比較イシューを作成
    pub fn new(
        object_kind: ObjectKind,
        object_name: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            object_kind,
            object_name: object_name.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// イシューをフォーマット
    pub fn format(&self) -> String {
        format!(
            "Issue: {} ({} '{}', attribute: {})",
            self.message, self.object_kind, self.object_name, self.attribute
        )
    }
}

/// I/Oエラー
///
/// スナップショットファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }
}
