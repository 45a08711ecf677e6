// サービストレイト定義
//
// テスト時のモック差し替えを可能にするためのトレイト群。
// 各サービスの公開インターフェースを抽象化します。

use crate::core::change::ChangeRecord;
use crate::core::diff::{DifferenceSet, ObjectPair};
use crate::core::error::{ComparisonIssue, ReconcileError};
use crate::core::snapshot::SchemaSnapshot;

/// 差分計算サービスのトレイト
pub trait DifferenceComputer {
    /// オブジェクトペアの差分を計算（イシュー付き）
    fn compute_with_issues(&self, pair: &ObjectPair<'_>) -> (DifferenceSet, Vec<ComparisonIssue>);
}

/// スナップショット照合サービスのトレイト
pub trait SnapshotDiffer {
    /// 2つのスナップショットを比較して変更レコードを生成
    fn diff_and_generate(
        &self,
        reference: &SchemaSnapshot,
        compared: &SchemaSnapshot,
    ) -> Result<Vec<ChangeRecord>, ReconcileError>;
}
