// スナップショット照合サービス
//
// 2つのスナップショット間の全オブジェクトペアに対して差分計算と
// ポリシー適用を実行し、変更レコードを生成するエンジンの窓口。

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::change::ChangeRecord;
use crate::core::config::EngineConfig;
use crate::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
use crate::core::error::{ComparisonIssue, ReconcileError, SnapshotSide};
use crate::core::snapshot::{ObjectKind, SchemaSnapshot};
use crate::services::difference_computer::DifferenceComputerService;
use crate::services::policies::{
    ChangedAttributePolicy, ChangedForeignKeyPolicy, InferredForeignKeyPolicy,
};
use crate::services::policy_registry::{PolicyRegistry, ReconcilePolicy};

/// スナップショット照合サービス
///
/// ポリシーレジストリは比較実行中は読み取り専用であり、オブジェクトペアごとの
/// 差分セットはそのペアを処理するポリシー解決呼び出しが排他的に所有します。
/// ペア間の共有状態は存在しないため、独立したペアの並列化は呼び出し側の自由です。
pub struct SchemaReconciler {
    config: EngineConfig,
    computer: DifferenceComputerService,
    registry: PolicyRegistry,
}

impl SchemaReconciler {
    /// 新しいSchemaReconcilerを作成
    ///
    /// ポリシーは未登録の状態で作成されます。
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// 設定を指定してSchemaReconcilerを作成
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            computer: DifferenceComputerService::with_config(config.clone()),
            config,
            registry: PolicyRegistry::new(),
        }
    }

    /// 組み込みポリシーを登録したSchemaReconcilerを返す
    ///
    /// ベースラインの外部キーポリシー、汎用属性変更ポリシー、
    /// 推定スナップショット向け外部キーポリシーを登録します。
    pub fn with_default_policies(mut self) -> Self {
        self.register_policy(Box::new(ChangedForeignKeyPolicy::new()));
        self.register_policy(Box::new(ChangedAttributePolicy::new()));
        self.register_policy(Box::new(InferredForeignKeyPolicy::new()));
        self
    }

    /// ポリシーを登録
    pub fn register_policy(&mut self, policy: Box<dyn ReconcilePolicy>) {
        self.registry.register(policy);
    }

    /// ポリシーレジストリを取得
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// 2つのスナップショットを比較して変更レコードを生成
    ///
    /// # Arguments
    ///
    /// * `reference` - 参照側スナップショット（望ましい状態）
    /// * `compared` - 比較側スナップショット（現在の状態）
    ///
    /// # Returns
    ///
    /// 変更レコードのリスト
    pub fn diff_and_generate(
        &self,
        reference: &SchemaSnapshot,
        compared: &SchemaSnapshot,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        self.diff_and_generate_with_issues(reference, compared)
            .map(|(records, _)| records)
    }

    /// 2つのスナップショットを比較して変更レコードを生成（イシュー付き）
    ///
    /// 属性単位の比較失敗はイシューとして収集され、他の属性・
    /// 他のオブジェクトペアの処理は中断されません。
    ///
    /// # Arguments
    ///
    /// * `reference` - 参照側スナップショット（望ましい状態）
    /// * `compared` - 比較側スナップショット（現在の状態）
    ///
    /// # Returns
    ///
    /// 変更レコードとイシューのタプル
    pub fn diff_and_generate_with_issues(
        &self,
        reference: &SchemaSnapshot,
        compared: &SchemaSnapshot,
    ) -> Result<(Vec<ChangeRecord>, Vec<ComparisonIssue>), ReconcileError> {
        debug!(
            reference_provenance = %reference.provenance,
            compared_provenance = %compared.provenance,
            "Starting snapshot comparison"
        );

        let context = ComparisonContext::new(reference.provenance, compared.provenance);
        let mut records = Vec::new();
        let mut issues = Vec::new();

        // 修飾名の和集合を走査する（BTreeMapにより決定的な順序）
        let qualified_names: BTreeSet<&String> = reference
            .objects
            .keys()
            .chain(compared.objects.keys())
            .collect();

        for qualified_name in qualified_names {
            match (
                reference.objects.get(qualified_name),
                compared.objects.get(qualified_name),
            ) {
                (Some(reference_object), Some(compared_object)) => {
                    let pair = ObjectPair::new(reference_object, compared_object)?;
                    let (mut differences, pair_issues) = self.computer.compute_with_issues(&pair);
                    issues.extend(pair_issues);

                    if differences.is_empty() {
                        debug!(object = %qualified_name, "No differences");
                        continue;
                    }

                    let pair_records = self.registry.apply(&pair, &mut differences, &context)?;
                    records.extend(pair_records);
                }
                (Some(reference_object), None) => {
                    if self.config.emit_added_objects {
                        records.push(ChangeRecord::AddObject {
                            object: reference_object.clone(),
                        });
                    }
                }
                (None, Some(compared_object)) => {
                    if self.config.emit_removed_objects {
                        records.push(ChangeRecord::DropObject {
                            kind: compared_object.kind,
                            name: compared_object.name.clone(),
                        });
                    }
                }
                (None, None) => {}
            }
        }

        debug!(record_count = records.len(), "Snapshot comparison finished");
        Ok((records, issues))
    }

    /// 指定されたオブジェクトペアの差分を計算
    ///
    /// # Errors
    ///
    /// いずれかの側にオブジェクトが存在しない場合は
    /// `ReconcileError::IncompleteComparison` を返します。
    pub fn compare_pair(
        &self,
        reference: &SchemaSnapshot,
        compared: &SchemaSnapshot,
        kind: ObjectKind,
        name: &str,
    ) -> Result<DifferenceSet, ReconcileError> {
        let reference_object = reference.get_object(kind, name).ok_or_else(|| {
            ReconcileError::IncompleteComparison {
                kind,
                name: name.to_string(),
                missing_side: SnapshotSide::Reference,
            }
        })?;
        let compared_object = compared.get_object(kind, name).ok_or_else(|| {
            ReconcileError::IncompleteComparison {
                kind,
                name: name.to_string(),
                missing_side: SnapshotSide::Compared,
            }
        })?;

        let pair = ObjectPair::new(reference_object, compared_object)?;
        Ok(self.computer.compute(&pair))
    }
}

impl Default for SchemaReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl crate::services::traits::SnapshotDiffer for SchemaReconciler {
    fn diff_and_generate(
        &self,
        reference: &SchemaSnapshot,
        compared: &SchemaSnapshot,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        self.diff_and_generate(reference, compared)
    }
}
