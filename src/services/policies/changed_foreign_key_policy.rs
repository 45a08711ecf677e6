// 外部キー変更ポリシー
//
// 変更された外部キー制約のベースラインポリシー。既存制約の削除と
// 参照側定義からの再作成のペアを生成します。

use crate::core::change::ChangeRecord;
use crate::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
use crate::core::error::ReconcileError;
use crate::core::snapshot::{attrs, ObjectKind, ReferentialAction, SchemaObject};
use crate::services::policy_registry::{PolicyChain, PolicyPriority, ReconcilePolicy};

/// 外部キー変更ポリシー
///
/// 外部キーの属性変更は ALTER では表現できないため、削除・再作成の
/// 2レコードとして生成します。再作成側は参照側（望ましい状態）の
/// 定義から構築されます。
#[derive(Debug, Clone, Default)]
pub struct ChangedForeignKeyPolicy {}

impl ChangedForeignKeyPolicy {
    /// 新しいChangedForeignKeyPolicyを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 参照側オブジェクトから外部キー追加レコードを構築
    fn build_add_record(&self, reference: &SchemaObject) -> ChangeRecord {
        ChangeRecord::AddForeignKey {
            constraint_name: reference.name.clone(),
            table: string_attr(reference, attrs::TABLE),
            columns: list_attr(reference, attrs::COLUMNS),
            referenced_table: string_attr(reference, attrs::REFERENCED_TABLE),
            referenced_columns: list_attr(reference, attrs::REFERENCED_COLUMNS),
            on_delete: rule_attr(reference, attrs::DELETE_RULE),
            on_update: rule_attr(reference, attrs::UPDATE_RULE),
        }
    }
}

impl ReconcilePolicy for ChangedForeignKeyPolicy {
    fn name(&self) -> &str {
        "changed_foreign_key"
    }

    fn priority(&self, kind: ObjectKind) -> PolicyPriority {
        if kind == ObjectKind::ForeignKey {
            PolicyPriority::Default
        } else {
            PolicyPriority::None
        }
    }

    fn generate(
        &self,
        pair: &ObjectPair<'_>,
        _differences: &mut DifferenceSet,
        _context: &ComparisonContext,
        _chain: &mut PolicyChain<'_>,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        let drop_record = ChangeRecord::DropForeignKey {
            constraint_name: pair.compared().name.clone(),
            table: string_attr(pair.compared(), attrs::TABLE),
        };
        let add_record = self.build_add_record(pair.reference());

        Ok(vec![drop_record, add_record])
    }
}

/// 文字列属性を取得（欠落時は空文字列）
fn string_attr(object: &SchemaObject, attribute: &str) -> String {
    object
        .get_attribute(attribute)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}

/// 名前リスト属性を取得（欠落時は空リスト）
fn list_attr(object: &SchemaObject, attribute: &str) -> Vec<String> {
    object
        .get_attribute(attribute)
        .and_then(|value| value.as_name_list())
        .map(|names| names.to_vec())
        .unwrap_or_default()
}

/// 参照アクション属性を取得
///
/// NO ACTION はデフォルト挙動のため、明示的な指定なし（None）に写像します。
fn rule_attr(object: &SchemaObject, attribute: &str) -> Option<ReferentialAction> {
    object
        .get_attribute(attribute)
        .and_then(|value| value.as_action())
        .filter(|action| !action.is_no_action())
}
