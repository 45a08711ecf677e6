// 汎用属性変更ポリシー
//
// 全オブジェクト種別のフォールバック。差分セットの各差分を
// そのまま属性変更レコードへ変換します。

use crate::core::change::ChangeRecord;
use crate::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
use crate::core::error::ReconcileError;
use crate::core::snapshot::ObjectKind;
use crate::services::policy_registry::{PolicyChain, PolicyPriority, ReconcilePolicy};

/// 汎用属性変更ポリシー
///
/// 差分1件につき属性変更レコードを1件生成します。変更の方向は
/// 比較側（現在の状態）から参照側（望ましい状態）です。
#[derive(Debug, Clone, Default)]
pub struct ChangedAttributePolicy {}

impl ChangedAttributePolicy {
    /// 新しいChangedAttributePolicyを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl ReconcilePolicy for ChangedAttributePolicy {
    fn name(&self) -> &str {
        "changed_attribute"
    }

    fn priority(&self, _kind: ObjectKind) -> PolicyPriority {
        PolicyPriority::Default
    }

    fn generate(
        &self,
        pair: &ObjectPair<'_>,
        differences: &mut DifferenceSet,
        _context: &ComparisonContext,
        _chain: &mut PolicyChain<'_>,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        let records = differences
            .iter()
            .map(|difference| ChangeRecord::AlterAttribute {
                kind: pair.kind(),
                name: pair.name().to_string(),
                attribute: difference.attribute.clone(),
                from: difference.compared_value.clone(),
                to: difference.reference_value.clone(),
            })
            .collect();

        Ok(records)
    }
}
