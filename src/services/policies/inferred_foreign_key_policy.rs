// 推定スナップショット向け外部キーポリシー
//
// マッピングメタデータから推定されたスナップショットは、外部キーについて
// 「制約が存在するか」とカスケードルール以外を正確にモデル化できません。
// このポリシーはベースラインへ委譲した上で、カスケードルール以外に起因する
// ノイズ差分の波及を抑え、ルール変更のみを再作成レコードへ反映します。

use tracing::debug;

use crate::core::change::ChangeRecord;
use crate::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
use crate::core::error::ReconcileError;
use crate::core::snapshot::{attrs, AttributeValue, ObjectKind, ReferentialAction};
use crate::services::policy_registry::{PolicyChain, PolicyPriority, ReconcilePolicy};

/// 推定スナップショット向け外部キーポリシー
///
/// 外部キー種別に対して追加優先度を持ち、ベースラインの外部キーポリシーへ
/// チェーンします。比較のどちらの側も推定スナップショットでない場合は
/// ベースラインの出力をそのまま返します。
#[derive(Debug, Clone, Default)]
pub struct InferredForeignKeyPolicy {}

impl InferredForeignKeyPolicy {
    /// 新しいInferredForeignKeyPolicyを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 単一のルール属性差分を処理
    ///
    /// - 参照側が欠落または NO ACTION の場合: この差分は実際の意図を
    ///   持たないため、比較側の値にかかわらず削除する
    /// - 参照側が具体的なルールの場合: 再作成レコードの対応フィールドへ
    ///   書き込み、差分はレコードへ畳み込まれたものとして削除する
    /// - 参照側がアクションとして解釈できない場合: 本物の値として扱い、
    ///   差分には触れない
    fn apply_rule(
        differences: &mut DifferenceSet,
        attribute: &str,
        slot: &mut Option<ReferentialAction>,
        folded: &mut bool,
    ) {
        let reference_value = match differences.get_difference(attribute) {
            Some(difference) => difference.reference_value.clone(),
            None => return,
        };

        match reference_value {
            AttributeValue::Null => {
                differences.remove_difference(attribute);
            }
            AttributeValue::Action(action) if action.is_no_action() => {
                // 「ルールから NO ACTION への変更」と「実質変更なし」は
                // どちらも操作不要として同一視する
                differences.remove_difference(attribute);
            }
            AttributeValue::Action(action) => {
                *slot = Some(action);
                differences.remove_difference(attribute);
                *folded = true;
            }
            _ => {}
        }
    }
}

impl ReconcilePolicy for InferredForeignKeyPolicy {
    fn name(&self) -> &str {
        "inferred_foreign_key"
    }

    fn priority(&self, kind: ObjectKind) -> PolicyPriority {
        if kind == ObjectKind::ForeignKey {
            PolicyPriority::Additional
        } else {
            PolicyPriority::None
        }
    }

    fn generate(
        &self,
        pair: &ObjectPair<'_>,
        differences: &mut DifferenceSet,
        context: &ComparisonContext,
        chain: &mut PolicyChain<'_>,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        let baseline = chain.generate_next(pair, differences, context)?;

        // 推定スナップショットが関与しない比較では特別扱いしない
        if !context.involves_inferred() {
            return Ok(baseline);
        }

        // 削除・再作成ペア以外の形状はそのまま返す
        if baseline.len() != 2 {
            return Ok(baseline);
        }

        let has_rule_differences = differences.is_different(attrs::DELETE_RULE)
            || differences.is_different(attrs::UPDATE_RULE);

        let recognized = matches!(
            baseline.as_slice(),
            [
                ChangeRecord::DropForeignKey { .. },
                ChangeRecord::AddForeignKey { .. }
            ]
        );
        if !recognized {
            if has_rule_differences {
                return Err(ReconcileError::PolicyContract {
                    policy: self.name().to_string(),
                    message: format!(
                        "expected drop-and-recreate constraint pair for '{}', got [{}, {}]",
                        pair.name(),
                        baseline[0].kind(),
                        baseline[1].kind()
                    ),
                });
            }
            return Ok(baseline);
        }

        let mut records = baseline;
        let mut folded = false;

        if let [_, ChangeRecord::AddForeignKey {
            on_delete,
            on_update,
            ..
        }] = records.as_mut_slice()
        {
            Self::apply_rule(differences, attrs::DELETE_RULE, on_delete, &mut folded);
            Self::apply_rule(differences, attrs::UPDATE_RULE, on_update, &mut folded);
        }

        // ルール処理後に実際の意図を持つ差分が残らなければ、ペア全体を抑制する。
        // ルールの畳み込みが発生した場合は本物の変化が存在したため抑制しない。
        if !differences.has_differences() && !folded {
            debug!(
                object = pair.name(),
                "Suppressing foreign key changes without real intent"
            );
            return Ok(Vec::new());
        }

        Ok(records)
    }
}
