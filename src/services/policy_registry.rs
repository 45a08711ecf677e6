// ポリシーレジストリ
//
// 差分セットを変更レコードへ変換するポリシーの登録と解決を行います。
// 解決は種別ごとの優先度に基づき、同率の場合は登録順が優先されます。
// ポリシーは明示的なチェーンを通じて次点のポリシーへ委譲できます。

use tracing::debug;

use crate::core::change::ChangeRecord;
use crate::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
use crate::core::error::ReconcileError;
use crate::core::snapshot::ObjectKind;

/// ポリシー優先度
///
/// `None` は「適用しない」を意味し、選択されることはありません。
/// それ以外は高いものが優先されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PolicyPriority {
    /// 適用しない
    None,
    /// 汎用ポリシーの標準優先度
    Default,
    /// 特化ポリシーの追加優先度（Default より優先）
    Additional,
}

impl PolicyPriority {
    /// 適用可能な優先度かどうか
    pub fn is_applicable(&self) -> bool {
        !matches!(self, PolicyPriority::None)
    }
}

/// 照合ポリシー
///
/// 単一オブジェクトペアの差分セットから変更レコードを生成します。
/// ポリシーは差分セットの読み取り・削除・値の書き換えのみ行えます。
/// 差分の新規作成は差分計算サービスの専権です。
pub trait ReconcilePolicy: Send + Sync {
    /// ポリシー名を取得
    fn name(&self) -> &str;

    /// 指定された種別に対する優先度を取得
    fn priority(&self, kind: ObjectKind) -> PolicyPriority;

    /// 変更レコードを生成
    ///
    /// `chain` を通じて次点の適用可能ポリシーへ委譲できます。
    ///
    /// # Arguments
    ///
    /// * `pair` - 処理対象のオブジェクトペア
    /// * `differences` - ペアの差分セット（この呼び出しが排他的に所有）
    /// * `context` - 比較コンテキスト
    /// * `chain` - 次点ポリシーへのチェーン
    fn generate(
        &self,
        pair: &ObjectPair<'_>,
        differences: &mut DifferenceSet,
        context: &ComparisonContext,
        chain: &mut PolicyChain<'_>,
    ) -> Result<Vec<ChangeRecord>, ReconcileError>;
}

/// ポリシーチェーン
///
/// あるオブジェクト種別に適用可能なポリシーを優先度降順に保持し、
/// ポリシーからの委譲呼び出しを次のポリシーへ転送します。
pub struct PolicyChain<'a> {
    policies: Vec<&'a dyn ReconcilePolicy>,
    cursor: usize,
}

impl<'a> PolicyChain<'a> {
    /// 新しいポリシーチェーンを作成
    pub fn new(policies: Vec<&'a dyn ReconcilePolicy>) -> Self {
        Self {
            policies,
            cursor: 0,
        }
    }

    /// チェーン内の次のポリシーを呼び出す
    ///
    /// チェーンが尽きている場合は空の変更レコードを返します。
    pub fn generate_next(
        &mut self,
        pair: &ObjectPair<'_>,
        differences: &mut DifferenceSet,
        context: &ComparisonContext,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        match self.policies.get(self.cursor).copied() {
            Some(policy) => {
                self.cursor += 1;
                debug!(policy = policy.name(), object = pair.name(), "Invoking policy");
                policy.generate(pair, differences, context, self)
            }
            None => Ok(Vec::new()),
        }
    }

    /// 未呼び出しのポリシー数を取得
    pub fn remaining(&self) -> usize {
        self.policies.len().saturating_sub(self.cursor)
    }
}

/// ポリシーレジストリ
///
/// 登録されたポリシーの順序付きリストを保持します。
/// 比較実行中は読み取り専用であり、並行する比較実行間で共有できます。
#[derive(Default)]
pub struct PolicyRegistry {
    policies: Vec<Box<dyn ReconcilePolicy>>,
}

impl PolicyRegistry {
    /// 新しいPolicyRegistryを作成
    pub fn new() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// ポリシーを登録
    pub fn register(&mut self, policy: Box<dyn ReconcilePolicy>) {
        self.policies.push(policy);
    }

    /// 登録されたポリシー数を取得
    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// ポリシーが登録されていないかどうか
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// 指定された種別に対する最優先ポリシーを選択
    ///
    /// 優先度が `None` のポリシーは選択されません。
    /// 同率の場合は先に登録されたポリシーが選ばれます。
    pub fn select(&self, kind: ObjectKind) -> Option<&dyn ReconcilePolicy> {
        self.resolve_chain(kind).into_iter().next()
    }

    /// 指定された種別に適用可能なポリシーを優先度降順で解決
    ///
    /// 安定ソートにより、同率の優先度では登録順が保持されます。
    pub fn resolve_chain(&self, kind: ObjectKind) -> Vec<&dyn ReconcilePolicy> {
        let mut applicable: Vec<&dyn ReconcilePolicy> = self
            .policies
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.priority(kind).is_applicable())
            .collect();
        applicable.sort_by(|a, b| b.priority(kind).cmp(&a.priority(kind)));
        applicable
    }

    /// ペアの差分セットにポリシーを適用して変更レコードを生成
    ///
    /// 最優先ポリシーを起点にチェーンを構築して呼び出します。
    /// 適用可能なポリシーがない場合は空の変更レコードを返します。
    pub fn apply(
        &self,
        pair: &ObjectPair<'_>,
        differences: &mut DifferenceSet,
        context: &ComparisonContext,
    ) -> Result<Vec<ChangeRecord>, ReconcileError> {
        let resolved = self.resolve_chain(pair.kind());
        if resolved.is_empty() {
            debug!(kind = %pair.kind(), object = pair.name(), "No applicable policy");
            return Ok(Vec::new());
        }

        let mut chain = PolicyChain::new(resolved);
        chain.generate_next(pair, differences, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::{Provenance, SchemaObject};

    /// 呼び出し記録用のテストポリシー
    struct StubPolicy {
        name: &'static str,
        priority: PolicyPriority,
        kind: ObjectKind,
        delegate: bool,
    }

    impl ReconcilePolicy for StubPolicy {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self, kind: ObjectKind) -> PolicyPriority {
            if kind == self.kind {
                self.priority
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
            let mut records = vec![ChangeRecord::DropObject {
                kind: pair.kind(),
                name: self.name.to_string(),
            }];
            if self.delegate {
                records.extend(chain.generate_next(pair, differences, context)?);
            }
            Ok(records)
        }
    }

    fn stub(name: &'static str, priority: PolicyPriority, delegate: bool) -> Box<StubPolicy> {
        Box::new(StubPolicy {
            name,
            priority,
            kind: ObjectKind::ForeignKey,
            delegate,
        })
    }

    fn run_registry(registry: &PolicyRegistry) -> Vec<String> {
        let reference = SchemaObject::new("fk", ObjectKind::ForeignKey);
        let compared = SchemaObject::new("fk", ObjectKind::ForeignKey);
        let pair = ObjectPair::new(&reference, &compared).unwrap();
        let mut differences = DifferenceSet::new();
        let context = ComparisonContext::new(Provenance::Authoritative, Provenance::Authoritative);

        registry
            .apply(&pair, &mut differences, &context)
            .unwrap()
            .into_iter()
            .map(|record| match record {
                ChangeRecord::DropObject { name, .. } => name,
                other => other.kind().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_registry_empty() {
        let registry = PolicyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.select(ObjectKind::ForeignKey).is_none());
        assert!(run_registry(&registry).is_empty());
    }

    #[test]
    fn test_select_highest_priority() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("generic", PolicyPriority::Default, false));
        registry.register(stub("specialized", PolicyPriority::Additional, false));

        let selected = registry.select(ObjectKind::ForeignKey).unwrap();
        assert_eq!(selected.name(), "specialized");
    }

    #[test]
    fn test_select_tie_breaks_by_registration_order() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("first", PolicyPriority::Default, false));
        registry.register(stub("second", PolicyPriority::Default, false));

        let selected = registry.select(ObjectKind::ForeignKey).unwrap();
        assert_eq!(selected.name(), "first");
    }

    #[test]
    fn test_none_priority_never_selected() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("inapplicable", PolicyPriority::None, false));

        assert!(registry.select(ObjectKind::ForeignKey).is_none());
    }

    #[test]
    fn test_kind_scoping() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("fk_only", PolicyPriority::Default, false));

        assert!(registry.select(ObjectKind::ForeignKey).is_some());
        assert!(registry.select(ObjectKind::Table).is_none());
    }

    #[test]
    fn test_chain_delegation() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("base", PolicyPriority::Default, false));
        registry.register(stub("override", PolicyPriority::Additional, true));

        // override が base へ委譲し、両方のレコードが並ぶ
        assert_eq!(run_registry(&registry), vec!["override", "base"]);
    }

    #[test]
    fn test_chain_exhausted_returns_empty() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("lonely", PolicyPriority::Default, true));

        // 委譲先がない場合、チェーンは空の変更レコードを返す
        assert_eq!(run_registry(&registry), vec!["lonely"]);
    }

    #[test]
    fn test_resolve_chain_order() {
        let mut registry = PolicyRegistry::new();
        registry.register(stub("generic_a", PolicyPriority::Default, false));
        registry.register(stub("specialized", PolicyPriority::Additional, false));
        registry.register(stub("generic_b", PolicyPriority::Default, false));

        let chain: Vec<&str> = registry
            .resolve_chain(ObjectKind::ForeignKey)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(chain, vec!["specialized", "generic_a", "generic_b"]);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(PolicyPriority::Additional > PolicyPriority::Default);
        assert!(PolicyPriority::Default > PolicyPriority::None);
        assert!(!PolicyPriority::None.is_applicable());
        assert!(PolicyPriority::Default.is_applicable());
    }
}
