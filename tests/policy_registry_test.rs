/// ポリシーレジストリの統合テスト
///
/// このテストは、ホストが独自ポリシーを登録して組み込みポリシーを
/// 上書き・委譲できること、および解決が決定的であることを確認します。

#[cfg(test)]
mod policy_registry_tests {
    use converge::core::change::ChangeRecord;
    use converge::core::diff::{ComparisonContext, DifferenceSet, ObjectPair};
    use converge::core::error::ReconcileError;
    use converge::core::snapshot::{
        AttributeValue, ObjectKind, Provenance, SchemaObject, SchemaSnapshot,
    };
    use converge::services::policy_registry::{PolicyChain, PolicyPriority, ReconcilePolicy};
    use converge::services::reconciler::SchemaReconciler;

    /// インデックス差分をすべて無視するホスト定義ポリシー
    struct IgnoreIndexPolicy {}

    impl ReconcilePolicy for IgnoreIndexPolicy {
        fn name(&self) -> &str {
            "ignore_index"
        }

        fn priority(&self, kind: ObjectKind) -> PolicyPriority {
            if kind == ObjectKind::Index {
                PolicyPriority::Additional
            } else {
                PolicyPriority::None
            }
        }

        fn generate(
            &self,
            _pair: &ObjectPair<'_>,
            differences: &mut DifferenceSet,
            _context: &ComparisonContext,
            _chain: &mut PolicyChain<'_>,
        ) -> Result<Vec<ChangeRecord>, ReconcileError> {
            // すべての差分を「操作不要」として除去する
            let attributes: Vec<String> = differences
                .attribute_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect();
            for attribute in attributes {
                differences.remove_difference(&attribute);
            }
            Ok(Vec::new())
        }
    }

    fn index_snapshot(unique: bool) -> SchemaSnapshot {
        SchemaSnapshot::new(Provenance::Authoritative).with_object(
            SchemaObject::new("idx_users_email", ObjectKind::Index)
                .with_attribute("unique", AttributeValue::Bool(unique)),
        )
    }

    /// 追加優先度のホストポリシーが組み込みポリシーより先に選択される
    #[test]
    fn test_host_policy_overrides_builtin() {
        let mut reconciler = SchemaReconciler::new().with_default_policies();
        reconciler.register_policy(Box::new(IgnoreIndexPolicy {}));

        let records = reconciler
            .diff_and_generate(&index_snapshot(true), &index_snapshot(false))
            .unwrap();

        // 組み込みの汎用ポリシーなら ALTER_ATTRIBUTE を生成するところを抑制
        assert!(records.is_empty());
    }

    /// ホストポリシーは対象外の種別には影響しない
    #[test]
    fn test_host_policy_scoped_by_kind() {
        let mut reconciler = SchemaReconciler::new().with_default_policies();
        reconciler.register_policy(Box::new(IgnoreIndexPolicy {}));

        let reference = SchemaSnapshot::new(Provenance::Authoritative).with_object(
            SchemaObject::new("users", ObjectKind::Table)
                .with_attribute("comment", AttributeValue::Text("a".to_string())),
        );
        let compared = SchemaSnapshot::new(Provenance::Authoritative).with_object(
            SchemaObject::new("users", ObjectKind::Table)
                .with_attribute("comment", AttributeValue::Text("b".to_string())),
        );

        let records = reconciler.diff_and_generate(&reference, &compared).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind(), "ALTER_ATTRIBUTE");
    }

    /// 登録順を固定すれば2回の実行結果はバイト単位で一致する
    #[test]
    fn test_registration_order_determinism() {
        let build = || {
            let mut reconciler = SchemaReconciler::new().with_default_policies();
            reconciler.register_policy(Box::new(IgnoreIndexPolicy {}));
            reconciler
        };

        let reference = index_snapshot(true)
            .with_object(SchemaObject::new("users", ObjectKind::Table));
        let compared = index_snapshot(false);

        let first = build().diff_and_generate(&reference, &compared).unwrap();
        let second = build().diff_and_generate(&reference, &compared).unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    /// 組み込みポリシーの解決順を確認
    #[test]
    fn test_builtin_chain_resolution() {
        let reconciler = SchemaReconciler::new().with_default_policies();
        let registry = reconciler.registry();

        // 外部キーは推定スナップショット向けポリシーが最優先
        let selected = registry.select(ObjectKind::ForeignKey).unwrap();
        assert_eq!(selected.name(), "inferred_foreign_key");

        // 解決されたチェーンは優先度降順・同率は登録順
        let chain: Vec<&str> = registry
            .resolve_chain(ObjectKind::ForeignKey)
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(
            chain,
            vec!["inferred_foreign_key", "changed_foreign_key", "changed_attribute"]
        );

        // その他の種別は汎用ポリシーのみ
        let selected = registry.select(ObjectKind::Column).unwrap();
        assert_eq!(selected.name(), "changed_attribute");
    }
}
