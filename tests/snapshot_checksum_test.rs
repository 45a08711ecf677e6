/// スナップショットチェックサムの統合テスト
///
/// このテストは、チェックサムの一致が「照合しても変更レコードが生成されない」
/// ことと対応するという性質を確認します。

#[cfg(test)]
mod snapshot_checksum_tests {
    use converge::core::snapshot::{
        attrs, AttributeValue, ObjectKind, Provenance, ReferentialAction, SchemaObject,
        SchemaSnapshot,
    };
    use converge::services::reconciler::SchemaReconciler;
    use converge::services::snapshot_checksum::SnapshotChecksumService;

    fn snapshot(provenance: Provenance, delete_rule: ReferentialAction) -> SchemaSnapshot {
        SchemaSnapshot::new(provenance).with_object(
            SchemaObject::new("fk_orders_user", ObjectKind::ForeignKey)
                .with_attribute(attrs::TABLE, AttributeValue::Name("orders".to_string()))
                .with_attribute(attrs::DELETE_RULE, AttributeValue::Action(delete_rule)),
        )
    }

    /// 等しいチェックサムを持つスナップショット同士の照合は変更を生成しない
    #[test]
    fn test_equal_checksums_imply_no_changes() {
        let checksum_service = SnapshotChecksumService::new();
        let reconciler = SchemaReconciler::new().with_default_policies();

        let reference = snapshot(Provenance::Inferred, ReferentialAction::Cascade);
        let compared = snapshot(Provenance::Authoritative, ReferentialAction::Cascade);

        // 由来が異なっても構造が同じならチェックサムは一致する
        assert!(checksum_service.compare_checksums(
            &checksum_service.calculate_checksum(&reference),
            &checksum_service.calculate_checksum(&compared),
        ));

        let records = reconciler.diff_and_generate(&reference, &compared).unwrap();
        assert!(records.is_empty());
    }

    /// 構造が異なればチェックサムも異なる
    #[test]
    fn test_structural_change_changes_checksum() {
        let checksum_service = SnapshotChecksumService::new();

        let cascade = snapshot(Provenance::Authoritative, ReferentialAction::Cascade);
        let restrict = snapshot(Provenance::Authoritative, ReferentialAction::Restrict);

        assert_ne!(
            checksum_service.calculate_checksum(&cascade),
            checksum_service.calculate_checksum(&restrict)
        );
    }

    /// チェックサムは実行間で安定している
    #[test]
    fn test_checksum_stable_across_runs() {
        let checksum_service = SnapshotChecksumService::new();
        let target = snapshot(Provenance::Authoritative, ReferentialAction::SetNull);

        let checksums: Vec<String> = (0..3)
            .map(|_| checksum_service.calculate_checksum(&target))
            .collect();

        assert!(checksums.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
