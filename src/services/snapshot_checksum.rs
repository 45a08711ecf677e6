// スナップショットチェックサム計算サービス
//
// スナップショットのSHA-256ハッシュ計算と比較を行うサービス。
// 正規化されたスナップショット表現を生成してチェックサムを計算します。
// 等しいチェックサムを持つスナップショット同士の比較は変更レコードを生成しません。

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::core::snapshot::{AttributeValue, SchemaObject, SchemaSnapshot};

/// スナップショットチェックサムサービス
///
/// スナップショットのSHA-256ハッシュ計算を行います。
#[derive(Debug, Clone, Default)]
pub struct SnapshotChecksumService {}

impl SnapshotChecksumService {
    /// 新しいSnapshotChecksumServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スナップショットのチェックサムを計算
    ///
    /// # Arguments
    ///
    /// * `snapshot` - チェックサムを計算するスナップショット
    ///
    /// # Returns
    ///
    /// SHA-256ハッシュ（64文字の16進数文字列）
    pub fn calculate_checksum(&self, snapshot: &SchemaSnapshot) -> String {
        let normalized = self.normalize_snapshot(snapshot);

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let result = hasher.finalize();

        format!("{:x}", result)
    }

    /// スナップショットを正規化された文字列表現に変換
    ///
    /// オブジェクトと属性の挿入順序に依存しない一貫した表現を生成します。
    /// 安定したシリアライゼーション形式（serde_json）を使用し、
    /// Rustコンパイラのバージョンに依存しない出力を保証します。
    ///
    /// 由来は正規化表現に含めません。同一構造のスナップショットは
    /// 由来によらず同じチェックサムを持ちます。
    ///
    /// # Arguments
    ///
    /// * `snapshot` - 正規化するスナップショット
    ///
    /// # Returns
    ///
    /// 正規化された文字列
    pub fn normalize_snapshot(&self, snapshot: &SchemaSnapshot) -> String {
        let mut sorted_objects = BTreeMap::new();

        for (qualified_name, object) in &snapshot.objects {
            sorted_objects.insert(
                qualified_name.clone(),
                serde_json::to_string(&Self::normalize_object(object)).unwrap_or_default(),
            );
        }

        format!(
            "{{objects:{{{}}}}}",
            sorted_objects
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join(",")
        )
    }

    /// オブジェクトを正規化されたマップに変換
    fn normalize_object(object: &SchemaObject) -> BTreeMap<String, String> {
        let mut object_data = BTreeMap::new();
        object_data.insert("name".to_string(), object.name.clone());
        object_data.insert("kind".to_string(), object.kind.as_str().to_string());

        for (attribute, value) in &object.attributes {
            object_data.insert(
                format!("attr:{}", attribute),
                Self::value_to_stable_string(value),
            );
        }

        object_data
    }

    /// 属性値を安定した文字列表現に変換
    ///
    /// Debug フォーマットに依存せず、コンパイラバージョン間で安定した出力を生成する。
    fn value_to_stable_string(value: &AttributeValue) -> String {
        match value {
            AttributeValue::Null => "NULL".to_string(),
            AttributeValue::Bool(b) => format!("BOOL({})", b),
            AttributeValue::Integer(i) => format!("INTEGER({})", i),
            AttributeValue::Text(text) => format!("TEXT({})", text),
            AttributeValue::Name(name) => format!("NAME({})", name),
            AttributeValue::Action(action) => format!("ACTION({})", action.as_sql()),
            AttributeValue::NameList(names) => format!("NAME_LIST({})", names.join(",")),
        }
    }

    /// チェックサムを比較
    ///
    /// # Arguments
    ///
    /// * `checksum1` - 比較する最初のチェックサム
    /// * `checksum2` - 比較する2番目のチェックサム
    ///
    /// # Returns
    ///
    /// チェックサムが一致する場合は true、そうでない場合は false
    pub fn compare_checksums(&self, checksum1: &str, checksum2: &str) -> bool {
        checksum1 == checksum2
    }
}
