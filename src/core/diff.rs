// 差分ドメインモデル
//
// オブジェクトペア間の属性差分を表現する型システム。
// Difference, DifferenceSet, ObjectPair, ComparisonContext を提供します。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::ReconcileError;
use crate::core::snapshot::{AttributeValue, ObjectKind, Provenance, SchemaObject};

/// 属性差分
///
/// 単一属性の参照側・比較側の値の組を表現します。
/// 差分計算サービスのみが生成します。ポリシーは削除と値の書き換えのみ行えます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    /// 属性名
    pub attribute: String,

    /// 参照側の値
    pub reference_value: AttributeValue,

    /// 比較側の値
    pub compared_value: AttributeValue,
}

impl Difference {
    /// 新しい属性差分を作成
    pub fn new(
        attribute: impl Into<String>,
        reference_value: AttributeValue,
        compared_value: AttributeValue,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            reference_value,
            compared_value,
        }
    }
}

/// 差分セット
///
/// 単一のオブジェクトペアに属する属性差分の順序付きマップ。
/// ポリシーフェーズの間のみ可変で、そのペアを処理する単一の
/// ポリシー解決呼び出しが排他的に所有します。
///
/// ポリシーフェーズ後に残存する差分は、すべて意図された本物の構造変更を表します。
/// 差分の削除は「この属性に対する操作は不要」という表明です。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DifferenceSet {
    /// 属性名から差分へのマップ
    differences: BTreeMap<String, Difference>,
}

impl DifferenceSet {
    /// 新しい差分セットを作成
    pub fn new() -> Self {
        Self {
            differences: BTreeMap::new(),
        }
    }

    /// 差分を登録
    pub fn insert(&mut self, difference: Difference) {
        self.differences
            .insert(difference.attribute.clone(), difference);
    }

    /// 指定された属性に差分があるか確認
    pub fn is_different(&self, attribute: &str) -> bool {
        self.differences.contains_key(attribute)
    }

    /// 指定された属性の差分を取得
    pub fn get_difference(&self, attribute: &str) -> Option<&Difference> {
        self.differences.get(attribute)
    }

    /// 指定された属性の差分を削除
    ///
    /// 削除された差分を返します。存在しない場合は None を返します。
    pub fn remove_difference(&mut self, attribute: &str) -> Option<Difference> {
        self.differences.remove(attribute)
    }

    /// 差分が存在するかどうか
    pub fn has_differences(&self) -> bool {
        !self.differences.is_empty()
    }

    /// 差分が空かどうか
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// 差分の項目数を取得
    pub fn count(&self) -> usize {
        self.differences.len()
    }

    /// 差分を属性名順に反復
    pub fn iter(&self) -> impl Iterator<Item = &Difference> {
        self.differences.values()
    }

    /// 差分のある属性名を属性名順に取得
    pub fn attribute_names(&self) -> Vec<&str> {
        self.differences.keys().map(|k| k.as_str()).collect()
    }
}

/// オブジェクトペア
///
/// 同一の識別子（種別と名前）を持つ参照側・比較側のオブジェクトの組。
/// 差分計算とポリシー適用の単位です。
#[derive(Debug, Clone, Copy)]
pub struct ObjectPair<'a> {
    reference: &'a SchemaObject,
    compared: &'a SchemaObject,
}

impl<'a> ObjectPair<'a> {
    /// 新しいオブジェクトペアを作成
    ///
    /// # Errors
    ///
    /// 両側の種別または名前が一致しない場合は `ReconcileError::MismatchedPair` を返します。
    pub fn new(
        reference: &'a SchemaObject,
        compared: &'a SchemaObject,
    ) -> Result<Self, ReconcileError> {
        if reference.kind != compared.kind || reference.name != compared.name {
            return Err(ReconcileError::MismatchedPair {
                expected: reference.qualified_name(),
                actual: compared.qualified_name(),
            });
        }
        Ok(Self {
            reference,
            compared,
        })
    }

    /// オブジェクト種別を取得
    pub fn kind(&self) -> ObjectKind {
        self.reference.kind
    }

    /// オブジェクト名を取得
    pub fn name(&self) -> &str {
        &self.reference.name
    }

    /// 参照側のオブジェクトを取得
    pub fn reference(&self) -> &SchemaObject {
        self.reference
    }

    /// 比較側のオブジェクトを取得
    pub fn compared(&self) -> &SchemaObject {
        self.compared
    }
}

/// 比較コンテキスト
///
/// 比較実行全体で共有される読み取り専用の情報。
/// 両側のスナップショットの由来を保持します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonContext {
    /// 参照側の由来
    pub reference_provenance: Provenance,

    /// 比較側の由来
    pub compared_provenance: Provenance,
}

impl ComparisonContext {
    /// 新しい比較コンテキストを作成
    pub fn new(reference_provenance: Provenance, compared_provenance: Provenance) -> Self {
        Self {
            reference_provenance,
            compared_provenance,
        }
    }

    /// いずれかの側が推定スナップショットかどうか
    pub fn involves_inferred(&self) -> bool {
        self.reference_provenance.is_inferred() || self.compared_provenance.is_inferred()
    }
}
