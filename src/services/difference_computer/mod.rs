// 差分計算サービス
//
// 同一識別子を持つ2つのスキーマオブジェクトを属性単位で比較し、
// 差分セットを生成するサービス。入力のみに依存する純粋な計算です。

mod value_comparator;

use std::collections::BTreeSet;

use crate::core::config::EngineConfig;
use crate::core::diff::{Difference, DifferenceSet, ObjectPair};
use crate::core::error::ComparisonIssue;
use crate::core::snapshot::AttributeValue;

use value_comparator::values_equal;

/// 差分計算サービス
#[derive(Debug, Clone, Default)]
pub struct DifferenceComputerService {
    config: EngineConfig,
}

impl DifferenceComputerService {
    /// 新しいDifferenceComputerServiceを作成
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// 設定を指定してDifferenceComputerServiceを作成
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// オブジェクトペアの差分を計算
    ///
    /// 両側の属性名の和集合を走査し、属性固有の等価判定で一致しない
    /// 属性ごとに差分を生成します。片側に存在しない属性は Null として
    /// 比較されます（欠落の黙殺はしません）。
    ///
    /// # Arguments
    ///
    /// * `pair` - 比較するオブジェクトペア
    ///
    /// # Returns
    ///
    /// 差分セット
    pub fn compute(&self, pair: &ObjectPair<'_>) -> DifferenceSet {
        let (differences, _) = self.compute_with_issues(pair);
        differences
    }

    /// オブジェクトペアの差分を計算（イシュー付き）
    ///
    /// 型非互換などで比較できなかった属性は、その属性を差分として残した上で
    /// イシューとして報告します。他の属性の処理は中断されません。
    ///
    /// # Arguments
    ///
    /// * `pair` - 比較するオブジェクトペア
    ///
    /// # Returns
    ///
    /// 差分セットとイシューのタプル
    pub fn compute_with_issues(
        &self,
        pair: &ObjectPair<'_>,
    ) -> (DifferenceSet, Vec<ComparisonIssue>) {
        let mut differences = DifferenceSet::new();
        let mut issues = Vec::new();

        let attribute_names: BTreeSet<&String> = pair
            .reference()
            .attributes
            .keys()
            .chain(pair.compared().attributes.keys())
            .collect();

        for attribute in attribute_names {
            let reference_value = pair
                .reference()
                .get_attribute(attribute)
                .cloned()
                .unwrap_or(AttributeValue::Null);
            let compared_value = pair
                .compared()
                .get_attribute(attribute)
                .cloned()
                .unwrap_or(AttributeValue::Null);

            match values_equal(&reference_value, &compared_value, self.config.fold_name_case) {
                Ok(true) => {}
                Ok(false) => {
                    differences.insert(Difference::new(
                        attribute.clone(),
                        reference_value,
                        compared_value,
                    ));
                }
                Err(message) => {
                    // 比較不能の属性は本物の差分として残す（誤った抑制を避ける）
                    issues.push(ComparisonIssue::new(
                        pair.kind(),
                        pair.name(),
                        attribute.clone(),
                        message,
                    ));
                    differences.insert(Difference::new(
                        attribute.clone(),
                        reference_value,
                        compared_value,
                    ));
                }
            }
        }

        (differences, issues)
    }
}

impl crate::services::traits::DifferenceComputer for DifferenceComputerService {
    fn compute_with_issues(&self, pair: &ObjectPair<'_>) -> (DifferenceSet, Vec<ComparisonIssue>) {
        self.compute_with_issues(pair)
    }
}
