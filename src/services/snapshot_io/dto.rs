// スナップショットDTO定義
//
// YAMLファイルの構造をそのまま写し取るデータ転送オブジェクト。
// 内部モデルへの変換はDtoConverterServiceが行います。

use serde::Deserialize;
use std::collections::BTreeMap;

/// スナップショットファイルのDTO
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotDto {
    /// スナップショットの由来（"authoritative" または "inferred"）
    pub provenance: String,

    /// オブジェクト定義のリスト
    #[serde(default)]
    pub objects: Vec<ObjectDto>,
}

/// オブジェクト定義のDTO
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDto {
    /// オブジェクト名
    pub name: String,

    /// オブジェクト種別（"TABLE" など）
    pub kind: String,

    /// 属性名から値へのマップ
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDto>,
}

/// 属性値のDTO
///
/// YAMLのスカラー/リスト表現を受け付けます。型付けは変換時に行います。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttributeDto {
    /// 値なし
    Null,
    /// 真偽値
    Bool(bool),
    /// 整数値
    Integer(i64),
    /// 文字列値
    Text(String),
    /// 文字列リスト
    List(Vec<String>),
}
