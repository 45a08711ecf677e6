// スキーマスナップショットドメインモデル
//
// 比較対象となるデータベース構造の一時点の状態を表現する型システム。
// SchemaObject, SchemaSnapshot, AttributeValue などの構造体を提供します。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 既知の属性名
///
/// 外部キーオブジェクトで使用される属性名の定数。
/// スナップショット供給側とポリシーはこれらの名前で属性を参照します。
pub mod attrs {
    /// 制約が属するテーブル名
    pub const TABLE: &str = "table";
    /// 制約対象のカラム名リスト
    pub const COLUMNS: &str = "columns";
    /// 参照先テーブル名
    pub const REFERENCED_TABLE: &str = "referenced_table";
    /// 参照先カラム名リスト
    pub const REFERENCED_COLUMNS: &str = "referenced_columns";
    /// 参照先レコード削除時のアクション
    pub const DELETE_RULE: &str = "delete_rule";
    /// 参照先レコード更新時のアクション
    pub const UPDATE_RULE: &str = "update_rule";
}

/// スナップショットの由来
///
/// スナップショットが実データベースから取得されたもの（authoritative）か、
/// アプリケーションのマッピングメタデータから推定されたもの（inferred）かを表現します。
/// 由来はスナップショット供給側が明示的に設定します。型検査による判別は行いません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// 実データベース由来（全属性が信頼できる）
    Authoritative,
    /// マッピングメタデータからの推定（制約の存在とカスケードルール以外は信頼できない）
    Inferred,
}

impl Provenance {
    /// 推定スナップショットかどうか
    pub fn is_inferred(&self) -> bool {
        matches!(self, Provenance::Inferred)
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Authoritative => write!(f, "authoritative"),
            Provenance::Inferred => write!(f, "inferred"),
        }
    }
}

/// オブジェクト種別
///
/// スナップショットに含まれるデータベースオブジェクトの種類を表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    /// テーブル
    Table,
    /// カラム
    Column,
    /// 外部キー制約
    ForeignKey,
    /// インデックス
    Index,
}

impl ObjectKind {
    /// 種別を文字列で取得
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::Column => "COLUMN",
            ObjectKind::ForeignKey => "FOREIGN_KEY",
            ObjectKind::Index => "INDEX",
        }
    }

    /// 文字列から種別を解析
    ///
    /// 未知の文字列の場合は None を返します。
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TABLE" => Some(ObjectKind::Table),
            "COLUMN" => Some(ObjectKind::Column),
            "FOREIGN_KEY" => Some(ObjectKind::ForeignKey),
            "INDEX" => Some(ObjectKind::Index),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 参照アクション
///
/// 外部キー制約のON DELETE / ON UPDATE句で使用するアクションを表現します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    /// 何もしない（デフォルト）
    #[default]
    NoAction,
    /// 参照先の変更に追従して削除/更新
    Cascade,
    /// 参照先の削除/更新時にNULLに設定
    SetNull,
    /// 参照先の削除/更新時にデフォルト値に設定
    SetDefault,
    /// 参照先の削除/更新を制限
    Restrict,
}

impl ReferentialAction {
    /// SQL句として出力する文字列を返す
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
            ReferentialAction::Restrict => "RESTRICT",
        }
    }

    /// 文字列からアクションを解析
    ///
    /// SQL表記（"NO ACTION"）とシリアライズ表記（"NO_ACTION"）の両方を受け付けます。
    /// 未知の文字列の場合は None を返します。
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NO ACTION" | "NO_ACTION" => Some(ReferentialAction::NoAction),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "SET NULL" | "SET_NULL" => Some(ReferentialAction::SetNull),
            "SET DEFAULT" | "SET_DEFAULT" => Some(ReferentialAction::SetDefault),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            _ => None,
        }
    }

    /// 「何もしない」センチネル値かどうか
    pub fn is_no_action(&self) -> bool {
        matches!(self, ReferentialAction::NoAction)
    }
}

/// 属性値
///
/// スキーマオブジェクトの属性が取りうる型付きの値を表現します。
/// 片側にのみ存在する属性は Null として比較されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeValue {
    /// 値なし（属性が欠落している側の明示的な表現）
    Null,
    /// 真偽値
    Bool(bool),
    /// 整数値
    Integer(i64),
    /// テキスト値（大文字小文字を区別して比較）
    Text(String),
    /// 識別子名（設定により大文字小文字を畳み込んで比較）
    Name(String),
    /// 参照アクション（バリアント同一性で比較）
    Action(ReferentialAction),
    /// 識別子名のリスト
    NameList(Vec<String>),
}

impl AttributeValue {
    /// 値なしかどうか
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// 参照アクションとして取得
    pub fn as_action(&self) -> Option<ReferentialAction> {
        match self {
            AttributeValue::Action(action) => Some(*action),
            _ => None,
        }
    }

    /// 文字列値として取得（Text / Name のみ）
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) | AttributeValue::Name(value) => Some(value),
            _ => None,
        }
    }

    /// 名前リストとして取得
    pub fn as_name_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::NameList(values) => Some(values),
            _ => None,
        }
    }

    /// 値の型名を取得
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "NULL",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Integer(_) => "INTEGER",
            AttributeValue::Text(_) => "TEXT",
            AttributeValue::Name(_) => "NAME",
            AttributeValue::Action(_) => "ACTION",
            AttributeValue::NameList(_) => "NAME_LIST",
        }
    }
}

/// スキーマオブジェクト
///
/// 比較の片側となる単一のデータベースオブジェクトを表現します。
/// 識別子（名前と種別）と属性名から型付き値へのマップを保持します。
/// 比較中は不変のスナップショットとして扱われます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    /// オブジェクト名
    pub name: String,

    /// オブジェクト種別
    pub kind: ObjectKind,

    /// 属性名から値へのマップ
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl SchemaObject {
    /// 新しいスキーマオブジェクトを作成
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: BTreeMap::new(),
        }
    }

    /// 属性を設定
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// 属性を設定したオブジェクトを返す（ビルダー形式）
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// 指定された属性を取得
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// 指定された属性が存在するか確認
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// 属性数を取得
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// 種別と名前を結合した修飾名を取得
    pub fn qualified_name(&self) -> String {
        qualified_name(self.kind, &self.name)
    }
}

/// 種別と名前から修飾名を構築
pub(crate) fn qualified_name(kind: ObjectKind, name: &str) -> String {
    format!("{}/{}", kind.as_str(), name)
}

/// スキーマスナップショット
///
/// データベース構造の一時点の状態全体を表現します。
/// オブジェクトは修飾名（種別/名前）をキーとして保持され、
/// 反復順序は種別・名前順で決定的です。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// スナップショットの由来
    pub provenance: Provenance,

    /// 修飾名からオブジェクトへのマップ
    #[serde(default)]
    pub objects: BTreeMap<String, SchemaObject>,
}

impl SchemaSnapshot {
    /// 新しいスナップショットを作成
    pub fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            objects: BTreeMap::new(),
        }
    }

    /// オブジェクトを追加
    pub fn add_object(&mut self, object: SchemaObject) {
        self.objects.insert(object.qualified_name(), object);
    }

    /// オブジェクトを追加したスナップショットを返す（ビルダー形式）
    pub fn with_object(mut self, object: SchemaObject) -> Self {
        self.add_object(object);
        self
    }

    /// 指定されたオブジェクトを取得
    pub fn get_object(&self, kind: ObjectKind, name: &str) -> Option<&SchemaObject> {
        self.objects.get(&qualified_name(kind, name))
    }

    /// 指定されたオブジェクトが存在するか確認
    pub fn has_object(&self, kind: ObjectKind, name: &str) -> bool {
        self.objects.contains_key(&qualified_name(kind, name))
    }

    /// オブジェクト数を取得
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// 指定された種別のオブジェクトを反復
    pub fn objects_of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &SchemaObject> {
        self.objects.values().filter(move |o| o.kind == kind)
    }
}
