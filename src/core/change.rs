// 変更レコードドメインモデル
//
// 2つのスナップショットを一致させるための構造的変更指示を表現します。
// ポリシーフェーズの出力として生成され、生成後は不変です。

use serde::{Deserialize, Serialize};

use crate::core::snapshot::{AttributeValue, ObjectKind, ReferentialAction, SchemaObject};

/// 変更レコード
///
/// 単一の構造的変更を表現します。同一オブジェクトペアから生成された
/// レコード間の順序は保持されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change")]
pub enum ChangeRecord {
    /// オブジェクトの追加（参照側にのみ存在）
    AddObject {
        /// 追加するオブジェクトの定義
        object: SchemaObject,
    },

    /// オブジェクトの削除（比較側にのみ存在）
    DropObject {
        /// オブジェクト種別
        kind: ObjectKind,
        /// オブジェクト名
        name: String,
    },

    /// 単一属性の変更
    AlterAttribute {
        /// オブジェクト種別
        kind: ObjectKind,
        /// オブジェクト名
        name: String,
        /// 属性名
        attribute: String,
        /// 変更前の値（比較側）
        from: AttributeValue,
        /// 変更後の値（参照側）
        to: AttributeValue,
    },

    /// 外部キー制約の削除
    DropForeignKey {
        /// 制約名
        constraint_name: String,
        /// 制約が属するテーブル名
        table: String,
    },

    /// 外部キー制約の追加
    ///
    /// 削除・再作成ペアの再作成側。on_delete / on_update は
    /// ポリシーによりインプレースで書き換えられる場合があります。
    AddForeignKey {
        /// 制約名
        constraint_name: String,
        /// 制約が属するテーブル名
        table: String,
        /// 制約対象のカラム名
        columns: Vec<String>,
        /// 参照先テーブル名
        referenced_table: String,
        /// 参照先カラム名
        referenced_columns: Vec<String>,
        /// 参照先レコード削除時のアクション（None = 明示的な指定なし）
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_delete: Option<ReferentialAction>,
        /// 参照先レコード更新時のアクション（None = 明示的な指定なし）
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_update: Option<ReferentialAction>,
    },
}

impl ChangeRecord {
    /// 変更の種類を文字列で取得
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeRecord::AddObject { .. } => "ADD_OBJECT",
            ChangeRecord::DropObject { .. } => "DROP_OBJECT",
            ChangeRecord::AlterAttribute { .. } => "ALTER_ATTRIBUTE",
            ChangeRecord::DropForeignKey { .. } => "DROP_FOREIGN_KEY",
            ChangeRecord::AddForeignKey { .. } => "ADD_FOREIGN_KEY",
        }
    }

    /// 外部キー追加レコードかどうか
    pub fn is_add_foreign_key(&self) -> bool {
        matches!(self, ChangeRecord::AddForeignKey { .. })
    }

    /// 外部キー削除レコードかどうか
    pub fn is_drop_foreign_key(&self) -> bool {
        matches!(self, ChangeRecord::DropForeignKey { .. })
    }
}
