// エンジン設定
//
// 比較実行の挙動を調整する設定を提供します。
// 設定はYAML/JSONから読み込み可能です。

use serde::{Deserialize, Serialize};

/// エンジン設定
///
/// 差分計算と変更生成の挙動を調整します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 識別子名属性（Name / NameList）を大文字小文字を畳み込んで比較するか（デフォルト: true）
    #[serde(default = "default_true")]
    pub fold_name_case: bool,

    /// 参照側にのみ存在するオブジェクトに対して追加レコードを生成するか（デフォルト: true）
    #[serde(default = "default_true")]
    pub emit_added_objects: bool,

    /// 比較側にのみ存在するオブジェクトに対して削除レコードを生成するか（デフォルト: true）
    #[serde(default = "default_true")]
    pub emit_removed_objects: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fold_name_case: true,
            emit_added_objects: true,
            emit_removed_objects: true,
        }
    }
}
