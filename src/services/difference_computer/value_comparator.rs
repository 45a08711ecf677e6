// 属性値比較
//
// 属性固有の等価判定を行います。

use crate::core::snapshot::AttributeValue;

/// 2つの属性値が等しいかどうかを判定
///
/// 属性固有の等価規則:
/// - 参照アクションはバリアント同一性で比較
/// - 識別子名（Name / NameList）は `fold_name_case` が有効な場合、大文字小文字を畳み込んで比較
/// - Null は Null とのみ等しい
///
/// # Errors
///
/// 両側の値の型に互換性がない場合、比較不能の説明メッセージを返します。
pub(crate) fn values_equal(
    reference: &AttributeValue,
    compared: &AttributeValue,
    fold_name_case: bool,
) -> Result<bool, String> {
    match (reference, compared) {
        (AttributeValue::Null, AttributeValue::Null) => Ok(true),
        // 片側のみ欠落している場合は差分として扱う
        (AttributeValue::Null, _) | (_, AttributeValue::Null) => Ok(false),
        (AttributeValue::Bool(a), AttributeValue::Bool(b)) => Ok(a == b),
        (AttributeValue::Integer(a), AttributeValue::Integer(b)) => Ok(a == b),
        (AttributeValue::Text(a), AttributeValue::Text(b)) => Ok(a == b),
        (AttributeValue::Name(a), AttributeValue::Name(b)) => {
            Ok(names_equal(a, b, fold_name_case))
        }
        (AttributeValue::Action(a), AttributeValue::Action(b)) => Ok(a == b),
        (AttributeValue::NameList(a), AttributeValue::NameList(b)) => Ok(a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| names_equal(x, y, fold_name_case))),
        (a, b) => Err(format!(
            "incompatible value types: {} vs {}",
            a.type_name(),
            b.type_name()
        )),
    }
}

/// 識別子名の等価判定
fn names_equal(a: &str, b: &str, fold_case: bool) -> bool {
    if fold_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}
