// DTO変換サービス
//
// スナップショットDTOを内部モデルへ変換します。
// 既知のルール属性・名前属性には型付けを適用します。

use anyhow::{anyhow, Result};

use crate::core::snapshot::{
    attrs, AttributeValue, ObjectKind, Provenance, ReferentialAction, SchemaObject, SchemaSnapshot,
};
use crate::services::snapshot_io::dto::{AttributeDto, ObjectDto, SnapshotDto};

/// ルール属性として型付けする属性名
const RULE_ATTRIBUTES: &[&str] = &[attrs::DELETE_RULE, attrs::UPDATE_RULE];

/// 識別子名として型付けする属性名
const NAME_ATTRIBUTES: &[&str] = &[attrs::TABLE, attrs::REFERENCED_TABLE];

/// DTO変換サービス
///
/// YAML由来のDTOを型付きの内部モデルへ変換します。
#[derive(Debug, Clone, Default)]
pub struct DtoConverterService {}

impl DtoConverterService {
    /// 新しいDtoConverterServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スナップショットDTOを内部モデルに変換
    ///
    /// # Errors
    ///
    /// - 由来が "authoritative" / "inferred" のいずれでもない場合
    /// - オブジェクト種別が未知の場合
    pub fn dto_to_snapshot(&self, dto: &SnapshotDto) -> Result<SchemaSnapshot> {
        let provenance = match dto.provenance.as_str() {
            "authoritative" => Provenance::Authoritative,
            "inferred" => Provenance::Inferred,
            other => {
                return Err(anyhow!(
                    "Unknown provenance '{}' (expected 'authoritative' or 'inferred')",
                    other
                ))
            }
        };

        let mut snapshot = SchemaSnapshot::new(provenance);
        for object_dto in &dto.objects {
            snapshot.add_object(self.dto_to_object(object_dto)?);
        }

        Ok(snapshot)
    }

    /// オブジェクトDTOを内部モデルに変換
    fn dto_to_object(&self, dto: &ObjectDto) -> Result<SchemaObject> {
        let kind = ObjectKind::parse(&dto.kind).ok_or_else(|| {
            anyhow!(
                "Unknown object kind '{}' for object '{}'",
                dto.kind,
                dto.name
            )
        })?;

        let mut object = SchemaObject::new(dto.name.clone(), kind);
        for (attribute, value) in &dto.attributes {
            object.set_attribute(attribute.clone(), self.convert_attribute(attribute, value));
        }

        Ok(object)
    }

    /// 属性値DTOを型付きの属性値に変換
    ///
    /// ルール属性の文字列は参照アクションとして解析を試み、解析できない
    /// 文字列はそのままテキストとして保持します（未知のルール値を
    /// センチネルと誤認して抑制しないための保守的な扱い）。
    fn convert_attribute(&self, attribute: &str, value: &AttributeDto) -> AttributeValue {
        match value {
            AttributeDto::Null => AttributeValue::Null,
            AttributeDto::Bool(b) => AttributeValue::Bool(*b),
            AttributeDto::Integer(i) => AttributeValue::Integer(*i),
            AttributeDto::Text(text) => {
                if RULE_ATTRIBUTES.contains(&attribute) {
                    match ReferentialAction::parse(text) {
                        Some(action) => AttributeValue::Action(action),
                        None => AttributeValue::Text(text.clone()),
                    }
                } else if NAME_ATTRIBUTES.contains(&attribute) {
                    AttributeValue::Name(text.clone())
                } else {
                    AttributeValue::Text(text.clone())
                }
            }
            AttributeDto::List(values) => AttributeValue::NameList(values.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn object_dto(attributes: Vec<(&str, AttributeDto)>) -> ObjectDto {
        ObjectDto {
            name: "fk_orders_user".to_string(),
            kind: "FOREIGN_KEY".to_string(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn snapshot_dto(provenance: &str, objects: Vec<ObjectDto>) -> SnapshotDto {
        SnapshotDto {
            provenance: provenance.to_string(),
            objects,
        }
    }

    #[test]
    fn test_convert_provenance() {
        let converter = DtoConverterService::new();

        let authoritative = converter
            .dto_to_snapshot(&snapshot_dto("authoritative", vec![]))
            .unwrap();
        assert_eq!(authoritative.provenance, Provenance::Authoritative);

        let inferred = converter
            .dto_to_snapshot(&snapshot_dto("inferred", vec![]))
            .unwrap();
        assert_eq!(inferred.provenance, Provenance::Inferred);
    }

    #[test]
    fn test_unknown_provenance_fails() {
        let converter = DtoConverterService::new();
        let result = converter.dto_to_snapshot(&snapshot_dto("estimated", vec![]));

        let message = result.unwrap_err().to_string();
        assert!(message.contains("Unknown provenance"));
        assert!(message.contains("estimated"));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let converter = DtoConverterService::new();
        let mut dto = object_dto(vec![]);
        dto.kind = "SEQUENCE".to_string();

        let result = converter.dto_to_snapshot(&snapshot_dto("authoritative", vec![dto]));

        let message = result.unwrap_err().to_string();
        assert!(message.contains("Unknown object kind"));
        assert!(message.contains("SEQUENCE"));
    }

    #[test]
    fn test_rule_attribute_typed_as_action() {
        let converter = DtoConverterService::new();
        let dto = object_dto(vec![(
            attrs::DELETE_RULE,
            AttributeDto::Text("CASCADE".to_string()),
        )]);

        let snapshot = converter
            .dto_to_snapshot(&snapshot_dto("inferred", vec![dto]))
            .unwrap();
        let object = snapshot
            .get_object(ObjectKind::ForeignKey, "fk_orders_user")
            .unwrap();

        assert_eq!(
            object.get_attribute(attrs::DELETE_RULE).and_then(|v| v.as_action()),
            Some(ReferentialAction::Cascade)
        );
    }

    #[test]
    fn test_unparsable_rule_kept_as_text() {
        let converter = DtoConverterService::new();
        let dto = object_dto(vec![(
            attrs::DELETE_RULE,
            AttributeDto::Text("CASCADE ON PURGE".to_string()),
        )]);

        let snapshot = converter
            .dto_to_snapshot(&snapshot_dto("authoritative", vec![dto]))
            .unwrap();
        let object = snapshot
            .get_object(ObjectKind::ForeignKey, "fk_orders_user")
            .unwrap();

        assert_eq!(
            object.get_attribute(attrs::DELETE_RULE),
            Some(&AttributeValue::Text("CASCADE ON PURGE".to_string()))
        );
    }

    #[test]
    fn test_name_attribute_typed_as_name() {
        let converter = DtoConverterService::new();
        let dto = object_dto(vec![
            (attrs::TABLE, AttributeDto::Text("orders".to_string())),
            ("comment", AttributeDto::Text("orders fk".to_string())),
        ]);

        let snapshot = converter
            .dto_to_snapshot(&snapshot_dto("authoritative", vec![dto]))
            .unwrap();
        let object = snapshot
            .get_object(ObjectKind::ForeignKey, "fk_orders_user")
            .unwrap();

        assert_eq!(
            object.get_attribute(attrs::TABLE),
            Some(&AttributeValue::Name("orders".to_string()))
        );
        // 既知の名前属性以外はテキストのまま
        assert_eq!(
            object.get_attribute("comment"),
            Some(&AttributeValue::Text("orders fk".to_string()))
        );
    }

    #[test]
    fn test_scalar_and_list_attributes() {
        let converter = DtoConverterService::new();
        let dto = ObjectDto {
            name: "idx_users_email".to_string(),
            kind: "INDEX".to_string(),
            attributes: BTreeMap::from([
                ("unique".to_string(), AttributeDto::Bool(true)),
                ("page_count".to_string(), AttributeDto::Integer(12)),
                (
                    "columns".to_string(),
                    AttributeDto::List(vec!["email".to_string()]),
                ),
                ("filter".to_string(), AttributeDto::Null),
            ]),
        };

        let snapshot = converter
            .dto_to_snapshot(&snapshot_dto("authoritative", vec![dto]))
            .unwrap();
        let object = snapshot
            .get_object(ObjectKind::Index, "idx_users_email")
            .unwrap();

        assert_eq!(object.get_attribute("unique"), Some(&AttributeValue::Bool(true)));
        assert_eq!(
            object.get_attribute("page_count"),
            Some(&AttributeValue::Integer(12))
        );
        assert_eq!(
            object.get_attribute("columns"),
            Some(&AttributeValue::NameList(vec!["email".to_string()]))
        );
        assert_eq!(object.get_attribute("filter"), Some(&AttributeValue::Null));
    }
}
