// スナップショットI/O
//
// YAMLスナップショットファイルの読み込みと内部モデルへの変換を行います。
// DTO定義、DTO変換、パーサーの3層で構成されます。

pub mod dto;
pub mod dto_converter;
pub mod snapshot_parser;

pub use dto_converter::DtoConverterService;
pub use snapshot_parser::SnapshotParserService;
