// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::HashMap;
use std::rc::Rc;

use crate::basic::{ConvertedType, Repetition, TimeUnit, Type as PhysicalType};
use crate::errors::{ParquetError, Result};

/// A Parquet logical type annotation. Absence (`None` at the
/// call site) is distinct from `LogicalType::NONE`: absence is what
/// permits the §4.5 fallback chain to run at all.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
  STRING,
  MAP,
  LIST,
  ENUM,
  DECIMAL { precision: i32, scale: i32 },
  DATE,
  TIME { unit: TimeUnit, is_utc: bool },
  TIMESTAMP { unit: TimeUnit, is_utc: bool },
  INT { bit_width: i8, signed: bool },
  JSON,
  BSON,
  UUID,
  FLOAT16,
  UNKNOWN,
  NONE,
}

/// The raw, still-flat representation of one Thrift `SchemaElement`, in
/// pre-order. Produced by `file::footer`'s Thrift walk, consumed by
/// `build_tree` below.
#[derive(Debug, Clone)]
pub struct RawSchemaElement {
  pub physical_type: Option<PhysicalType>,
  pub type_length: Option<i32>,
  pub repetition: Option<Repetition>,
  pub name: String,
  pub num_children: Option<i32>,
  pub converted_type: Option<ConvertedType>,
  pub scale: Option<i32>,
  pub precision: Option<i32>,
  pub field_id: Option<i32>,
  pub logical_type: Option<LogicalType>,
}

/// Shared fields common to both group and primitive schema nodes.
#[derive(Debug, Clone)]
pub struct BasicTypeInfo {
  pub name: String,
  pub repetition: Option<Repetition>,
  pub converted_type: Option<ConvertedType>,
  pub logical_type: Option<LogicalType>,
  pub field_id: Option<i32>,
}

/// A reconstructed schema node: either an intermediate group (the root,
/// or a nested `LIST`/`MAP`/struct) or a primitive leaf.
#[derive(Debug, Clone)]
pub enum Type {
  GroupType {
    basic_info: BasicTypeInfo,
    fields: Vec<TypePtr>,
  },
  PrimitiveType {
    basic_info: BasicTypeInfo,
    physical_type: PhysicalType,
    type_length: Option<i32>,
    scale: Option<i32>,
    precision: Option<i32>,
  },
}

pub type TypePtr = Rc<Type>;

impl Type {
  pub fn basic_info(&self) -> &BasicTypeInfo {
    match self {
      Type::GroupType { basic_info, .. } => basic_info,
      Type::PrimitiveType { basic_info, .. } => basic_info,
    }
  }

  pub fn name(&self) -> &str {
    &self.basic_info().name
  }

  pub fn is_primitive(&self) -> bool {
    matches!(self, Type::PrimitiveType { .. })
  }
}

/// A dotted, leaf-to-root path through the schema tree, joined with
/// `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPath(pub Vec<String>);

impl ColumnPath {
  pub fn new(parts: Vec<String>) -> Self {
    ColumnPath(parts)
  }

  pub fn joined(&self) -> String {
    self.0.join(".")
  }
}

/// One flattened leaf column: physical type plus the final, fallback-
/// resolved logical type.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
  pub physical_type: PhysicalType,
  pub type_length: Option<i32>,
  pub precision: Option<i32>,
  pub scale: Option<i32>,
  pub converted_type: Option<ConvertedType>,
  pub logical_type: LogicalType,
  pub field_id: Option<i32>,
  pub path: ColumnPath,
}

/// The flattened view of a schema tree: an ordered list of leaves plus
/// a dotted-path lookup, as used to annotate `ColumnChunkMetaData` by
/// name.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
  root: TypePtr,
  leaves: Vec<ColumnDescriptor>,
  path_to_leaf: HashMap<String, usize>,
}

impl SchemaDescriptor {
  pub fn root(&self) -> &TypePtr {
    &self.root
  }

  pub fn num_columns(&self) -> usize {
    self.leaves.len()
  }

  pub fn columns(&self) -> &[ColumnDescriptor] {
    &self.leaves
  }

  pub fn column(&self, i: usize) -> &ColumnDescriptor {
    &self.leaves[i]
  }

  /// Looks up a leaf by its dotted path (e.g. `"a.b"`). Returns
  /// `SchemaMismatch` when a `ColumnChunk` names a path the schema tree
  /// does not contain.
  pub fn leaf_by_path(&self, path: &str) -> Result<&ColumnDescriptor> {
    self
      .path_to_leaf
      .get(path)
      .map(|&i| &self.leaves[i])
      .ok_or_else(|| ParquetError::SchemaMismatch(path.to_string()))
  }
}

/// Applies the §4.5 fallback chain for a leaf whose explicit
/// `logicalType` is absent or `UNKNOWN`.
fn resolve_logical_type(elem: &RawSchemaElement) -> LogicalType {
  if let Some(lt) = &elem.logical_type {
    if *lt != LogicalType::UNKNOWN {
      return lt.clone();
    }
  }
  if let Some(ct) = elem.converted_type {
    return converted_type_to_logical(ct, elem);
  }
  match elem.physical_type {
    Some(PhysicalType::BYTE_ARRAY) => LogicalType::STRING,
    Some(PhysicalType::INT96) => LogicalType::TIMESTAMP {
      unit: TimeUnit::NANOS,
      is_utc: false,
    },
    _ => LogicalType::NONE,
  }
}

/// Maps the legacy `converted_type` onto the newer `LogicalType` shape.
fn converted_type_to_logical(ct: ConvertedType, elem: &RawSchemaElement) -> LogicalType {
  use self::ConvertedType::*;
  match ct {
    UTF8 | ENUM | JSON | BSON => match ct {
      UTF8 => LogicalType::STRING,
      ENUM => LogicalType::ENUM,
      JSON => LogicalType::JSON,
      BSON => LogicalType::BSON,
      _ => unreachable!(),
    },
    MAP | MAP_KEY_VALUE => LogicalType::MAP,
    LIST => LogicalType::LIST,
    DECIMAL => LogicalType::DECIMAL {
      precision: elem.precision.unwrap_or(0),
      scale: elem.scale.unwrap_or(0),
    },
    DATE => LogicalType::DATE,
    TIME_MILLIS => LogicalType::TIME { unit: TimeUnit::MILLIS, is_utc: true },
    TIME_MICROS => LogicalType::TIME { unit: TimeUnit::MICROS, is_utc: true },
    TIMESTAMP_MILLIS => LogicalType::TIMESTAMP { unit: TimeUnit::MILLIS, is_utc: true },
    TIMESTAMP_MICROS => LogicalType::TIMESTAMP { unit: TimeUnit::MICROS, is_utc: true },
    UINT_8 => LogicalType::INT { bit_width: 8, signed: false },
    UINT_16 => LogicalType::INT { bit_width: 16, signed: false },
    UINT_32 => LogicalType::INT { bit_width: 32, signed: false },
    UINT_64 => LogicalType::INT { bit_width: 64, signed: false },
    INT_8 => LogicalType::INT { bit_width: 8, signed: true },
    INT_16 => LogicalType::INT { bit_width: 16, signed: true },
    INT_32 => LogicalType::INT { bit_width: 32, signed: true },
    INT_64 => LogicalType::INT { bit_width: 64, signed: true },
    INTERVAL => LogicalType::UNKNOWN,
  }
}

/// Reassembles the flat, pre-order `elements` list into a rooted `Type`
/// tree plus a `SchemaDescriptor`, using a child-count stack rather than
/// pointers. `elements[0]`
/// is the root and is not itself a user column.
pub fn build_tree(elements: &[RawSchemaElement]) -> Result<(TypePtr, SchemaDescriptor)> {
  if elements.is_empty() {
    return Err(ParquetError::MissingRequiredField("schema"));
  }

  let mut leaves = Vec::new();
  let mut path_to_leaf = HashMap::new();
  let mut idx = 0usize;

  // `build_node` consumes `elements[idx..]` pre-order and returns the
  // constructed node, advancing `idx` past everything it consumed.
  // `ancestors` already excludes the schema root (§4.5: dotted paths are
  // built from ancestor names "excluding root"), so the root's own name
  // must never be pushed onto its children's path — only non-root
  // group names are.
  fn build_node(
    elements: &[RawSchemaElement],
    idx: &mut usize,
    ancestors: &[String],
    is_root: bool,
    leaves: &mut Vec<ColumnDescriptor>,
    path_to_leaf: &mut HashMap<String, usize>,
  ) -> Result<TypePtr> {
    if *idx >= elements.len() {
      return Err(ParquetError::MalformedEncoding(
        *idx,
        "schema element list truncated relative to declared num_children".to_string(),
      ));
    }
    let elem = &elements[*idx];
    *idx += 1;

    let basic_info = BasicTypeInfo {
      name: elem.name.clone(),
      repetition: elem.repetition,
      converted_type: elem.converted_type,
      logical_type: elem.logical_type.clone(),
      field_id: elem.field_id,
    };

    let num_children = elem.num_children.unwrap_or(0);
    if num_children > 0 || elem.physical_type.is_none() {
      let mut fields = Vec::with_capacity(num_children as usize);
      for _ in 0..num_children {
        let child_path = if is_root {
          ancestors.to_vec()
        } else {
          let mut child_path = ancestors.to_vec();
          child_path.push(elem.name.clone());
          child_path
        };
        fields.push(build_node(elements, idx, &child_path, false, leaves, path_to_leaf)?);
      }
      Ok(Rc::new(Type::GroupType { basic_info, fields }))
    } else {
      let physical_type = elem
        .physical_type
        .ok_or(ParquetError::MissingRequiredField("type"))?;
      let logical_type = resolve_logical_type(elem);
      let mut path = ancestors.to_vec();
      path.push(elem.name.clone());
      let joined = path.join(".");
      let descriptor = ColumnDescriptor {
        physical_type,
        type_length: elem.type_length,
        precision: elem.precision,
        scale: elem.scale,
        converted_type: elem.converted_type,
        logical_type,
        field_id: elem.field_id,
        path: ColumnPath::new(path),
      };
      path_to_leaf.insert(joined, leaves.len());
      leaves.push(descriptor);
      Ok(Rc::new(Type::PrimitiveType {
        basic_info,
        physical_type,
        type_length: elem.type_length,
        scale: elem.scale,
        precision: elem.precision,
      }))
    }
  }

  let root = build_node(elements, &mut idx, &[], true, &mut leaves, &mut path_to_leaf)?;
  if idx != elements.len() {
    log::debug!(
      "schema element list has {} trailing elements beyond the reconstructed tree",
      elements.len() - idx
    );
  }

  let descr = SchemaDescriptor {
    root: root.clone(),
    leaves,
    path_to_leaf,
  };
  Ok((root, descr))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::basic::Type as PhysicalType;

  fn elem(name: &str, num_children: Option<i32>, physical: Option<PhysicalType>) -> RawSchemaElement {
    RawSchemaElement {
      physical_type: physical,
      type_length: None,
      repetition: Some(Repetition::OPTIONAL),
      name: name.to_string(),
      num_children,
      converted_type: None,
      scale: None,
      precision: None,
      field_id: None,
      logical_type: None,
    }
  }

  #[test]
  fn minimal_single_column() {
    let elements = vec![
      elem("schema", Some(1), None),
      elem("x", Some(0), Some(PhysicalType::INT32)),
    ];
    let (_, descr) = build_tree(&elements).unwrap();
    assert_eq!(descr.num_columns(), 1);
    let col = descr.leaf_by_path("x").unwrap();
    assert_eq!(col.physical_type, PhysicalType::INT32);
    assert_eq!(col.logical_type, LogicalType::NONE);
  }

  #[test]
  fn dotted_path_for_nested_group() {
    let elements = vec![
      elem("schema", Some(1), None),
      elem("a", Some(1), None),
      elem("b", Some(0), Some(PhysicalType::INT64)),
    ];
    let (_, descr) = build_tree(&elements).unwrap();
    assert!(descr.leaf_by_path("a.b").is_ok());
  }

  #[test]
  fn byte_array_falls_back_to_string() {
    let elements = vec![
      elem("schema", Some(1), None),
      elem("s", Some(0), Some(PhysicalType::BYTE_ARRAY)),
    ];
    let (_, descr) = build_tree(&elements).unwrap();
    assert_eq!(descr.leaf_by_path("s").unwrap().logical_type, LogicalType::STRING);
  }

  #[test]
  fn int96_falls_back_to_timestamp_nanos() {
    let elements = vec![
      elem("schema", Some(1), None),
      elem("t", Some(0), Some(PhysicalType::INT96)),
    ];
    let (_, descr) = build_tree(&elements).unwrap();
    match &descr.leaf_by_path("t").unwrap().logical_type {
      LogicalType::TIMESTAMP { unit: TimeUnit::NANOS, is_utc: false } => {}
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn legacy_converted_type_maps_to_string() {
    let mut e = elem("s", Some(0), Some(PhysicalType::BYTE_ARRAY));
    e.converted_type = Some(ConvertedType::UTF8);
    let elements = vec![elem("schema", Some(1), None), e];
    let (_, descr) = build_tree(&elements).unwrap();
    assert_eq!(descr.leaf_by_path("s").unwrap().logical_type, LogicalType::STRING);
  }

  #[test]
  fn new_logical_type_wins_over_converted_type() {
    let mut e = elem("s", Some(0), Some(PhysicalType::BYTE_ARRAY));
    e.converted_type = Some(ConvertedType::UTF8);
    e.logical_type = Some(LogicalType::UUID);
    let elements = vec![elem("schema", Some(1), None), e];
    let (_, descr) = build_tree(&elements).unwrap();
    assert_eq!(descr.leaf_by_path("s").unwrap().logical_type, LogicalType::UUID);
  }

  #[test]
  fn mismatched_path_is_schema_mismatch() {
    let elements = vec![
      elem("schema", Some(1), None),
      elem("x", Some(0), Some(PhysicalType::INT32)),
    ];
    let (_, descr) = build_tree(&elements).unwrap();
    match descr.leaf_by_path("nope") {
      Err(ParquetError::SchemaMismatch(p)) => assert_eq!(p, "nope"),
      other => panic!("expected SchemaMismatch, got {:?}", other),
    }
  }
}
