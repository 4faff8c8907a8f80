//! Entity metadata: member to column mapping and per-member converters.
//!
//! Definitions are loaded once (TOML, JSON or in code) and compiled into a
//! frozen lookup table. Resolution for a member `M` seen through entity `T`:
//!
//! 1. the column annotation on the declaration of `M` closest to `T`;
//! 2. the column annotation on the root declaration of `M`;
//! 3. `M` itself.
//!
//! Converters are selected with the same two-step lookup.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::convert::{ConverterRegistry, ValueConverter};
use crate::error::{PredError, PredResult};

/// One member as declared on an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

impl MemberDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column: None,
            converter: None,
        }
    }

    /// Explicit storage column name.
    pub fn column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    /// Registered converter name.
    pub fn converter(mut self, converter: &str) -> Self {
        self.converter = Some(converter.to_string());
        self
    }
}

/// One entity type and the members it declares (or redeclares).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Parent entity whose members this one inherits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberDef>,
}

impl EntityDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: None,
            base: None,
            members: Vec::new(),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }
}

/// Serialized form of a schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

impl SchemaFile {
    /// Read a `.json` file, or TOML for any other extension.
    pub fn load(path: &Path) -> PredResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let parsed: Result<Self, String> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => toml::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| PredError::Schema(format!("{}: {}", path.display(), e)))
    }
}

/// Resolved storage information for one member of one entity.
#[derive(Clone)]
pub struct ColumnInfo {
    pub column: String,
    pub converter: Option<Arc<dyn ValueConverter>>,
}

impl std::fmt::Debug for ColumnInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnInfo")
            .field("column", &self.column)
            .field("converter", &self.converter.as_ref().map(|c| c.name()))
            .finish()
    }
}

/// Maps an entity member to its storage column name.
pub trait ColumnResolver: Send + Sync {
    fn resolve_column(&self, entity: &str, member: &str) -> PredResult<String>;
}

/// Finds the converter registered for an entity member, if any.
pub trait ConverterLookup: Send + Sync {
    fn converter_for(&self, entity: &str, member: &str) -> Option<&dyn ValueConverter>;
}

/// Resolves every member to its own name. No metadata, no converters.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl ColumnResolver for IdentityResolver {
    fn resolve_column(&self, _entity: &str, member: &str) -> PredResult<String> {
        Ok(member.to_string())
    }
}

impl ConverterLookup for IdentityResolver {
    fn converter_for(&self, _entity: &str, _member: &str) -> Option<&dyn ValueConverter> {
        None
    }
}

#[derive(Debug, Clone)]
struct EntityInfo {
    table: String,
    columns: HashMap<String, ColumnInfo>,
}

/// Frozen `(entity, member) -> column info` table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: HashMap<String, EntityInfo>,
}

impl Schema {
    /// Validate definitions and precompute every entity's visible members.
    pub fn build(defs: Vec<EntityDef>, converters: &ConverterRegistry) -> PredResult<Self> {
        let mut by_name: HashMap<&str, &EntityDef> = HashMap::new();
        for def in &defs {
            if by_name.insert(def.name.as_str(), def).is_some() {
                return Err(PredError::Schema(format!(
                    "entity '{}' is defined more than once",
                    def.name
                )));
            }
            let mut seen = HashSet::new();
            for member in &def.members {
                if !seen.insert(member.name.as_str()) {
                    return Err(PredError::Schema(format!(
                        "member '{}' is declared twice on entity '{}'",
                        member.name, def.name
                    )));
                }
                if let Some(conv) = &member.converter
                    && !converters.contains(conv)
                {
                    return Err(PredError::Schema(format!(
                        "unknown converter '{}' on member '{}' of entity '{}'",
                        conv, member.name, def.name
                    )));
                }
            }
        }

        let mut entities = HashMap::new();
        for def in &defs {
            let chain = inheritance_chain(def, &by_name)?;
            let mut columns = HashMap::new();

            let mut names: Vec<&str> = Vec::new();
            for ancestor in &chain {
                for member in &ancestor.members {
                    if !names.contains(&member.name.as_str()) {
                        names.push(member.name.as_str());
                    }
                }
            }

            for name in names {
                let decls: Vec<&MemberDef> = chain
                    .iter()
                    .filter_map(|e| e.members.iter().find(|m| m.name == name))
                    .collect();
                let (Some(closest), Some(root)) = (decls.first(), decls.last()) else {
                    continue;
                };

                let column = closest
                    .column
                    .clone()
                    .or_else(|| root.column.clone())
                    .unwrap_or_else(|| name.to_string());
                let converter = closest
                    .converter
                    .as_deref()
                    .or(root.converter.as_deref())
                    .and_then(|c| converters.get(c));

                columns.insert(name.to_string(), ColumnInfo { column, converter });
            }

            let table = def.table.clone().unwrap_or_else(|| def.name.clone());
            entities.insert(def.name.clone(), EntityInfo { table, columns });
        }

        tracing::debug!(entities = entities.len(), "schema built");
        Ok(Self { entities })
    }

    /// Parse `[[entities]]` tables from TOML.
    pub fn from_toml(content: &str, converters: &ConverterRegistry) -> PredResult<Self> {
        let file: SchemaFile =
            toml::from_str(content).map_err(|e| PredError::Schema(e.to_string()))?;
        Self::build(file.entities, converters)
    }

    /// Parse `{"entities": [...]}` from JSON.
    pub fn from_json(content: &str, converters: &ConverterRegistry) -> PredResult<Self> {
        let file: SchemaFile =
            serde_json::from_str(content).map_err(|e| PredError::Schema(e.to_string()))?;
        Self::build(file.entities, converters)
    }

    /// Load a `.json` or `.toml` schema file.
    pub fn load(path: &Path, converters: &ConverterRegistry) -> PredResult<Self> {
        Self::build(SchemaFile::load(path)?.entities, converters)
    }

    /// Explicit table name, or the entity name.
    pub fn table_name(&self, entity: &str) -> PredResult<&str> {
        self.entity(entity).map(|e| e.table.as_str())
    }

    pub fn column_info(&self, entity: &str, member: &str) -> PredResult<&ColumnInfo> {
        self.entity(entity)?
            .columns
            .get(member)
            .ok_or_else(|| PredError::column(entity, member))
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    /// Registered entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn entity(&self, entity: &str) -> PredResult<&EntityInfo> {
        self.entities
            .get(entity)
            .ok_or_else(|| PredError::UnknownEntity(entity.to_string()))
    }
}

impl ColumnResolver for Schema {
    fn resolve_column(&self, entity: &str, member: &str) -> PredResult<String> {
        self.column_info(entity, member).map(|c| c.column.clone())
    }
}

impl ConverterLookup for Schema {
    fn converter_for(&self, entity: &str, member: &str) -> Option<&dyn ValueConverter> {
        self.column_info(entity, member)
            .ok()
            .and_then(|c| c.converter.as_deref())
    }
}

/// `def` followed by its ancestors, closest first.
fn inheritance_chain<'d>(
    def: &'d EntityDef,
    by_name: &HashMap<&str, &'d EntityDef>,
) -> PredResult<Vec<&'d EntityDef>> {
    let mut chain = vec![def];
    let mut current = def;
    while let Some(base) = &current.base {
        let parent = by_name.get(base.as_str()).copied().ok_or_else(|| {
            PredError::Schema(format!(
                "entity '{}' extends unknown entity '{}'",
                current.name, base
            ))
        })?;
        if chain.iter().any(|e| e.name == parent.name) {
            return Err(PredError::Schema(format!(
                "inheritance cycle through entity '{}'",
                parent.name
            )));
        }
        chain.push(parent);
        current = parent;
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;

    fn hierarchy() -> Schema {
        let defs = vec![
            EntityDef::new("Base")
                .table("base_items")
                .member(MemberDef::new("Id"))
                .member(MemberDef::new("Label").column("base_label"))
                .member(MemberDef::new("Flag").column("flag_col").converter("bool_as_string"))
                .member(MemberDef::new("Plain")),
            EntityDef::new("Middle")
                .base("Base")
                .member(MemberDef::new("Label").column("middle_label")),
            EntityDef::new("Derived")
                .base("Middle")
                .member(MemberDef::new("Label").column("derived_label"))
                .member(MemberDef::new("Flag"))
                .member(MemberDef::new("Extra")),
        ];
        Schema::build(defs, &ConverterRegistry::with_builtins()).unwrap()
    }

    #[test]
    fn test_closest_annotation_wins() {
        let schema = hierarchy();
        assert_eq!(schema.resolve_column("Derived", "Label").unwrap(), "derived_label");
        assert_eq!(schema.resolve_column("Middle", "Label").unwrap(), "middle_label");
        assert_eq!(schema.resolve_column("Base", "Label").unwrap(), "base_label");
    }

    #[test]
    fn test_unannotated_override_falls_back_to_root() {
        let schema = hierarchy();
        assert_eq!(schema.resolve_column("Derived", "Flag").unwrap(), "flag_col");
        let conv = schema.converter_for("Derived", "Flag").unwrap();
        assert_eq!(conv.name(), "bool_as_string");
        assert_eq!(conv.to_db(&Value::Bool(false)).unwrap(), Value::String("false".into()));
    }

    #[test]
    fn test_plain_member_keeps_name() {
        let schema = hierarchy();
        assert_eq!(schema.resolve_column("Derived", "Plain").unwrap(), "Plain");
        assert_eq!(schema.resolve_column("Derived", "Extra").unwrap(), "Extra");
        assert!(schema.converter_for("Derived", "Plain").is_none());
    }

    #[test]
    fn test_unknown_member_and_entity() {
        let schema = hierarchy();
        assert!(matches!(
            schema.resolve_column("Base", "Extra"),
            Err(PredError::UnresolvableColumn { .. })
        ));
        assert!(matches!(
            schema.resolve_column("Nope", "Id"),
            Err(PredError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_table_name() {
        let schema = hierarchy();
        assert_eq!(schema.table_name("Base").unwrap(), "base_items");
        assert_eq!(schema.table_name("Derived").unwrap(), "Derived");
    }

    #[test]
    fn test_rejects_cycles_and_unknown_converters() {
        let reg = ConverterRegistry::with_builtins();
        let cyclic = vec![EntityDef::new("A").base("B"), EntityDef::new("B").base("A")];
        assert!(matches!(Schema::build(cyclic, &reg), Err(PredError::Schema(_))));

        let bad_conv = vec![EntityDef::new("A").member(MemberDef::new("m").converter("nope"))];
        assert!(matches!(Schema::build(bad_conv, &reg), Err(PredError::Schema(_))));

        let orphan = vec![EntityDef::new("A").base("Missing")];
        assert!(matches!(Schema::build(orphan, &reg), Err(PredError::Schema(_))));
    }

    #[test]
    fn test_from_toml() {
        let content = r#"
[[entities]]
name = "SomeEntity"
table = "some_entity"

[[entities.members]]
name = "aBool"
column = "a_bool"
converter = "bool_as_int"

[[entities.members]]
name = "anInt"
"#;
        let schema = Schema::from_toml(content, &ConverterRegistry::with_builtins()).unwrap();
        assert_eq!(schema.resolve_column("SomeEntity", "aBool").unwrap(), "a_bool");
        assert_eq!(schema.resolve_column("SomeEntity", "anInt").unwrap(), "anInt");
        assert_eq!(schema.table_name("SomeEntity").unwrap(), "some_entity");
    }

    #[test]
    fn test_from_json() {
        let content = r#"{"entities": [{"name": "E", "members": [{"name": "m", "column": "c"}]}]}"#;
        let schema = Schema::from_json(content, &ConverterRegistry::new()).unwrap();
        assert_eq!(schema.resolve_column("E", "m").unwrap(), "c");
        assert_eq!(schema.entity_names(), vec!["E"]);
    }
}
