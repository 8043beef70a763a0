//! Declarative decomposition schemas
//!
//! An [`EntitySchema`] describes how one kind of entity is split into tables:
//! whether it has a natural `id`, which fields are dropped, and which array
//! fields become child tables (each with its own schema, to any depth).
//!
//! Keys follow from the schema alone:
//!
//! | Entity | Own key | Column a child inherits |
//! |---|---|---|
//! | natural id | `id` | `{link}_id` |
//! | no natural id | `row_nr` (array index) | `{link}_row_nr` |
//!
//! A table's primary key is its own key followed by every inherited column.

/// Column holding the array index of entities without a natural id
pub const ROW_NR_COLUMN: &str = "row_nr";

/// Natural identifier field
pub const ID_FIELD: &str = "id";

/// Fields dropped from every entity at every depth
pub const ALWAYS_EXCLUDED: &[&str] = &["_links"];

/// How one entity type is decomposed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    link: String,
    has_natural_id: bool,
    excluded_fields: Vec<String>,
    children: Vec<NestedField>,
}

/// An array field decomposed into a child table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedField {
    /// Field name in the parent record, also the child table suffix
    pub field: String,

    /// Schema of the array elements
    pub schema: EntitySchema,
}

impl EntitySchema {
    /// Schema for an entity identified by its `id` field
    ///
    /// `link` is the singular name used for inherited key columns, e.g.
    /// `"line_item"` gives children a `line_item_id` column.
    pub fn identified(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            has_natural_id: true,
            excluded_fields: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Schema for an entity keyed by its position in the parent array
    pub fn ordinal(link: impl Into<String>) -> Self {
        Self {
            has_natural_id: false,
            ..Self::identified(link)
        }
    }

    /// Drop `fields` before decomposition
    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Decompose the array in `field` into a child table
    pub fn child(mut self, field: impl Into<String>, schema: EntitySchema) -> Self {
        self.children.push(NestedField {
            field: field.into(),
            schema,
        });
        self
    }

    /// Remove every child decomposing `field`, at any depth
    ///
    /// The field then stays on the parent row as JSON text.
    pub fn without_child(mut self, field: &str) -> Self {
        self.children.retain(|c| c.field != field);
        self.children = self
            .children
            .into_iter()
            .map(|c| NestedField {
                field: c.field,
                schema: c.schema.without_child(field),
            })
            .collect();
        self
    }

    /// Singular name of the entity
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Whether the entity is identified by its `id` field
    pub fn has_natural_id(&self) -> bool {
        self.has_natural_id
    }

    /// Entity-specific excluded fields
    pub fn excluded_fields(&self) -> &[String] {
        &self.excluded_fields
    }

    /// Child tables
    pub fn children(&self) -> &[NestedField] {
        &self.children
    }

    /// The entity's own key column
    pub fn own_key_column(&self) -> &'static str {
        if self.has_natural_id {
            ID_FIELD
        } else {
            ROW_NR_COLUMN
        }
    }

    /// Column children use to reference this entity
    pub fn link_column(&self) -> String {
        if self.has_natural_id {
            format!("{}_id", self.link)
        } else {
            format!("{}_{}", self.link, ROW_NR_COLUMN)
        }
    }

    /// Whether `field` must be dropped from this entity
    pub fn is_excluded(&self, field: &str) -> bool {
        ALWAYS_EXCLUDED.contains(&field) || self.excluded_fields.iter().any(|f| f == field)
    }

    /// Number of tables this schema produces, itself included
    pub fn table_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.schema.table_count())
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_columns() {
        let item = EntitySchema::identified("line_item");
        assert_eq!(item.own_key_column(), "id");
        assert_eq!(item.link_column(), "line_item_id");

        let tax = EntitySchema::ordinal("tax");
        assert_eq!(tax.own_key_column(), "row_nr");
        assert_eq!(tax.link_column(), "tax_row_nr");
    }

    #[test]
    fn test_exclusions() {
        let schema = EntitySchema::identified("order").exclude(["customer_user_agent"]);
        assert!(schema.is_excluded("_links"));
        assert!(schema.is_excluded("customer_user_agent"));
        assert!(!schema.is_excluded("status"));
    }

    #[test]
    fn test_without_child_prunes_every_level() {
        let schema = EntitySchema::identified("order")
            .child(
                "line_items",
                EntitySchema::identified("line_item")
                    .child("taxes", EntitySchema::ordinal("tax"))
                    .child("meta_data", EntitySchema::ordinal("meta_data")),
            )
            .child("meta_data", EntitySchema::ordinal("meta_data"));
        assert_eq!(schema.table_count(), 5);

        let pruned = schema.without_child("meta_data");
        assert_eq!(pruned.table_count(), 3);
        assert_eq!(pruned.children().len(), 1);
        assert_eq!(pruned.children()[0].schema.children()[0].field, "taxes");
    }
}
