//! Recursive entity decomposition
//!
//! One [`EntityWriter`] owns one table. It holds a child writer per nested
//! field of its schema, so the writer tree mirrors the [`EntitySchema`] tree
//! and a single call to [`EntityWriter::write`] decomposes a whole record.
//!
//! Rows are staged per record and only reach the sinks once every level of
//! the record decomposed without error. Descendant rows are committed before
//! the row of their parent.

use super::columns::ColumnSet;
use crate::adapters::storage::{SinkFactory, TableSink};
use crate::core::state::RunState;
use crate::core::transform::catalog::{entity_schema, root_table, CatalogOptions};
use crate::core::transform::flatten::flatten_object;
use crate::core::transform::schema::{EntitySchema, ID_FIELD, ROW_NR_COLUMN};
use crate::domain::ids::{Endpoint, TableName};
use crate::domain::{Linkage, RecordError, Result, Row, StrataError, TableDescriptor};
use serde_json::{Map, Value};

/// Column holding the run's extraction timestamp
pub const EXTRACTION_TIME_COLUMN: &str = "extraction_time";

/// Shared inputs for building a writer tree
#[derive(Clone, Copy)]
pub struct WriterContext<'a> {
    /// Opens one sink per table
    pub sinks: &'a dyn SinkFactory,

    /// Previous run state, seeds column order
    pub state: &'a RunState,

    /// Timestamp written to every row of the run
    pub extraction_time: &'a str,
}

struct ChildWriter {
    field: String,
    writer: EntityWriter,
}

/// Writer for one table and, through its children, every descendant table
pub struct EntityWriter {
    table: TableName,
    schema: EntitySchema,
    primary_key: Vec<String>,
    columns: ColumnSet,
    sink: Box<dyn TableSink>,
    children: Vec<ChildWriter>,
    pending: Vec<Row>,
    extraction_time: String,
}

impl EntityWriter {
    /// Writer tree for the records of `endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be opened.
    pub fn for_endpoint(
        endpoint: Endpoint,
        options: CatalogOptions,
        ctx: &WriterContext<'_>,
    ) -> Result<Self> {
        let schema = entity_schema(endpoint, options);
        Self::new(root_table(endpoint), &schema, Vec::new(), ctx)
    }

    /// Writer tree for `table` decomposed by `schema`
    ///
    /// `inherited` lists the linkage columns rows of this table receive from
    /// their ancestors, outermost first.
    ///
    /// # Errors
    ///
    /// Returns an error if a sink cannot be opened.
    pub fn new(
        table: TableName,
        schema: &EntitySchema,
        inherited: Vec<String>,
        ctx: &WriterContext<'_>,
    ) -> Result<Self> {
        let mut primary_key = vec![schema.own_key_column().to_string()];
        primary_key.extend(inherited.iter().cloned());

        let columns = match ctx.state.columns(table.as_str()) {
            Some(previous) => ColumnSet::seeded(previous.iter().cloned()),
            None => ColumnSet::new(),
        };

        let mut child_inherited = inherited;
        child_inherited.push(schema.link_column());

        let mut children = Vec::with_capacity(schema.children().len());
        for nested in schema.children() {
            let writer = EntityWriter::new(
                table.child(&nested.field),
                &nested.schema,
                child_inherited.clone(),
                ctx,
            )?;
            children.push(ChildWriter {
                field: nested.field.clone(),
                writer,
            });
        }

        let sink = ctx.sinks.open(&table)?;

        Ok(Self {
            table,
            schema: schema.clone(),
            primary_key,
            columns,
            sink,
            children,
            pending: Vec::new(),
            extraction_time: ctx.extraction_time.to_string(),
        })
    }

    /// Table written by this node
    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Primary-key columns of this node's table
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Decompose one record into this table and every descendant table
    ///
    /// Nothing is written when an error is returned.
    ///
    /// # Errors
    ///
    /// - [`StrataError::Record`] if the record is malformed; the caller may
    ///   skip it and continue
    /// - [`StrataError::Linkage`] if a nested element carries a conflicting
    ///   value for an inherited key column
    /// - [`StrataError::Storage`] if a sink fails
    pub fn write(&mut self, record: Value, linkage: &Linkage) -> Result<()> {
        if let Err(e) = self.stage(record, linkage, 0) {
            self.discard();
            return Err(e);
        }
        self.commit()
    }

    /// Finish every sink of the tree
    ///
    /// # Returns
    ///
    /// One descriptor per table that received rows or carries columns from
    /// the previous run, parents before children.
    pub fn close(mut self) -> Result<Vec<TableDescriptor>> {
        self.sink.finish(self.columns.names())?;

        let mut descriptors = Vec::new();
        if self.sink.rows_written() > 0 || !self.columns.is_empty() {
            descriptors.push(TableDescriptor {
                name: self.table.clone(),
                primary_key: self.primary_key.clone(),
                columns: self.columns.names().to_vec(),
                rows_written: self.sink.rows_written(),
            });
        } else {
            tracing::debug!(table = %self.table, "Table received no rows");
        }

        for child in self.children {
            descriptors.extend(child.writer.close()?);
        }
        Ok(descriptors)
    }

    fn stage(&mut self, record: Value, linkage: &Linkage, position: usize) -> Result<()> {
        let mut object = match record {
            Value::Object(object) => object,
            _ => {
                return Err(RecordError::NotAnObject {
                    table: self.table.to_string(),
                }
                .into())
            }
        };
        object.retain(|field, _| !self.schema.is_excluded(field));

        let own_key = if self.schema.has_natural_id() {
            identifier(&object, &self.table)?
        } else {
            position.to_string()
        };
        let child_linkage = linkage.with(self.schema.link_column(), own_key.clone());

        for child in &mut self.children {
            match object.shift_remove(&child.field) {
                None | Some(Value::Null) => {}
                Some(Value::Array(elements)) => {
                    for (index, element) in elements.into_iter().enumerate() {
                        child.writer.stage(element, &child_linkage, index)?;
                    }
                }
                Some(_) => {
                    return Err(RecordError::NestedNotArray {
                        table: self.table.to_string(),
                        field: child.field.clone(),
                    }
                    .into())
                }
            }
        }

        let mut row = Row::new();
        flatten_object(&object, &mut row);
        if !self.schema.has_natural_id() {
            row.insert(ROW_NR_COLUMN, own_key);
        }
        for (column, value) in linkage.keys() {
            if let Some(existing) = row.get(column) {
                if existing != value.as_str() {
                    return Err(StrataError::Linkage(format!(
                        "{}: field '{}' is '{}' but the parent key is '{}'",
                        self.table, column, existing, value
                    )));
                }
            }
            row.insert(column.as_str(), value.as_str());
        }
        row.insert(EXTRACTION_TIME_COLUMN, self.extraction_time.as_str());

        self.pending.push(row);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for child in &mut self.children {
            child.writer.commit()?;
        }

        let rows = std::mem::take(&mut self.pending);
        for row in &rows {
            self.columns.observe(row);
            let values = self.columns.project(row);
            self.sink.append(&values)?;
        }
        Ok(())
    }

    fn discard(&mut self) {
        self.pending.clear();
        for child in &mut self.children {
            child.writer.discard();
        }
    }
}

/// Identifier of a raw record, for log messages
pub fn record_id(record: &Value) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn identifier(object: &Map<String, Value>, table: &TableName) -> Result<String> {
    let missing = || RecordError::MissingIdentifier {
        table: table.to_string(),
        field: ID_FIELD.to_string(),
    };

    match object.get(ID_FIELD) {
        None | Some(Value::Null) => Err(missing().into()),
        Some(Value::String(s)) if s.trim().is_empty() => Err(missing().into()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(RecordError::InvalidIdentifier {
            table: table.to_string(),
            field: ID_FIELD.to_string(),
        }
        .into()),
    }
}
