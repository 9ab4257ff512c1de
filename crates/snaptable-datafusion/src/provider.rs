use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use async_trait::async_trait;
use datafusion::catalog::Session;
use datafusion::catalog::TableProvider;
use datafusion::error::{DataFusionError, Result as DFResult};
use datafusion::logical_expr::Expr;
use datafusion::physical_plan::ExecutionPlan;

use snaptable_core::schema::Schema;

use crate::reflect::arrow_schema;

/// DataFusion table provider exposing a snaptable schema to the engine.
///
/// The provider is the type-reflection boundary only: it publishes column
/// names and types (base or augmented, so the virtual snapshot-id column can
/// participate in projection). Record streams come from the table's
/// data-file readers, which attach their own execution plans.
#[derive(Debug)]
pub struct SnapTableProvider {
    schema: SchemaRef,
}

impl SnapTableProvider {
    /// Build a provider from a snaptable schema.
    pub fn new(schema: &Schema) -> Self {
        Self {
            schema: arrow_schema(schema),
        }
    }

    /// Build a provider over an already-translated Arrow schema.
    pub fn from_arrow(schema: SchemaRef) -> Self {
        Self { schema }
    }
}

#[async_trait]
impl TableProvider for SnapTableProvider {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn table_type(&self) -> datafusion::datasource::TableType {
        datafusion::datasource::TableType::Base
    }

    async fn scan(
        &self,
        _state: &dyn Session,
        _projection: Option<&Vec<usize>>,
        _filters: &[Expr],
        _limit: Option<usize>,
    ) -> DFResult<Arc<dyn ExecutionPlan>> {
        Err(DataFusionError::NotImplemented(
            "SnapTableProvider exposes schema only; scans are planned by the data-file reader integration".to_string(),
        ))
    }
}
