//! `updatePage` and `removePage` for paginated collections.

use serde_json::Value;
use tracing::debug;

use relgraph_core::{EdgeKind, FieldName, GraphError, GraphResult, Identifier, Links};

use crate::edges::Edge;
use crate::graph::{materialize, Graph};

impl Graph {
    pub(crate) fn update_page(
        &mut self,
        record: &Identifier,
        field: &FieldName,
        page: &str,
        value: Vec<Identifier>,
        links: Option<Links>,
        meta: Option<Value>,
    ) -> GraphResult<()> {
        const OP: &str = "updatePage";
        let resolved = self.expect_kind(OP, record, field, &[EdgeKind::Collection])?;
        self.prepare_values(&resolved.meta, &value)?;
        let inverse_key = resolved.meta.inverse_key.clone();

        let edge = materialize(&mut self.edges, &mut self.registry, record, field)?;
        self.transaction.schedule(edge);
        let Edge::Paginated(paginated) = edge else {
            return Err(GraphError::kind_mismatch(OP, resolved.meta.kind, record.resource_type().as_str(), &**field));
        };
        let change = paginated.replace_page(page, &value, links, meta);
        let is_empty = paginated.inner.remote_state().is_empty();
        paginated.inner.state.received(is_empty);
        if change.duplicates > 0 {
            debug!(
                target: "relgraph::graph",
                record = %record,
                field = %field,
                page,
                duplicates = change.duplicates,
                "dropped duplicate identifiers"
            );
        }

        for id in &change.added {
            self.add_to_inverse(id, &inverse_key, record, true)?;
        }
        for id in &change.removed {
            self.remove_from_inverse(id, &inverse_key, record, true);
        }
        Ok(())
    }

    pub(crate) fn remove_page(&mut self, record: &Identifier, field: &FieldName, page: &str) -> GraphResult<()> {
        const OP: &str = "removePage";
        let resolved = self.expect_kind(OP, record, field, &[EdgeKind::Collection])?;
        let inverse_key = resolved.meta.inverse_key.clone();

        let edge = materialize(&mut self.edges, &mut self.registry, record, field)?;
        if !matches!(edge, Edge::Paginated(p) if p.page(page).is_some()) {
            self.transaction.add(edge);
            return Ok(());
        }
        self.transaction.schedule(edge);
        let Edge::Paginated(paginated) = edge else {
            return Ok(());
        };
        let removed = paginated.remove_page(page);
        paginated.inner.state.is_empty = paginated.inner.remote_state().is_empty();

        for id in &removed {
            self.remove_from_inverse(id, &inverse_key, record, true);
        }
        Ok(())
    }
}
