//! Deferred forward-reference resolution.
//!
//! Modeled as an explicit value threaded through the parse session rather
//! than an ambient mutable pointer, per the design note on forward
//! references: a `PendingAttachments` accumulates unresolved cross-
//! statement references and is explicitly finalized once, after the whole
//! input has been parsed.

use crate::model::{PartitionBound, QualifiedName, SchemaModel};
use crate::parser::error::ModelError;

#[derive(Debug, Clone)]
pub struct DeferredPartition {
    pub child: QualifiedName,
    pub parent: QualifiedName,
    pub definition: String,
}

#[derive(Debug, Clone, Default)]
pub struct PendingAttachments {
    deferred_partitions: Vec<DeferredPartition>,
}

impl PendingAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_partition(&mut self, child: QualifiedName, parent: QualifiedName, definition: String) {
        self.deferred_partitions.push(DeferredPartition {
            child,
            parent,
            definition,
        });
    }

    /// Resolves every queued deferred partition against the now-complete
    /// model. Must run after all top-level `CREATE TABLE` statements in the
    /// same logical parse session have been dispatched.
    pub fn finalize(self, model: &mut SchemaModel) -> Vec<ModelError> {
        let mut errors = Vec::new();
        for deferred in self.deferred_partitions {
            let parent_exists = model.find_table(&deferred.parent).is_some();
            if !parent_exists {
                errors.push(ModelError::UnresolvedPartition {
                    child: deferred.child.to_string(),
                    parent: deferred.parent.to_string(),
                });
                continue;
            }
            if let Some(child) = model.find_table_mut(&deferred.child) {
                child.partition_of = Some(PartitionBound {
                    parent: deferred.parent,
                    definition: deferred.definition,
                });
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    #[test]
    fn resolves_once_parent_is_known() {
        let mut model = SchemaModel::new();
        let parent = QualifiedName::new("public", "items");
        let child = QualifiedName::new("public", "items_p0");
        model.upsert_table(Table::new(child.clone()));

        let mut pending = PendingAttachments::new();
        pending.queue_partition(child.clone(), parent.clone(), "FOR VALUES WITH (MODULUS 16, REMAINDER 0)".into());

        model.upsert_table(Table::new(parent.clone()));
        let errors = pending.finalize(&mut model);
        assert!(errors.is_empty());
        assert!(model.find_table(&child).unwrap().partition_of.is_some());
    }

    #[test]
    fn unresolved_parent_is_an_error() {
        let mut model = SchemaModel::new();
        let mut pending = PendingAttachments::new();
        pending.queue_partition(
            QualifiedName::new("public", "child"),
            QualifiedName::new("public", "ghost"),
            "FOR VALUES IN (1)".into(),
        );
        let errors = pending.finalize(&mut model);
        assert_eq!(errors.len(), 1);
    }
}
