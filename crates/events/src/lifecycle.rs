use serde_json::json;

use crate::record::EventRecord;

/// Stages of the entity change lifecycle.
///
/// `-ing` stages are dispatched immediately, before the store write. `-ed`
/// stages are completion events, registered for delivery after the ambient
/// unit of work completes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleStage {
    Creating,
    Created,
    Updating,
    Updated,
    Deleting,
    Deleted,
}

impl LifecycleStage {
    /// Stable event kind for this stage.
    pub fn kind(self) -> &'static str {
        match self {
            LifecycleStage::Creating => "entity.creating",
            LifecycleStage::Created => "entity.created",
            LifecycleStage::Updating => "entity.updating",
            LifecycleStage::Updated => "entity.updated",
            LifecycleStage::Deleting => "entity.deleting",
            LifecycleStage::Deleted => "entity.deleted",
        }
    }

    /// True for completion stages.
    pub fn is_completion(self) -> bool {
        matches!(
            self,
            LifecycleStage::Created | LifecycleStage::Updated | LifecycleStage::Deleted
        )
    }
}

/// Build the record announcing a lifecycle stage for one entity instance.
pub fn lifecycle_record(
    stage: LifecycleStage,
    entity: &'static str,
    id: &dyn core::fmt::Debug,
) -> EventRecord {
    EventRecord::new(
        stage.kind(),
        json!({ "entity": entity, "id": format!("{id:?}") }),
    )
}
