//! Package-manager instances.
//!
//! Each compile request names the instance whose package index resolves
//! its board.

use std::collections::HashMap;

use crate::core::{InstanceId, PackageIndex};

/// Registry of package indexes by instance id.
#[derive(Default)]
pub struct Instances {
    next_id: InstanceId,
    indexes: HashMap<InstanceId, Box<dyn PackageIndex>>,
}

impl Instances {
    pub fn new() -> Self {
        Instances::default()
    }

    /// Register an index and return its instance id. Ids start at 1.
    pub fn create(&mut self, index: impl PackageIndex + 'static) -> InstanceId {
        self.next_id += 1;
        self.indexes.insert(self.next_id, Box::new(index));
        self.next_id
    }

    /// Look up an instance.
    pub fn get(&self, id: InstanceId) -> Option<&dyn PackageIndex> {
        self.indexes.get(&id).map(|index| &**index)
    }
}

impl std::fmt::Debug for Instances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.indexes.keys().collect();
        ids.sort();
        f.debug_struct("Instances").field("ids", &ids).finish()
    }
}
