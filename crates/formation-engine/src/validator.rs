//! Range and capacity checks for requested formations.

use formation_core::{Capacity, ProcessFormation};

use crate::error::ValidationError;

/// Check a requested formation against the cluster's per-node capacity.
///
/// Rules apply in order and the first violation is returned. A count of
/// `-1` is accepted and left for downstream interpretation.
pub fn validate(pf: &ProcessFormation, capacity: &Capacity) -> Result<(), ValidationError> {
    if pf.count < -1 {
        return Err(ValidationError::CountTooLow { count: pf.count });
    }

    if pf.cpu > capacity.instance_cpu {
        return Err(ValidationError::CpuExceedsInstance {
            cpu: pf.cpu,
            instance_cpu: capacity.instance_cpu,
        });
    }

    if pf.cpu < 0 {
        return Err(ValidationError::CpuNegative { cpu: pf.cpu });
    }

    if pf.memory > capacity.instance_memory {
        return Err(ValidationError::MemoryExceedsInstance {
            memory: pf.memory,
            instance_memory: capacity.instance_memory,
        });
    }

    Ok(())
}
