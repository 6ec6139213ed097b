use eframe::glow::{self, HasContext};
use log::info;

/// Compute dispatch limits reported by the driver. Dispatches are never
/// clamped or split against these values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkCapabilities {
    pub max_work_group_count: [i32; 3],
    pub max_work_group_size: [i32; 3],
    pub max_work_group_invocations: i32,
}

impl WorkCapabilities {
    pub fn query(gl: &glow::Context) -> Self {
        let mut caps = Self::default();
        unsafe {
            for axis in 0..3 {
                caps.max_work_group_count[axis] =
                    gl.get_parameter_indexed_i32(glow::MAX_COMPUTE_WORK_GROUP_COUNT, axis as u32);
                caps.max_work_group_size[axis] =
                    gl.get_parameter_indexed_i32(glow::MAX_COMPUTE_WORK_GROUP_SIZE, axis as u32);
            }
            caps.max_work_group_invocations =
                gl.get_parameter_i32(glow::MAX_COMPUTE_WORK_GROUP_INVOCATIONS);
        }
        info!("compute capabilities: {caps:?}");
        caps
    }

    /// Whether a `width` x `height` grid of single-invocation groups fits the
    /// reported group count limits. Informational only.
    pub fn fits_grid(&self, width: u32, height: u32) -> bool {
        let fits = |count: u32, limit: i32| limit <= 0 || i64::from(count) <= i64::from(limit);
        fits(width, self.max_work_group_count[0]) && fits(height, self.max_work_group_count[1])
    }
}
