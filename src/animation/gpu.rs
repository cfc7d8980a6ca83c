//! GPU-side packing of final bone matrices

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// GPU-side bone transform (column-major mat4 for skinning)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuBoneMatrix {
    pub matrix: [[f32; 4]; 4],
}

impl GpuBoneMatrix {
    /// Create from a glam Mat4
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrix)
    }
}

/// Convert a matrix palette for upload
pub fn pack_matrices(matrices: &[Mat4]) -> Vec<GpuBoneMatrix> {
    matrices.iter().map(|m| GpuBoneMatrix::from_mat4(*m)).collect()
}

/// Raw bytes of a packed palette, ready for a buffer write
pub fn as_bytes(matrices: &[GpuBoneMatrix]) -> &[u8] {
    bytemuck::cast_slice(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_bone_matrix_from_mat4() {
        let mat = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let gpu = GpuBoneMatrix::from_mat4(mat);

        // Translation lives in the fourth column
        assert_eq!(gpu.matrix[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(gpu.to_mat4(), mat);
    }

    #[test]
    fn test_pack_matrices_bytes() {
        let packed = pack_matrices(&[Mat4::IDENTITY; 3]);
        assert_eq!(packed.len(), 3);
        assert_eq!(as_bytes(&packed).len(), 3 * 64);

        let zeroed: GpuBoneMatrix = Zeroable::zeroed();
        assert_eq!(zeroed.matrix, [[0.0; 4]; 4]);
    }
}
