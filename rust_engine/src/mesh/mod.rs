//! 蒙皮网格

mod skinned_mesh;

pub use skinned_mesh::SkinnedMesh;

use glam::Vec3;

/// 三角面，索引从 1 开始
pub type Face = [u32; 3];

/// 网格记录
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshRecord {
    /// `v x y z`
    Vertex(Vec3),
    /// `f i j k`
    Face(Face),
}

/// 交给渲染器的三角形（当前顶点位置与面法线）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub normal: Vec3,
    pub vertices: [Vec3; 3],
}
