//! 顶点蒙皮计算

mod skinning;

pub use skinning::{compute_skinning, skin_mesh, SkinningContext};

use glam::{Mat4, Vec3};

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 绑定姿态顶点位置
    pub positions: &'a [Vec3],
    /// 顶点权重，第 `j - 1` 列对应关节 `j`
    pub attachments: &'a [Vec<f32>],
    /// 每个关节的蒙皮矩阵（当前关节到世界 * 绑定世界到关节），下标 0 为根关节
    pub joint_matrices: &'a [Mat4],
}
