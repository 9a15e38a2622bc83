//! 关节节点

use glam::{Mat3, Mat4, Vec3, Vec4};

/// 关节节点
///
/// 父子关系通过 `JointManager` 中的索引表示，关节本身不持有其他关节。
#[derive(Clone, Debug)]
pub struct Joint {
    /// 创建顺序，同时也是权重列的查找依据
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,

    // 相对于父关节的本地变换（加载时为纯平移）
    pub transform: Mat4,
    // 世界空间 -> 关节空间（绑定姿态，只计算一次）
    pub bind_world_to_joint: Mat4,
    // 关节空间 -> 世界空间（当前姿态）
    pub current_joint_to_world: Mat4,
}

impl Joint {
    pub fn new(index: usize, parent: Option<usize>, translation: Vec3) -> Self {
        Self {
            index,
            parent,
            children: Vec::new(),
            transform: Mat4::from_translation(translation),
            bind_world_to_joint: Mat4::IDENTITY,
            current_joint_to_world: Mat4::IDENTITY,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 相对于父关节的偏移
    pub fn translation(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// 替换本地变换的 3x3 旋转部分，平移列保持不变
    pub fn set_rotation(&mut self, rotation: Mat3) {
        let translation = self.transform.w_axis;
        self.transform = Mat4::from_cols(
            rotation.x_axis.extend(0.0),
            rotation.y_axis.extend(0.0),
            rotation.z_axis.extend(0.0),
            translation,
        );
    }

    /// 蒙皮矩阵 = 当前关节到世界 * 绑定世界到关节
    pub fn get_skinning_matrix(&self) -> Mat4 {
        self.current_joint_to_world * self.bind_world_to_joint
    }

    /// 当前姿态下关节的世界位置
    pub fn world_position(&self) -> Vec3 {
        (self.current_joint_to_world * Vec4::W).truncate()
    }
}
