//! 关节层级与姿态求解

mod joint;
mod manager;
mod pose;

pub use joint::Joint;
pub use manager::{DepthFirst, JointManager};
pub use pose::euler_rotation;

use glam::Vec3;

/// 根关节在记录中的父索引
pub const ROOT_PARENT: i32 = -1;

/// 骨架记录：`tx ty tz parent`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkeletonRecord {
    pub translation: Vec3,
    pub parent: i32,
}

impl SkeletonRecord {
    pub fn new(translation: Vec3, parent: i32) -> Self {
        Self { translation, parent }
    }
}

/// 深度优先遍历事件
///
/// `Enter` 按先序发出（压栈），`Exit` 按后序发出（出栈）。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Enter(usize),
    Exit(usize),
}
