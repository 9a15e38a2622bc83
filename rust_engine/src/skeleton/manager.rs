//! 关节管理器

use glam::Vec3;

use super::{Joint, SkeletonRecord, Visit, ROOT_PARENT};
use crate::{Result, SkinError};

/// 关节管理器
///
/// 关节按创建顺序存放在一个数组中，索引即关节 id。
#[derive(Clone, Debug)]
pub struct JointManager {
    joints: Vec<Joint>,
    root: usize,
}

impl JointManager {
    /// 从骨架记录构建层级
    ///
    /// 父索引必须指向之前已创建的关节，且恰好有一条记录的父索引为 -1。
    pub fn from_records(records: &[SkeletonRecord]) -> Result<Self> {
        let mut joints: Vec<Joint> = Vec::with_capacity(records.len());
        let mut root = None;

        for (index, record) in records.iter().enumerate() {
            let parent = if record.parent == ROOT_PARENT {
                if let Some(existing) = root {
                    return Err(SkinError::MalformedSkeleton(format!(
                        "joint {} is a second root (joint {} is already the root)",
                        index, existing
                    )));
                }
                root = Some(index);
                None
            } else if record.parent >= 0 && (record.parent as usize) < index {
                Some(record.parent as usize)
            } else {
                return Err(SkinError::MalformedSkeleton(format!(
                    "joint {} references parent {} which is not defined before it",
                    index, record.parent
                )));
            };

            if let Some(parent_index) = parent {
                joints[parent_index].children.push(index);
            }
            joints.push(Joint::new(index, parent, record.translation));
        }

        let root = root.ok_or_else(|| {
            SkinError::MalformedSkeleton("skeleton has no root joint".to_string())
        })?;

        log::info!("骨架加载完成: {} 个关节, 根关节 {}", joints.len(), root);

        Ok(Self { joints, root })
    }

    /// 获取关节数量
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn root_index(&self) -> usize {
        self.root
    }

    /// 获取关节
    pub fn get_joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// 获取可变关节引用
    pub(crate) fn get_joint_mut(&mut self, index: usize) -> Result<&mut Joint> {
        let count = self.joints.len();
        self.joints
            .get_mut(index)
            .ok_or(SkinError::IndexOutOfRange { index, count })
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// 当前姿态下所有关节的世界位置
    pub fn world_positions(&self) -> Vec<Vec3> {
        self.joints.iter().map(Joint::world_position).collect()
    }

    /// 从根关节开始的深度优先遍历
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            joints: &self.joints,
            worklist: vec![Visit::Enter(self.root)],
        }
    }
}

/// 显式工作栈实现的深度优先遍历，不依赖递归深度
pub struct DepthFirst<'a> {
    joints: &'a [Joint],
    worklist: Vec<Visit>,
}

impl Iterator for DepthFirst<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let visit = self.worklist.pop()?;
        if let Visit::Enter(index) = visit {
            self.worklist.push(Visit::Exit(index));
            // 逆序压入，使子关节按创建顺序出栈
            for &child in self.joints[index].children.iter().rev() {
                self.worklist.push(Visit::Enter(child));
            }
        }
        Some(visit)
    }
}
