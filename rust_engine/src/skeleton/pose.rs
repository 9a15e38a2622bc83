//! 姿态求解
//!
//! 两次深度优先遍历：绑定姿态（只执行一次）与当前姿态（每次修改关节旋转后执行）。
//! 进入关节时压入本地变换，离开时弹出，栈顶即根到该关节的累积变换。

use glam::{Mat3, Mat4};

use super::{JointManager, Visit};
use crate::stack::MatrixStack;
use crate::{Result, SkinError};

/// 欧拉角旋转矩阵 `Rz * Ry * Rx`（先绕 X，再绕 Y，最后绕 Z）
pub fn euler_rotation(rx: f32, ry: f32, rz: f32) -> Mat3 {
    Mat3::from_rotation_z(rz) * Mat3::from_rotation_y(ry) * Mat3::from_rotation_x(rx)
}

impl JointManager {
    /// 计算每个关节的绑定姿态世界到关节变换（累积变换的逆）
    ///
    /// 任一累积变换不可逆时返回 `SingularTransform`，且不修改任何关节。
    pub fn compute_bind_world_to_joint_transforms(
        &mut self,
        stack: &mut MatrixStack,
        singular_epsilon: f32,
    ) -> Result<()> {
        stack.clear();
        let mut inverses = vec![Mat4::IDENTITY; self.joint_count()];
        let order: Vec<Visit> = self.depth_first().collect();

        for visit in order {
            match visit {
                Visit::Enter(index) => {
                    stack.push(self.joints()[index].transform);
                    let accumulated = stack.top();
                    let determinant = accumulated.determinant();
                    if !determinant.is_finite() || determinant.abs() < singular_epsilon {
                        log::debug!("关节 {} 累积变换不可逆: det = {}", index, determinant);
                        return Err(SkinError::SingularTransform { joint: index });
                    }
                    inverses[index] = accumulated.inverse();
                }
                Visit::Exit(_) => {
                    stack.pop()?;
                }
            }
        }

        for (joint, inverse) in self.joints_mut().iter_mut().zip(inverses) {
            joint.bind_world_to_joint = inverse;
        }
        log::debug!("绑定姿态计算完成: {} 个关节", self.joint_count());
        Ok(())
    }

    /// 更新每个关节的当前关节到世界变换（累积变换本身）
    pub fn update_current_joint_to_world_transforms(&mut self, stack: &mut MatrixStack) -> Result<()> {
        stack.clear();
        let order: Vec<Visit> = self.depth_first().collect();

        for visit in order {
            match visit {
                Visit::Enter(index) => {
                    let joint = &mut self.joints_mut()[index];
                    stack.push(joint.transform);
                    joint.current_joint_to_world = stack.top();
                }
                Visit::Exit(_) => {
                    stack.pop()?;
                }
            }
        }
        Ok(())
    }

    /// 设置关节旋转：用 `Rz * Ry * Rx` 替换本地变换的旋转部分
    ///
    /// 不会自动重算当前姿态，调用方需随后调用
    /// `update_current_joint_to_world_transforms`。
    pub fn set_joint_transform(&mut self, index: usize, rx: f32, ry: f32, rz: f32) -> Result<()> {
        let joint = self.get_joint_mut(index)?;
        joint.set_rotation(euler_rotation(rx, ry, rz));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::SkeletonRecord;
    use glam::{Vec3, Vec4};
    use std::f32::consts::{FRAC_PI_2, PI};

    fn chain_skeleton() -> JointManager {
        // 0 -> 1 -> 2, 0 -> 3
        JointManager::from_records(&[
            SkeletonRecord::new(Vec3::new(0.5, 0.0, 0.0), -1),
            SkeletonRecord::new(Vec3::new(0.0, 1.0, 0.0), 0),
            SkeletonRecord::new(Vec3::new(0.0, 1.0, 0.0), 1),
            SkeletonRecord::new(Vec3::new(-1.0, 0.0, 0.5), 0),
        ])
        .unwrap()
    }

    /// 沿父链手动累积本地变换
    fn accumulated(manager: &JointManager, index: usize) -> Mat4 {
        let joint = manager.get_joint(index).unwrap();
        match joint.parent {
            Some(parent) => accumulated(manager, parent) * joint.transform,
            None => joint.transform,
        }
    }

    fn solved(mut manager: JointManager) -> JointManager {
        let mut stack = MatrixStack::new();
        manager
            .compute_bind_world_to_joint_transforms(&mut stack, 1e-8)
            .unwrap();
        manager
            .update_current_joint_to_world_transforms(&mut stack)
            .unwrap();
        manager
    }

    #[test]
    fn test_euler_rotation_order() {
        let (rx, ry, rz) = (0.3, -0.8, 1.1);
        let expected = Mat3::from_quat(
            glam::Quat::from_rotation_z(rz)
                * glam::Quat::from_rotation_y(ry)
                * glam::Quat::from_rotation_x(rx),
        );
        assert!(euler_rotation(rx, ry, rz).abs_diff_eq(expected, 1e-5));
        assert!(euler_rotation(0.0, 0.0, 0.0).abs_diff_eq(Mat3::IDENTITY, 1e-7));
    }

    #[test]
    fn test_bind_inverse_round_trip() {
        let manager = solved(chain_skeleton());

        for index in 0..manager.joint_count() {
            let joint = manager.get_joint(index).unwrap();
            let product = joint.bind_world_to_joint * accumulated(&manager, index);
            assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_bind_pose_world_positions() {
        let manager = solved(chain_skeleton());
        let positions = manager.world_positions();

        assert!(positions[0].abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
        assert!(positions[1].abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
        assert!(positions[2].abs_diff_eq(Vec3::new(0.5, 2.0, 0.0), 1e-6));
        assert!(positions[3].abs_diff_eq(Vec3::new(-0.5, 0.0, 0.5), 1e-6));

        // 无旋转时蒙皮矩阵为单位矩阵
        for joint in manager.joints() {
            assert!(joint.get_skinning_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_zero_angles_keep_bind_transform() {
        let mut manager = chain_skeleton();
        manager.set_joint_transform(1, 0.0, 0.0, 0.0).unwrap();

        let joint = manager.get_joint(1).unwrap();
        assert!(joint
            .transform
            .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)), 1e-7));
    }

    #[test]
    fn test_rotation_propagates_to_descendants() {
        let mut manager = solved(chain_skeleton());
        // 关节 1 绕 Z 轴旋转 90 度，关节 2 的偏移 (0,1,0) 变为 (-1,0,0)
        manager.set_joint_transform(1, 0.0, 0.0, FRAC_PI_2).unwrap();

        let before = manager.world_positions();
        assert!(before[2].abs_diff_eq(Vec3::new(0.5, 2.0, 0.0), 1e-6));

        let mut stack = MatrixStack::new();
        manager
            .update_current_joint_to_world_transforms(&mut stack)
            .unwrap();
        let after = manager.world_positions();

        assert!(after[1].abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
        assert!(after[2].abs_diff_eq(Vec3::new(-0.5, 1.0, 0.0), 1e-5));
        // 兄弟分支不受影响
        assert!(after[3].abs_diff_eq(Vec3::new(-0.5, 0.0, 0.5), 1e-6));
        // 绑定变换不随姿态改变
        let bind = manager.get_joint(2).unwrap().bind_world_to_joint;
        assert!((bind * Vec4::new(0.5, 2.0, 0.0, 1.0)).abs_diff_eq(Vec4::W, 1e-6));
    }

    #[test]
    fn test_set_joint_transform_out_of_range() {
        let mut manager = chain_skeleton();
        let result = manager.set_joint_transform(4, 0.0, PI, 0.0);
        assert!(matches!(
            result,
            Err(SkinError::IndexOutOfRange { index: 4, count: 4 })
        ));
    }

    #[test]
    fn test_singular_bind_transform() {
        let mut manager = chain_skeleton();
        manager.joints_mut()[2].transform = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));

        let mut stack = MatrixStack::new();
        let result = manager.compute_bind_world_to_joint_transforms(&mut stack, 1e-8);
        assert!(matches!(result, Err(SkinError::SingularTransform { joint: 2 })));
        // 失败时不保留部分结果
        assert!(manager
            .joints()
            .iter()
            .all(|j| j.bind_world_to_joint == Mat4::IDENTITY));
    }

    #[test]
    fn test_stack_is_balanced_after_pass() {
        let mut manager = chain_skeleton();
        let mut stack = MatrixStack::new();
        manager
            .update_current_joint_to_world_transforms(&mut stack)
            .unwrap();
        assert!(stack.is_empty());
    }
}
