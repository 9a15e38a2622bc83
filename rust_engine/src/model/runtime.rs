//! 骨骼蒙皮模型运行时

use std::path::Path;

use glam::Mat4;

use crate::config::{self, SkinConfig};
use crate::loader;
use crate::mesh::{MeshRecord, SkinnedMesh, Triangle};
use crate::render::{self, Renderer};
use crate::skeleton::{JointManager, SkeletonRecord};
use crate::skinning::{skin_mesh, SkinningContext};
use crate::stack::MatrixStack;
use crate::Result;

/// 骨骼蒙皮模型
///
/// 加载流程：骨架 -> 网格 -> 权重 -> 绑定姿态 -> 当前姿态。
/// 任一步失败都不会返回模型。
pub struct SkeletalModel {
    joint_manager: JointManager,
    mesh: SkinnedMesh,
    config: SkinConfig,
}

impl SkeletalModel {
    /// 从三个文本文件加载模型
    pub fn load<P, Q, R>(skeleton_path: P, mesh_path: Q, attachments_path: R) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        let skeleton = loader::read_skeleton(skeleton_path.as_ref())?;
        let mesh = loader::read_mesh(mesh_path.as_ref())?;
        let attachments = loader::read_attachments(attachments_path.as_ref())?;

        let model = Self::from_records(&skeleton, &mesh, attachments)?;
        log::info!(
            "模型加载完成: {} ({} 个关节, {} 个顶点)",
            mesh_path.as_ref().display(),
            model.joint_count(),
            model.mesh.vertex_count()
        );
        Ok(model)
    }

    /// 从已解析的记录构建模型，使用全局配置
    pub fn from_records(
        skeleton: &[SkeletonRecord],
        mesh: &[MeshRecord],
        attachments: Vec<Vec<f32>>,
    ) -> Result<Self> {
        Self::with_config(skeleton, mesh, attachments, config::get_config())
    }

    pub fn with_config(
        skeleton: &[SkeletonRecord],
        mesh: &[MeshRecord],
        attachments: Vec<Vec<f32>>,
        config: SkinConfig,
    ) -> Result<Self> {
        let mut joint_manager = JointManager::from_records(skeleton)?;
        let mut mesh = SkinnedMesh::load(mesh)?;
        mesh.load_attachments(attachments, joint_manager.joint_count())?;

        let mut stack = MatrixStack::new();
        joint_manager.compute_bind_world_to_joint_transforms(&mut stack, config.singular_epsilon)?;
        joint_manager.update_current_joint_to_world_transforms(&mut stack)?;

        Ok(Self {
            joint_manager,
            mesh,
            config,
        })
    }

    /// 获取关节数量
    pub fn joint_count(&self) -> usize {
        self.joint_manager.joint_count()
    }

    pub fn joint_manager(&self) -> &JointManager {
        &self.joint_manager
    }

    pub fn mesh(&self) -> &SkinnedMesh {
        &self.mesh
    }

    pub fn config(&self) -> &SkinConfig {
        &self.config
    }

    /// 设置关节旋转（欧拉角，弧度）
    ///
    /// 只修改本地变换，需随后调用 `update_current_joint_to_world_transforms` 与 `update_mesh`。
    pub fn set_joint_transform(&mut self, index: usize, rx: f32, ry: f32, rz: f32) -> Result<()> {
        self.joint_manager.set_joint_transform(index, rx, ry, rz)
    }

    /// 重新计算当前姿态
    pub fn update_current_joint_to_world_transforms(&mut self) -> Result<()> {
        let mut stack = MatrixStack::new();
        self.joint_manager
            .update_current_joint_to_world_transforms(&mut stack)
    }

    /// 更新顶点（蒙皮计算）
    pub fn update_mesh(&mut self) -> Result<()> {
        let context = SkinningContext::from_config(&self.config);
        skin_mesh(&self.joint_manager, &mut self.mesh, &context)
    }

    /// 修改一个关节的旋转并完成姿态与蒙皮更新
    pub fn apply_joint_rotation(&mut self, index: usize, rx: f32, ry: f32, rz: f32) -> Result<()> {
        self.set_joint_transform(index, rx, ry, rz)?;
        self.update_current_joint_to_world_transforms()?;
        self.update_mesh()
    }

    /// 绘制模型：显示骨架时绘制关节与骨骼，否则绘制蒙皮网格
    pub fn draw<R: Renderer>(&self, camera: Mat4, skeleton_visible: bool, renderer: &mut R) -> Result<()> {
        if skeleton_visible {
            for command in render::skeleton_draw_list(camera, &self.joint_manager, &self.config)? {
                renderer.draw_primitive(&command);
            }
        } else {
            let triangles: Vec<Triangle> = self.mesh.triangles().collect();
            renderer.draw_triangles(camera, &triangles);
        }
        Ok(())
    }
}
