//! 顶点蒙皮计算
//!
//! 线性混合蒙皮：`v' = Σ w_j * (T_j * B_j * v)`，权重不做归一化。

use glam::{Mat4, Vec3, Vec4};
use rayon::prelude::*;

use super::SkinningInput;
use crate::config::SkinConfig;
use crate::mesh::SkinnedMesh;
use crate::skeleton::{Joint, JointManager};
use crate::{Result, SkinError};

/// 蒙皮上下文
#[derive(Clone, Debug)]
pub struct SkinningContext {
    pub parallel: bool,
    pub parallel_min_vertices: usize,
    pub debug_log: bool,
}

impl Default for SkinningContext {
    fn default() -> Self {
        Self {
            parallel: false,
            parallel_min_vertices: usize::MAX,
            debug_log: false,
        }
    }
}

impl SkinningContext {
    pub fn from_config(config: &SkinConfig) -> Self {
        Self {
            parallel: config.parallel_skinning,
            parallel_min_vertices: config.parallel_min_vertices,
            debug_log: config.debug_log,
        }
    }

    fn use_parallel(&self, vertex_count: usize) -> bool {
        self.parallel && vertex_count >= self.parallel_min_vertices
    }
}

/// 计算蒙皮，结果写入 `output`
///
/// `output`、`input.positions` 与 `input.attachments` 长度必须相同，
/// 每行权重数不能超过 `joint_matrices.len() - 1`。
pub fn compute_skinning(
    input: &SkinningInput,
    output: &mut [Vec3],
    context: &SkinningContext,
) -> Result<()> {
    let matrices = input.joint_matrices;

    if input.positions.len() != output.len() || input.attachments.len() != output.len() {
        return Err(SkinError::AttachmentMismatch(format!(
            "{} positions, {} attachment rows, {} output vertices",
            input.positions.len(),
            input.attachments.len(),
            output.len()
        )));
    }
    let max_columns = matrices.len().saturating_sub(1);
    if let Some(row) = input.attachments.iter().position(|r| r.len() > max_columns) {
        return Err(SkinError::AttachmentMismatch(format!(
            "row {} has {} weights for {} joint matrices",
            row,
            input.attachments[row].len(),
            matrices.len()
        )));
    }

    if context.use_parallel(output.len()) {
        output
            .par_iter_mut()
            .zip(input.positions.par_iter())
            .zip(input.attachments.par_iter())
            .for_each(|((out, &position), weights)| {
                *out = compute_single_vertex(position, weights, matrices);
            });
    } else {
        for ((out, &position), weights) in output
            .iter_mut()
            .zip(input.positions.iter())
            .zip(input.attachments.iter())
        {
            *out = compute_single_vertex(position, weights, matrices);
        }
    }
    Ok(())
}

/// 计算单个顶点的蒙皮
///
/// 权重不大于 0 的关节被跳过；权重为 0 时跳过与参与计算结果相同。
fn compute_single_vertex(position: Vec3, weights: &[f32], matrices: &[Mat4]) -> Vec3 {
    let p = position.extend(1.0);
    let mut blended = Vec4::ZERO;

    for (column, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            // 第 0 列对应关节 1
            blended += weight * (matrices[column + 1] * p);
        }
    }

    blended.truncate()
}

/// 用关节当前姿态对网格做一次完整蒙皮
pub fn skin_mesh(
    manager: &JointManager,
    mesh: &mut SkinnedMesh,
    context: &SkinningContext,
) -> Result<()> {
    let vertex_count = mesh.vertex_count();
    let columns = manager.joint_count().saturating_sub(1);

    if mesh.attachments().len() != vertex_count {
        return Err(SkinError::AttachmentMismatch(format!(
            "{} attachment rows for {} vertices",
            mesh.attachments().len(),
            vertex_count
        )));
    }
    if let Some(row) = mesh.attachments().iter().position(|r| r.len() != columns) {
        return Err(SkinError::AttachmentMismatch(format!(
            "row {} does not match {} skinned joints",
            row, columns
        )));
    }

    let joint_matrices: Vec<Mat4> = manager
        .joints()
        .iter()
        .map(Joint::get_skinning_matrix)
        .collect();

    if context.debug_log {
        let unnormalized = mesh
            .attachments()
            .iter()
            .filter(|row| {
                let sum: f32 = row.iter().filter(|&&w| w > 0.0).sum();
                (sum - 1.0).abs() > 1e-4
            })
            .count();
        log::debug!(
            "蒙皮: {} 个顶点, {} 个关节, {} 个顶点权重和不为 1",
            vertex_count,
            manager.joint_count(),
            unnormalized
        );
    }

    let (positions, attachments, current) = mesh.skinning_buffers();
    let input = SkinningInput {
        positions,
        attachments,
        joint_matrices: &joint_matrices,
    };
    compute_skinning(&input, current, context)
}
