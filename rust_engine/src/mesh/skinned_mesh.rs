//! 蒙皮网格数据

use glam::Vec3;

use super::{Face, MeshRecord, Triangle};
use crate::{Result, SkinError};

/// 蒙皮网格
///
/// 绑定顶点在加载后不再改变；当前顶点初始为绑定顶点的拷贝，每次蒙皮时被覆盖。
/// 权重矩阵每行对应一个顶点，列数为关节数 - 1（根关节不参与蒙皮）。
#[derive(Clone, Debug, Default)]
pub struct SkinnedMesh {
    bind_vertices: Vec<Vec3>,
    current_vertices: Vec<Vec3>,
    faces: Vec<Face>,
    attachments: Vec<Vec<f32>>,
}

impl SkinnedMesh {
    /// 从网格记录构建，保持输入顺序
    pub fn load(records: &[MeshRecord]) -> Result<Self> {
        let mut bind_vertices = Vec::new();
        let mut faces = Vec::new();

        for record in records {
            match *record {
                MeshRecord::Vertex(position) => bind_vertices.push(position),
                MeshRecord::Face(face) => faces.push(face),
            }
        }

        let vertex_count = bind_vertices.len();
        for (face_index, face) in faces.iter().enumerate() {
            if let Some(&bad) = face
                .iter()
                .find(|&&i| i == 0 || i as usize > vertex_count)
            {
                return Err(SkinError::MalformedMesh(format!(
                    "face {} references vertex {} (vertex count {})",
                    face_index, bad, vertex_count
                )));
            }
        }

        log::info!("网格加载完成: {} 个顶点, {} 个三角面", vertex_count, faces.len());

        Ok(Self {
            current_vertices: bind_vertices.clone(),
            bind_vertices,
            faces,
            attachments: Vec::new(),
        })
    }

    /// 设置顶点权重
    ///
    /// 行数必须等于顶点数，每行列数必须等于 `joint_count - 1`。
    /// 校验失败时保留原有权重。
    pub fn load_attachments(&mut self, rows: Vec<Vec<f32>>, joint_count: usize) -> Result<()> {
        if joint_count == 0 {
            return Err(SkinError::AttachmentMismatch(
                "joint count must be at least 1".to_string(),
            ));
        }
        if rows.len() != self.bind_vertices.len() {
            return Err(SkinError::AttachmentMismatch(format!(
                "{} attachment rows for {} vertices",
                rows.len(),
                self.bind_vertices.len()
            )));
        }

        let columns = joint_count - 1;
        if let Some((row_index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(SkinError::AttachmentMismatch(format!(
                "row {} has {} weights, expected {}",
                row_index,
                row.len(),
                columns
            )));
        }

        let negative = rows
            .iter()
            .filter(|row| row.iter().any(|&w| w < 0.0))
            .count();
        if negative > 0 {
            log::warn!("{} 个顶点含负权重，蒙皮时这些关节被忽略", negative);
        }

        self.attachments = rows;
        log::debug!(
            "权重加载完成: {} 行 x {} 列",
            self.attachments.len(),
            columns
        );
        Ok(())
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.bind_vertices.len()
    }

    /// 获取三角面数量
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn bind_vertices(&self) -> &[Vec3] {
        &self.bind_vertices
    }

    pub fn current_vertices(&self) -> &[Vec3] {
        &self.current_vertices
    }

    /// 蒙皮所需的缓冲区：(绑定顶点, 权重, 当前顶点)
    pub(crate) fn skinning_buffers(&mut self) -> (&[Vec3], &[Vec<f32>], &mut [Vec3]) {
        (
            &self.bind_vertices,
            &self.attachments,
            &mut self.current_vertices,
        )
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn attachments(&self) -> &[Vec<f32>] {
        &self.attachments
    }

    /// 当前顶点恢复为绑定姿态
    pub fn reset_current_vertices(&mut self) {
        self.current_vertices.copy_from_slice(&self.bind_vertices);
    }

    /// 计算三角面法线 `normalize((Vb - Va) x (Vc - Va))`
    pub fn face_normal(&self, face: &Face) -> Vec3 {
        let [a, b, c] = self.face_vertices(face);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// 当前姿态下的三角形列表（每面一个法线，呈现棱面效果）
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(move |face| Triangle {
            normal: self.face_normal(face),
            vertices: self.face_vertices(face),
        })
    }

    fn face_vertices(&self, face: &Face) -> [Vec3; 3] {
        // 面索引从 1 开始
        face.map(|i| self.current_vertices[i as usize - 1])
    }
}
