//! SSD Engine - 骨骼子空间变形（线性混合蒙皮）运行时
//!
//! 提供以下功能：
//! - 骨架 / 网格 / 权重文本记录解析
//! - 关节层级（arena 存储）与矩阵栈
//! - 绑定姿态与当前姿态的层级变换计算
//! - 顶点蒙皮计算
//! - 渲染器接口（三角形与骨架可视化图元）

pub mod config;
pub mod loader;
pub mod mesh;
pub mod model;
pub mod render;
pub mod skeleton;
pub mod skinning;
pub mod stack;

pub use config::SkinConfig;
pub use mesh::{SkinnedMesh, Triangle};
pub use model::SkeletalModel;
pub use render::{DrawCommand, Primitive, Renderer};
pub use skeleton::{Joint, JointManager};
pub use stack::MatrixStack;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("malformed skeleton: {0}")]
    MalformedSkeleton(String),

    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("attachment mismatch: {0}")]
    AttachmentMismatch(String),

    #[error("joint index {index} out of range (joint count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("matrix stack underflow")]
    Underflow,

    #[error("bind transform of joint {joint} is not invertible")]
    SingularTransform { joint: usize },
}

pub type Result<T> = std::result::Result<T, SkinError>;
