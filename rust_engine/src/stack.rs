//! 矩阵栈
//!
//! 栈顶为所有已压入矩阵按压入顺序的乘积 `M0 * M1 * ... * Mk`。
//! 每次遍历持有自己的栈实例，不存在全局共享的矩阵栈。

use glam::Mat4;

use crate::{Result, SkinError};

/// 层级变换累积栈
#[derive(Clone, Debug, Default)]
pub struct MatrixStack {
    entries: Vec<Mat4>,
    // accumulated[k] = entries[0] * ... * entries[k]
    accumulated: Vec<Mat4>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            accumulated: Vec::new(),
        }
    }

    /// 压入矩阵，栈顶右乘该矩阵
    pub fn push(&mut self, matrix: Mat4) {
        let product = self.top() * matrix;
        self.entries.push(matrix);
        self.accumulated.push(product);
    }

    /// 弹出最近压入的矩阵，空栈时返回 `Underflow`
    pub fn pop(&mut self) -> Result<Mat4> {
        self.accumulated.pop();
        self.entries.pop().ok_or(SkinError::Underflow)
    }

    /// 栈顶累积变换（空栈为单位矩阵）
    pub fn top(&self) -> Mat4 {
        self.accumulated.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    /// 最近压入的单个矩阵
    pub fn peek(&self) -> Option<Mat4> {
        self.entries.last().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.accumulated.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
