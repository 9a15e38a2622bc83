//! 蒙皮运行时配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use glam::Vec3;
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 蒙皮配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct SkinConfig {
    // ========== 骨架可视化 ==========
    /// 关节球半径，默认 0.025
    pub joint_sphere_radius: f32,
    /// 关节球经线细分数，默认 12
    pub sphere_slices: u32,
    /// 关节球纬线细分数，默认 12
    pub sphere_stacks: u32,
    /// 骨骼方块的横截面边长，默认 0.025
    pub bone_thickness: f32,
    /// 构建骨骼基底时使用的参考向量，默认 (0, 0, 1)
    /// 骨骼方向与此向量平行时基底退化
    pub bone_reference_up: Vec3,

    // ========== 数值 ==========
    /// 行列式绝对值低于此值时视为不可逆，默认 1e-8
    pub singular_epsilon: f32,

    // ========== 蒙皮 ==========
    /// 是否使用 rayon 并行蒙皮，默认 false（单线程）
    pub parallel_skinning: bool,
    /// 顶点数达到此值才启用并行，默认 4096
    pub parallel_min_vertices: usize,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            joint_sphere_radius: 0.025,
            sphere_slices: 12,
            sphere_stacks: 12,
            bone_thickness: 0.025,
            bone_reference_up: Vec3::Z,

            singular_epsilon: 1e-8,

            // 少量顶点时线程调度的开销大于收益
            parallel_skinning: false,
            parallel_min_vertices: 4096,

            debug_log: false,
        }
    }
}

/// 全局配置实例
static SKIN_CONFIG: Lazy<RwLock<SkinConfig>> = Lazy::new(|| RwLock::new(SkinConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> SkinConfig {
    SKIN_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: SkinConfig) {
    *SKIN_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(SkinConfig::default());
}
