//! 渲染接口
//!
//! 本模块不调用任何图形 API，只生成渲染器需要的数据：
//! 蒙皮网格的三角形列表，以及骨架可视化用的 (变换, 图元) 序列。

use glam::{Mat4, Vec3, Vec4};

use crate::config::SkinConfig;
use crate::mesh::Triangle;
use crate::skeleton::{JointManager, Visit};
use crate::stack::MatrixStack;
use crate::Result;

/// 骨架可视化图元
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Sphere { radius: f32, slices: u32, stacks: u32 },
    Cube { size: f32 },
}

/// 一次图元绘制
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub transform: Mat4,
    pub primitive: Primitive,
}

/// 外部渲染器
pub trait Renderer {
    /// 以 `transform` 作为模型视图矩阵绘制三角形
    fn draw_triangles(&mut self, transform: Mat4, triangles: &[Triangle]);

    fn draw_primitive(&mut self, command: &DrawCommand);
}

/// 骨骼局部基底：+Z 指向子关节，Y = Z x 参考向量，X = Y x Z
///
/// 方向与参考向量平行时叉积为零向量，结果包含 NaN。
pub fn bone_basis(direction: Vec3, reference: Vec3) -> Mat4 {
    let z = direction.normalize();
    let y = z.cross(reference).normalize();
    let x = y.cross(z).normalize();
    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), Vec4::W)
}

/// 骨架可视化：先为每个关节生成球体，再为每段骨骼生成方块
pub fn skeleton_draw_list(
    camera: Mat4,
    manager: &JointManager,
    config: &SkinConfig,
) -> Result<Vec<DrawCommand>> {
    let mut commands = Vec::with_capacity(manager.joint_count() * 2);
    let mut stack = MatrixStack::new();
    stack.push(camera);

    push_joint_commands(manager, config, &mut stack, &mut commands)?;
    push_bone_commands(manager, config, &mut stack, &mut commands)?;

    stack.pop()?;
    Ok(commands)
}

fn push_joint_commands(
    manager: &JointManager,
    config: &SkinConfig,
    stack: &mut MatrixStack,
    commands: &mut Vec<DrawCommand>,
) -> Result<()> {
    let sphere = Primitive::Sphere {
        radius: config.joint_sphere_radius,
        slices: config.sphere_slices,
        stacks: config.sphere_stacks,
    };

    for visit in manager.depth_first() {
        match visit {
            Visit::Enter(index) => {
                stack.push(manager.joints()[index].transform);
                commands.push(DrawCommand {
                    transform: stack.top(),
                    primitive: sphere,
                });
            }
            Visit::Exit(_) => {
                stack.pop()?;
            }
        }
    }
    Ok(())
}

fn push_bone_commands(
    manager: &JointManager,
    config: &SkinConfig,
    stack: &mut MatrixStack,
    commands: &mut Vec<DrawCommand>,
) -> Result<()> {
    let joints = manager.joints();

    for visit in manager.depth_first() {
        match visit {
            Visit::Enter(index) => {
                stack.push(joints[index].transform);

                for &child in &joints[index].children {
                    let offset = joints[child].translation();
                    let length = offset.length();

                    stack.push(bone_basis(offset, config.bone_reference_up));
                    stack.push(Mat4::from_scale(Vec3::new(
                        config.bone_thickness,
                        config.bone_thickness,
                        length,
                    )));
                    // 单位方块中心移到骨骼中点
                    stack.push(Mat4::from_translation(Vec3::new(0.0, 0.0, 0.5)));

                    commands.push(DrawCommand {
                        transform: stack.top(),
                        primitive: Primitive::Cube { size: 1.0 },
                    });

                    stack.pop()?;
                    stack.pop()?;
                    stack.pop()?;
                }
            }
            Visit::Exit(_) => {
                stack.pop()?;
            }
        }
    }
    Ok(())
}
