//! 骨骼蒙皮模型

mod runtime;

pub use runtime::SkeletalModel;
