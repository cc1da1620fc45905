pub mod color_bo;
pub mod transform_bo;
