pub mod camera;
pub mod color;
pub mod gpu_context;
pub mod light;
pub mod mesh_renderer;
pub mod shaders;
pub mod shapes;
pub mod vertex;

pub use camera::PerspectiveCamera;
pub use color::Color;
pub use gpu_context::GpuContext;
pub use light::{AmbientLight, DirectionalLight};
pub use mesh_renderer::{FrameScene, MeshInstance, MeshRenderer, RenderStats};
pub use shapes::ShapeKind;
pub use vertex::{InstanceRaw, MeshVertex};
