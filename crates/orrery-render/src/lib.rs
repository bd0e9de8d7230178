pub mod assets;
pub mod diagnostics;
pub mod draw;
pub mod error;
pub mod frame;
pub mod gpu_types;
pub mod pipelines;
pub mod renderer;
pub mod shadow;
pub mod slots;
pub mod uniforms;
pub mod window;

pub use assets::{MaterialId, MeshId, SceneAssets, TextureId};
pub use draw::{DrawCall, Satellite};
pub use error::{AssetError, ObjError};
pub use frame::{EventLog, FramePlan, PassEvent, PassKind, PassRecorder};
pub use pipelines::PipelineKind;
pub use renderer::{Renderer, RendererOptions};
pub use slots::{RenderMode, TextureUnit};
pub use window::run;
