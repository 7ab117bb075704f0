use meshrig_render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no mesh at index {index} (scene has {len})")]
    MeshIndex { index: usize, len: usize },
    #[error("texture unit {unit} is bound twice")]
    DuplicateUnit { unit: u32 },
}
