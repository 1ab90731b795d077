use solaria_render::RenderContextError;
use solaria_scene::SceneError;
use thiserror::Error;

/// Fatal errors that end the game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Render(#[from] RenderContextError),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}
