//! Solaria: a procedurally shaped sun spinning in front of a follow camera.

pub mod app;
pub mod camera;
pub mod clock;
pub mod error;
pub mod input;
pub mod sun;

pub use app::{App, run};
pub use camera::FollowCamera;
pub use clock::FrameClock;
pub use error::GameError;
pub use input::{KeyboardState, OrbitInput};
pub use sun::{HeatModel, Sun};
