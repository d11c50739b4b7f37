#[cfg(feature = "physics")]
pub mod physics;
pub mod ray;
pub mod scene;
pub mod time;
