mod obstacle;
mod workspace;

pub use obstacle::Obstacle;
pub use workspace::Workspace;
