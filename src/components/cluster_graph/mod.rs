mod component;
mod input;
mod particles;
mod physics;
mod render;
mod store;
mod types;

pub use component::ClusterGraphCanvas;
pub use input::InputController;
pub use store::NodeGraphStore;
pub use types::{ClusterStatus, Node, Particle, PeerStatus, PointerEvent};
