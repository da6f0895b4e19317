mod component;
pub mod config;
pub mod ego;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod regions;
pub mod simulation;
pub mod state;
pub mod types;

pub use component::{BrainGraphCanvas, FrameRenderer};
pub use config::{ForceConfig, JitterConfig, LayoutConfig, RadiusConfig};
pub use ego::{Depth, EgoNetworkResult, extract};
pub use error::LayoutError;
pub use geometry::{Point, Silhouette};
pub use regions::{Region, RegionTable, home_position};
pub use simulation::{ForceSimulation, SimNode, SimulationPhase};
pub use state::BrainGraphState;
pub use types::{GraphData, GraphLink, GraphNode, KnowledgeGraph, NodeType};
