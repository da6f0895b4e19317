use std::collections::HashMap;

use serde::Deserialize;

use super::types::NodeType;

/// Physics constants, in pixels and per-iteration units.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	pub link_distance: f64,
	pub link_strength: f64,
	/// Repulsion constant; positive values push nodes apart.
	pub charge_strength: f64,
	/// Pairs further apart than this do not repel.
	pub charge_max_distance: f64,
	/// Distances below this are treated as this when computing repulsion.
	pub charge_min_distance: f64,
	pub collision_padding: f64,
	pub collision_strength: f64,
	pub home_x_strength: f64,
	pub home_y_strength: f64,
	/// Fraction of velocity lost per iteration.
	pub velocity_decay: f64,
	/// Per-iteration speed limit applied before integration.
	pub max_velocity: f64,
	pub alpha_decay: f64,
	pub alpha_min: f64,
	/// Energy the simulation is held at while a node is dragged.
	pub reheat_alpha: f64,
	/// Above this many nodes repulsion candidates come from an R-tree.
	pub spatial_index_threshold: usize,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			link_distance: 60.0,
			link_strength: 0.3,
			charge_strength: 120.0,
			charge_max_distance: 250.0,
			charge_min_distance: 4.0,
			collision_padding: 4.0,
			collision_strength: 0.7,
			home_x_strength: 0.08,
			home_y_strength: 0.08,
			velocity_decay: 0.4,
			max_velocity: 40.0,
			// 1 - 0.001^(1/300): about 300 iterations from a cold start.
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			reheat_alpha: 0.3,
			spatial_index_threshold: 200,
		}
	}
}

/// Display radius multipliers by hop distance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadiusConfig {
	pub focus: f64,
	pub hop_one: f64,
	pub hop_two: f64,
	pub overview: f64,
}

impl Default for RadiusConfig {
	fn default() -> Self {
		Self {
			focus: 1.8,
			hop_one: 1.0,
			hop_two: 0.7,
			overview: 1.0,
		}
	}
}

impl RadiusConfig {
	pub fn effective_radius(&self, base: f64, hop_distance: Option<u8>) -> f64 {
		let scale = match hop_distance {
			None => self.overview,
			Some(0) => self.focus,
			Some(1) => self.hop_one,
			Some(_) => self.hop_two,
		};
		base * scale
	}
}

/// Random offset applied to initial positions. A fixed seed keeps layouts
/// reproducible; an amplitude of zero turns jitter off.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
	pub amplitude: f64,
	pub seed: u64,
}

impl Default for JitterConfig {
	fn default() -> Self {
		Self {
			amplitude: 8.0,
			seed: 0x5eed,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub forces: ForceConfig,
	pub radii: RadiusConfig,
	pub jitter: JitterConfig,
	/// Per-type limits on second-hop admissions.
	pub fan_out_caps: HashMap<NodeType, usize>,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			forces: ForceConfig::default(),
			radii: RadiusConfig::default(),
			jitter: JitterConfig::default(),
			fan_out_caps: HashMap::from([(NodeType::MetaTag, 5)]),
		}
	}
}
