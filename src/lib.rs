//! # PointsBuilder
//!
//! Node-tree evaluation and Kotlin code emission for two authoring tools:
//!
//! - the **PointsBuilder** geometry tool, whose nodes generate and transform
//!   a running list of 3D points around a current axis, and
//! - the **particle emitter** tool, whose nodes are velocity forces applied
//!   to every live particle once per simulation tick.
//!
//! Every node can be interpreted in two ways: evaluated right now, or
//! emitted as a chained Kotlin call that performs the same computation in
//! the target runtime. The two paths are meant to agree numerically.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pointsbuilder::prelude::*;
//!
//! let mut tree = NodeTree::<Geometry>::new();
//! tree.push(Geometry::Axis(Axis { axis: DVec3::Y }));
//! tree.push(Geometry::AddLine(AddLine {
//!     start: DVec3::ZERO,
//!     end: DVec3::new(3.0, 0.0, 3.0),
//!     count: 30,
//! }));
//! tree.push(Geometry::Scale(Scale { factor: 2.0 }));
//!
//! let result = evaluate(tree.roots(), DVec3::Y);
//! assert_eq!(result.points.len(), 31);
//!
//! println!("{}", emit(tree.roots()));
//! ```
//!
//! ## Core Concepts
//!
//! ### Nodes and kinds
//!
//! A [`NodeTree`] is an ordered forest of [`Node`]s addressed by stable
//! [`NodeId`]s. Each node's kind is a variant of a closed enum carrying a
//! typed parameter struct: [`Geometry`] for the geometry tool and
//! [`Command`] for the particle tool. Container kinds (`with_builder`,
//! `add_with`) own a child list; `add_fourier_series` owns a term list.
//!
//! ### Evaluation
//!
//! [`evaluate`] walks a node list left to right, threading a point list and
//! a current axis. Disabled nodes are skipped. Degenerate input never
//! produces `NaN`; the affected node simply has no effect.
//!
//! ### Emission
//!
//! [`emit`] produces the matching Kotlin expression. See [`kotlin`] for the
//! number formatting rules.
//!
//! ### Simulation
//!
//! [`Simulation`] runs the particle tool: a fixed-timestep loop spawning
//! particles from an [`EmitterShape`], applying every enabled [`Command`],
//! integrating positions and retiring particles at the end of their life.
//!
//! ## Feature Overview
//!
//! | Category | Kinds |
//! |----------|-------|
//! | Axis and transforms | `axis`, `scale`, `rotate_as_axis`, `rotate_to` |
//! | Generators | `add_point`, `add_line`, `add_circle`, `add_ball`, `add_fourier_series`, ... |
//! | Modifiers | `apply_noise_offset`, `points_on_each_offset`, `apply_random_offset`, `apply_spiral_offset` |
//! | Containers | `with_builder`, `add_with` |
//! | Particle forces | Noise, Drag, FlowField, Attraction, Orbit, Vortex, RotationForce, Gravity |

extern crate self as pointsbuilder;

/// Declares a closed node-kind enum and its catalog plumbing.
///
/// Each entry names a variant, its parameter struct, the kind name stored
/// in project files, a display title and a one-line description.
macro_rules! node_kinds {
    (
        $(#[$meta:meta])*
        pub enum $kind:ident {
            $($variant:ident($params:ident) => ($name:literal, $title:literal, $description:literal),)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub enum $kind {
            $($variant($params),)*
        }

        impl $kind {
            const NAMES: &'static [&'static str] = &[$($name),*];

            fn kind_name(&self) -> &'static str {
                match self {
                    $($kind::$variant(_) => $name,)*
                }
            }

            fn kind_title(&self) -> &'static str {
                match self {
                    $($kind::$variant(_) => $title,)*
                }
            }

            fn kind_description(&self) -> &'static str {
                match self {
                    $($kind::$variant(_) => $description,)*
                }
            }

            fn kind_from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some($kind::$variant(<$params>::default())),)*
                    _ => None,
                }
            }

            fn kind_fields(&self) -> &'static [$crate::params::ParamField] {
                match self {
                    $($kind::$variant(_) => <$params as $crate::params::NodeParams>::FIELDS,)*
                }
            }

            fn kind_param(&self, key: &str) -> Option<$crate::params::ParamValue> {
                match self {
                    $($kind::$variant(p) => $crate::params::NodeParams::get(p, key),)*
                }
            }

            fn kind_set_param(
                &mut self,
                key: &str,
                value: &$crate::params::ParamValue,
            ) -> Result<(), $crate::error::ParamError> {
                match self {
                    $($kind::$variant(p) => $crate::params::NodeParams::set(p, key, value),)*
                }
            }
        }
    };
}

pub mod command;
pub mod error;
pub mod eval;
pub mod geometry;
pub mod kotlin;
pub mod math;
pub mod node;
pub mod noise;
pub mod params;
pub mod particle;
pub mod random;
pub mod simulation;
pub mod spawn;
pub mod time;
pub mod tree;

pub use bytemuck;
pub use command::Command;
pub use error::{ParamError, TreeError};
pub use eval::{evaluate, Evaluation};
pub use geometry::{BuilderState, Geometry};
pub use glam::DVec3;
pub use kotlin::{emit, format_double, KotlinWriter};
pub use math::Bounds;
pub use node::{FourierTerm, IdGenerator, Node, NodeId, NodeKind};
pub use params::{NodeParams, ParamEnum, ParamKind, ParamMap, ParamValue};
pub use particle::{Particle, RenderVertex};
pub use pointsbuilder_derive::{NodeParams, ParamEnum};
pub use simulation::{Simulation, SimulationConfig};
pub use spawn::{EmitterShape, InitialVelocity};
pub use time::TickClock;
pub use tree::{NodeTree, NodeView, Nodes};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use pointsbuilder::prelude::*;
/// ```
pub mod prelude {
    pub use crate::command::params::*;
    pub use crate::command::{falloff, Command, CommandContext};
    pub use crate::eval::{evaluate, Evaluation};
    pub use crate::geometry::params::*;
    pub use crate::geometry::{BuilderState, Geometry};
    pub use crate::kotlin::{emit, emit_tree};
    pub use crate::math::Bounds;
    pub use crate::node::{FourierTerm, NodeId, NodeKind};
    pub use crate::params::{NodeParams, ParamEnum, ParamValue};
    pub use crate::particle::Particle;
    pub use crate::simulation::{Simulation, SimulationConfig};
    pub use crate::spawn::{EmitterShape, InitialVelocity};
    pub use crate::tree::NodeTree;
    pub use crate::DVec3;
    pub use pointsbuilder_derive::{NodeParams, ParamEnum};
}
