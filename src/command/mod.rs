//! The particle emitter tool's command kinds.
//!
//! Commands are velocity forces. Each tick the simulation applies every
//! enabled command, in list order, to every live particle. The emitted
//! program builds the same list as a `ParticleCommandQueue`.

pub mod forces;
pub mod params;

pub use forces::falloff;
pub use params::*;

use crate::error::ParamError;
use crate::kotlin::{format_double, format_int, format_string, vec3, KotlinWriter};
use crate::node::NodeKind;
use crate::params::{ParamField, ParamValue};
use crate::particle::Particle;
use crate::tree::NodeView;

/// What a command sees while it runs: one particle and the clock.
pub struct CommandContext<'a> {
    pub particle: &'a mut Particle,
    /// Simulation time in seconds.
    pub time: f64,
}

node_kinds! {
    /// A particle command kind with its parameters.
    pub enum Command {
        Noise(ParticleNoise) => ("ParticleNoiseCommand", "Noise", "Push particles along a scrolling value-noise field"),
        Drag(ParticleDrag) => ("ParticleDragCommand", "Drag", "Damp velocity exponentially with an optional linear floor"),
        FlowField(ParticleFlowField) => ("ParticleFlowFieldCommand", "Flow Field", "Push particles along an analytic time-varying field"),
        Attraction(ParticleAttraction) => ("ParticleAttractionCommand", "Attraction", "Pull particles toward a target"),
        Orbit(ParticleOrbit) => ("ParticleOrbitCommand", "Orbit", "Hold particles at a radius around an axis while circling it"),
        Vortex(ParticleVortex) => ("ParticleVortexCommand", "Vortex", "Swirl particles around an axis with pull and lift"),
        RotationForce(ParticleRotationForce) => ("ParticleRotationForceCommand", "Rotation Force", "Spin particles around an axis"),
        Gravity(ParticleGravity) => ("ParticleGravityCommand", "Gravity", "Constant downward acceleration with damping"),
    }
}

impl Command {
    /// Apply this command to one particle for one tick.
    pub fn apply_to(&self, particle: &mut Particle, time: f64) {
        match self {
            Command::Noise(c) => c.apply(particle, time),
            Command::Drag(c) => c.apply(particle),
            Command::FlowField(c) => c.apply(particle, time),
            Command::Attraction(c) => c.apply(particle),
            Command::Orbit(c) => c.apply(particle),
            Command::Vortex(c) => c.apply(particle),
            Command::RotationForce(c) => c.apply(particle),
            Command::Gravity(c) => c.apply(particle),
        }
    }
}

/// Kotlin literal for a parameter value.
pub fn format_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(v) => v.to_string(),
        ParamValue::Integer(v) => format_int(*v),
        ParamValue::Number(v) => format_double(*v),
        ParamValue::Text(v) => format_string(v),
        ParamValue::Vec3(v) => vec3(glam::DVec3::from_array(*v)),
    }
}

impl NodeKind for Command {
    type Context<'a> = CommandContext<'a>;

    const PROGRAM: &'static str = "ParticleCommandQueue()";
    const CATALOG: &'static [&'static str] = Self::NAMES;

    fn name(&self) -> &'static str {
        self.kind_name()
    }

    fn title(&self) -> &'static str {
        self.kind_title()
    }

    fn description(&self) -> &'static str {
        self.kind_description()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::kind_from_name(name)
    }

    fn fields(&self) -> &'static [ParamField] {
        self.kind_fields()
    }

    fn param(&self, key: &str) -> Option<ParamValue> {
        self.kind_param(key)
    }

    fn set_param(&mut self, key: &str, value: &ParamValue) -> Result<(), ParamError> {
        self.kind_set_param(key, value)
    }

    fn apply(node: NodeView<'_, Self>, ctx: &mut CommandContext<'_>) {
        node.kind.apply_to(ctx.particle, ctx.time);
    }

    /// `.add(ParticleXCommand(name = value, ...))` with every parameter named.
    fn kotlin(node: NodeView<'_, Self>, out: &mut KotlinWriter) {
        let kind = &node.kind;
        let args: Vec<String> = kind
            .fields()
            .iter()
            .filter_map(|field| {
                kind.param(field.key)
                    .map(|value| format!("{} = {}", field.key, format_value(&value)))
            })
            .collect();
        out.call(format!(".add({}({}))", kind.name(), args.join(", ")));
    }
}
