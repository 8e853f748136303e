//! Kotlin program emission.
//!
//! [`emit`] turns a node list into a single Kotlin expression: the tool's
//! constructor call followed by one chained call per enabled node, each on
//! its own line. Containers nest a sub-program with deeper indentation.
//! When a node needs a local declaration, the declaration is hoisted above
//! the expression and the whole program is wrapped in `run { ... }`.
//!
//! ```text
//! PointsBuilder()
//!     .axis(RelativeLocation(0.0, 1.0, 0.0))
//!     .addLine(RelativeLocation(0.0, 0.0, 0.0), RelativeLocation(3.0, 0.0, 3.0), 30)
//!     .scale(2.0)
//! ```

use glam::DVec3;

use crate::node::NodeKind;
use crate::tree::{NodeTree, Nodes};

const INDENT: &str = "    ";

/// Format a `Double` literal.
///
/// At most six digits after the decimal point, trailing zeros trimmed, at
/// least one fractional digit, and no negative zero. Non-finite values
/// become `0.0`.
pub fn format_double(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".to_string();
    }
    let mut text = format!("{:.6}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.push('0');
    }
    if text == "-0.0" {
        text = "0.0".to_string();
    }
    text
}

/// Format a degree value as a multiple of `PI`.
pub fn format_angle(degrees: f64) -> String {
    format!("{}*PI", format_double(degrees / 180.0))
}

/// The degree value an emitted [`format_angle`] literal denotes.
///
/// Evaluation rotates by this value rather than by `degrees` itself, so an
/// angle multiplied by a point index does not drift away from the program.
pub fn emitted_degrees(degrees: f64) -> f64 {
    let coefficient: f64 = format_double(degrees / 180.0).parse().unwrap_or(0.0);
    (coefficient * std::f64::consts::PI).to_degrees()
}

/// Format an `Int` literal.
pub fn format_int(value: i64) -> String {
    value.to_string()
}

/// Format a Kotlin string literal.
pub fn format_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `RelativeLocation(x, y, z)`, the geometry tool's vector type.
pub fn relative_location(v: DVec3) -> String {
    format!(
        "RelativeLocation({}, {}, {})",
        format_double(v.x),
        format_double(v.y),
        format_double(v.z)
    )
}

/// `Vec3(x, y, z)`, the particle tool's vector type.
pub fn vec3(v: DVec3) -> String {
    format!("Vec3({}, {}, {})", format_double(v.x), format_double(v.y), format_double(v.z))
}

/// Three bare components, for calls that take `x, y, z` arguments.
pub fn components(v: DVec3) -> String {
    format!("{}, {}, {}", format_double(v.x), format_double(v.y), format_double(v.z))
}

/// Accumulates the lines of an emitted program.
#[derive(Debug, Default)]
pub struct KotlinWriter {
    preamble: Vec<(usize, String)>,
    body: Vec<(usize, String)>,
    depth: usize,
    declared: usize,
}

impl KotlinWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// One chained call, indented below the current program head.
    pub fn call(&mut self, text: impl Into<String>) {
        self.body.push((self.depth + 1, text.into()));
    }

    /// A line at the level of the current program head.
    fn head(&mut self, text: impl Into<String>) {
        self.body.push((self.depth, text.into()));
    }

    /// Write a nested sub-program for a container's children.
    ///
    /// Call between an opening call line (for example `.addBuilder(`) and a
    /// closing `)` written with [`KotlinWriter::call`].
    pub fn nested<K: NodeKind>(&mut self, nodes: Nodes<'_, K>) {
        let saved = self.depth;
        self.depth += 2;
        self.chain(nodes);
        self.depth = saved;
    }

    fn chain<K: NodeKind>(&mut self, nodes: Nodes<'_, K>) {
        self.head(K::PROGRAM);
        for node in nodes.filter(|node| node.enabled) {
            K::kotlin(node, self);
        }
    }

    /// Hoist a `val` declaration and return its generated name.
    ///
    /// `calls` are chained onto `init`, one per line.
    pub fn declare(&mut self, prefix: &str, init: &str, calls: &[String]) -> String {
        self.declared += 1;
        let name = format!("{}{}", prefix, self.declared);
        self.preamble.push((0, format!("val {} = {}", name, init)));
        for call in calls {
            self.preamble.push((1, call.clone()));
        }
        name
    }

    /// Join everything into the final program text.
    pub fn finish(self) -> String {
        let render = |(depth, text): &(usize, String), extra: usize| {
            format!("{}{}", INDENT.repeat(depth + extra), text)
        };
        if self.preamble.is_empty() {
            return self
                .body
                .iter()
                .map(|line| render(line, 0))
                .collect::<Vec<_>>()
                .join("\n");
        }
        let mut lines = vec!["run {".to_string()];
        lines.extend(self.preamble.iter().map(|line| render(line, 1)));
        lines.extend(self.body.iter().map(|line| render(line, 1)));
        lines.push("}".to_string());
        lines.join("\n")
    }
}

/// Emit the program for a node list.
pub fn emit<K: NodeKind>(nodes: Nodes<'_, K>) -> String {
    let mut out = KotlinWriter::new();
    out.chain(nodes);
    let program = out.finish();
    log::debug!("emitted {} lines of Kotlin", program.lines().count());
    program
}

/// Emit the program for a tree's top-level list.
pub fn emit_tree<K: NodeKind>(tree: &NodeTree<K>) -> String {
    emit(tree.roots())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(2.0), "2.0");
        assert_eq!(format_double(0.1), "0.1");
        assert_eq!(format_double(0.30000000000000004), "0.3");
        assert_eq!(format_double(-0.0), "0.0");
        assert_eq!(format_double(-0.0000001), "0.0");
        assert_eq!(format_double(1.23456789), "1.234568");
        assert_eq!(format_double(-12.5), "-12.5");
        assert_eq!(format_double(1e6), "1000000.0");
        assert_eq!(format_double(f64::NAN), "0.0");
    }

    #[test]
    fn test_format_angle() {
        assert_eq!(format_angle(90.0), "0.5*PI");
        assert_eq!(format_angle(360.0), "2.0*PI");
        assert_eq!(format_angle(0.0), "0.0*PI");
        assert_eq!(format_angle(60.0), "0.333333*PI");
    }

    #[test]
    fn test_emitted_degrees_follow_the_literal() {
        assert_eq!(emitted_degrees(90.0), 90.0);
        assert_eq!(emitted_degrees(0.0), 0.0);
        let ten = emitted_degrees(10.0);
        assert!((ten - 0.055556 * 180.0).abs() < 1e-9);
        assert_ne!(ten, 10.0);
    }

    #[test]
    fn test_format_string_escapes() {
        assert_eq!(format_string("a\"b$"), "\"a\\\"b\\$\"");
    }

    #[test]
    fn test_vectors() {
        assert_eq!(relative_location(DVec3::new(0.0, 1.0, -0.0)), "RelativeLocation(0.0, 1.0, 0.0)");
        assert_eq!(vec3(DVec3::new(1.5, 0.0, 2.0)), "Vec3(1.5, 0.0, 2.0)");
        assert_eq!(components(DVec3::new(1.0, 2.0, 3.0)), "1.0, 2.0, 3.0");
    }

    #[test]
    fn test_writer_wraps_declarations_in_run() {
        let mut out = KotlinWriter::new();
        out.head("PointsBuilder()");
        let name = out.declare("fourier", "FourierSeries()", &[".term(1.0, 1.0, 0.0*PI)".to_string()]);
        out.call(format!(".addFourierSeries({}, 10, 1.0)", name));
        assert_eq!(
            out.finish(),
            "run {\n    val fourier1 = FourierSeries()\n        .term(1.0, 1.0, 0.0*PI)\n    PointsBuilder()\n        .addFourierSeries(fourier1, 10, 1.0)\n}"
        );
    }
}
