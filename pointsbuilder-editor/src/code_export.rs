//! Code export: wraps the emitted program in a complete Kotlin source file.

use pointsbuilder::kotlin::emit_tree;
use pointsbuilder::tree::NodeTree;

use crate::project::{Tool, ToolKind};

/// Options for [`generate_code`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportOptions {
    /// `package` line; omitted when `None`.
    pub package: Option<String>,
    /// Package of the particle runtime, imported with a wildcard.
    pub runtime_package: Option<String>,
    /// Name of the generated function. Defaults per tool.
    pub function_name: Option<String>,
}

fn return_type(tool: Tool) -> &'static str {
    match tool {
        Tool::PointsBuilder => "PointsBuilder",
        Tool::ParticleEmitter => "ParticleCommandQueue",
    }
}

fn default_function(tool: Tool) -> &'static str {
    match tool {
        Tool::PointsBuilder => "buildPoints",
        Tool::ParticleEmitter => "buildCommands",
    }
}

/// Generate a Kotlin file whose single function returns the tree's program.
pub fn generate_code<K: ToolKind>(tree: &NodeTree<K>, options: &ExportOptions) -> String {
    let program = emit_tree(tree);
    let mut code = String::new();

    // Header
    if let Some(package) = &options.package {
        code.push_str(&format!("package {}\n\n", package));
    }
    let mut imports = Vec::new();
    if let Some(runtime) = &options.runtime_package {
        imports.push(format!("import {}.*", runtime));
    }
    if program.contains("*PI") {
        imports.push("import kotlin.math.PI".to_string());
    }
    if !imports.is_empty() {
        code.push_str(&imports.join("\n"));
        code.push_str("\n\n");
    }

    let name = options
        .function_name
        .as_deref()
        .unwrap_or_else(|| default_function(K::TOOL));
    code.push_str(&format!("fun {}(): {} {{\n", name, return_type(K::TOOL)));

    // Body
    for (i, line) in program.lines().enumerate() {
        let prefix = if i == 0 { "return " } else { "" };
        code.push_str(&format!("    {}{}\n", prefix, line));
    }
    code.push_str("}\n");

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsbuilder::command::{Command, ParticleGravity};
    use pointsbuilder::geometry::{AddArc, Geometry};

    #[test]
    fn test_geometry_file() {
        let mut tree = NodeTree::new();
        tree.push(Geometry::AddArc(AddArc::default()));
        let options = ExportOptions {
            package: Some("demo.shapes".into()),
            ..Default::default()
        };
        let code = generate_code(&tree, &options);
        assert!(code.starts_with("package demo.shapes\n\nimport kotlin.math.PI\n\nfun buildPoints(): PointsBuilder {\n"));
        assert!(code.contains("    return PointsBuilder()\n        .addArc("));
        assert!(code.ends_with("}\n"));
    }

    #[test]
    fn test_command_file() {
        let mut tree = NodeTree::new();
        tree.push(Command::Gravity(ParticleGravity::default()));
        let options = ExportOptions {
            runtime_package: Some("demo.particles".into()),
            function_name: Some("fall".into()),
            ..Default::default()
        };
        let code = generate_code(&tree, &options);
        assert!(code.starts_with("import demo.particles.*\n\nfun fall(): ParticleCommandQueue {\n"));
        assert!(!code.contains("kotlin.math.PI"));
    }
}
