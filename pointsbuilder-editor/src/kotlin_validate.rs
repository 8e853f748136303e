//! Kotlin verification.
//!
//! Parses the subset of Kotlin the emitter produces and replays it on a
//! small reference runtime built from the same shape functions the
//! evaluator uses. [`verify_geometry`] and [`verify_commands`] then check
//! that running the emitted program would reproduce what the editor
//! previews.
//!
//! The subset:
//!
//! ```text
//! program := "run" "{" ("val" NAME "=" chain)* chain "}" | chain
//! chain   := call ("." call)*
//! call    := NAME "(" [arg ("," arg)*] ")"
//! arg     := [NAME "="] expr
//! expr    := NUMBER ["*" "PI"] | STRING | "true" | "false" | NAME | chain
//! ```

use std::collections::BTreeMap;
use std::f64::consts::PI;
use thiserror::Error;

use pointsbuilder::command::Command;
use pointsbuilder::eval::evaluate;
use pointsbuilder::geometry::{shapes, Geometry};
use pointsbuilder::kotlin::emit_tree;
use pointsbuilder::node::{FourierTerm, NodeKind};
use pointsbuilder::params::ParamValue;
use pointsbuilder::random::RandomSource;
use pointsbuilder::tree::NodeTree;
use pointsbuilder::{DVec3, ParamError};

/// Relative tolerance for replayed numbers. Emitted literals carry six
/// decimals.
const TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("expected a {expected} program, found {found}")]
    WrongProgram { expected: &'static str, found: String },
    #[error("unsupported call .{0}()")]
    UnknownCall(String),
    #[error("bad arguments to {call}: {message}")]
    Arguments { call: String, message: String },
    #[error("undeclared name {0}")]
    Undeclared(String),
    #[error("unknown command {0}")]
    UnknownCommand(String),
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("replayed {found} items, evaluation produced {expected}")]
    CountMismatch { expected: usize, found: usize },
    #[error("point {index} differs: evaluated {expected}, replayed {found}")]
    PointMismatch { index: usize, expected: DVec3, found: DVec3 },
    #[error("command {index} differs: {detail}")]
    CommandMismatch { index: usize, detail: String },
}

// ---------------------------------------------------------------------------
// Syntax
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Name(String),
    Number { value: f64, integer: bool },
    Text(String),
    Open,
    Close,
    OpenBrace,
    CloseBrace,
    Comma,
    Dot,
    Equals,
    Star,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, VerifyError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        let simple = match c {
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            '{' => Some(Token::OpenBrace),
            '}' => Some(Token::CloseBrace),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '=' => Some(Token::Equals),
            '*' => Some(Token::Star),
            _ => None,
        };
        if let Some(token) = simple {
            chars.next();
            tokens.push((start, token));
            continue;
        }

        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '-' {
            let mut text = String::new();
            while let Some(&(_, d)) = chars.peek() {
                let continues = d.is_ascii_digit() || (d == '-' && text.is_empty()) || (d == '.' && !text.contains('.'));
                if !continues {
                    break;
                }
                text.push(d);
                chars.next();
            }
            let value = text.parse::<f64>().map_err(|_| VerifyError::Parse {
                position: start,
                message: format!("bad number {:?}", text),
            })?;
            let integer = !text.contains('.');
            tokens.push((start, Token::Number { value, integer }));
        } else if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some((_, '"')) => break,
                    Some((_, '\\')) => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, escaped)) => text.push(escaped),
                        None => break,
                    },
                    Some((_, other)) => text.push(other),
                    None => {
                        return Err(VerifyError::Parse {
                            position: start,
                            message: "unterminated string".into(),
                        })
                    }
                }
            }
            tokens.push((start, Token::Text(text)));
        } else if c.is_alphabetic() || c == '_' {
            let mut name = String::new();
            while let Some(&(_, d)) = chars.peek() {
                if !(d.is_alphanumeric() || d == '_') {
                    break;
                }
                name.push(d);
                chars.next();
            }
            tokens.push((start, Token::Name(name)));
        } else {
            return Err(VerifyError::Parse {
                position: start,
                message: format!("unexpected character {:?}", c),
            });
        }
    }
    Ok(tokens)
}

/// An argument or literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
    Name(String),
    Chain(Chain),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Arg>,
}

/// A constructor call followed by chained method calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    pub calls: Vec<Call>,
}

impl Chain {
    fn head(&self) -> &str {
        self.calls.first().map(|c| c.name.as_str()).unwrap_or_default()
    }

    fn methods(&self) -> &[Call] {
        self.calls.get(1..).unwrap_or_default()
    }
}

/// A parsed program: hoisted declarations plus the result expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub declarations: BTreeMap<String, Chain>,
    pub body: Chain,
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(_, t)| t)
    }

    fn error(&self, message: impl Into<String>) -> VerifyError {
        let position = self.tokens.get(self.pos).map(|(p, _)| *p).unwrap_or(self.end);
        VerifyError::Parse {
            position,
            message: message.into(),
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), VerifyError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}", token)))
        }
    }

    fn name(&mut self) -> Result<String, VerifyError> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected a name")),
        }
    }

    fn is_name(&self, text: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == text)
    }

    fn program(&mut self) -> Result<Program, VerifyError> {
        let mut declarations = BTreeMap::new();
        let body = if self.is_name("run") && self.peek_at(1) == Some(&Token::OpenBrace) {
            self.pos += 2;
            while self.is_name("val") {
                self.pos += 1;
                let name = self.name()?;
                self.expect(Token::Equals)?;
                declarations.insert(name, self.chain()?);
            }
            let body = self.chain()?;
            self.expect(Token::CloseBrace)?;
            body
        } else {
            self.chain()?
        };
        if self.peek().is_some() {
            return Err(self.error("trailing input"));
        }
        Ok(Program { declarations, body })
    }

    fn chain(&mut self) -> Result<Chain, VerifyError> {
        let mut calls = vec![self.call()?];
        while self.peek() == Some(&Token::Dot) {
            self.pos += 1;
            calls.push(self.call()?);
        }
        Ok(Chain { calls })
    }

    fn call(&mut self) -> Result<Call, VerifyError> {
        let name = self.name()?;
        self.expect(Token::Open)?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::Close) {
            loop {
                args.push(self.arg()?);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(Token::Close)?;
        Ok(Call { name, args })
    }

    fn arg(&mut self) -> Result<Arg, VerifyError> {
        let named = matches!(self.peek(), Some(Token::Name(_))) && self.peek_at(1) == Some(&Token::Equals);
        let name = if named {
            let name = self.name()?;
            self.pos += 1;
            Some(name)
        } else {
            None
        };
        Ok(Arg {
            name,
            value: self.expr()?,
        })
    }

    fn expr(&mut self) -> Result<Expr, VerifyError> {
        match self.peek().cloned() {
            Some(Token::Number { value, integer }) => {
                self.pos += 1;
                if self.peek() == Some(&Token::Star) {
                    self.pos += 1;
                    if !self.is_name("PI") {
                        return Err(self.error("expected PI"));
                    }
                    self.pos += 1;
                    Ok(Expr::Number(value * PI))
                } else if integer {
                    Ok(Expr::Integer(value as i64))
                } else {
                    Ok(Expr::Number(value))
                }
            }
            Some(Token::Text(text)) => {
                self.pos += 1;
                Ok(Expr::Text(text))
            }
            Some(Token::Name(name)) => {
                if self.peek_at(1) == Some(&Token::Open) {
                    return Ok(Expr::Chain(self.chain()?));
                }
                self.pos += 1;
                Ok(match name.as_str() {
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    _ => Expr::Name(name),
                })
            }
            _ => Err(self.error("expected a value")),
        }
    }
}

/// Parse an emitted program.
pub fn parse(source: &str) -> Result<Program, VerifyError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    parser.program()
}

// ---------------------------------------------------------------------------
// Reference runtime
// ---------------------------------------------------------------------------

/// Positional reader over one call's arguments.
struct Args<'a> {
    call: &'a Call,
    next: usize,
}

impl<'a> Args<'a> {
    fn new(call: &'a Call) -> Self {
        Self { call, next: 0 }
    }

    fn error(&self, message: impl Into<String>) -> VerifyError {
        VerifyError::Arguments {
            call: self.call.name.clone(),
            message: message.into(),
        }
    }

    fn take(&mut self) -> Result<&'a Expr, VerifyError> {
        let arg = self
            .call
            .args
            .get(self.next)
            .ok_or_else(|| self.error(format!("missing argument {}", self.next + 1)))?;
        self.next += 1;
        Ok(&arg.value)
    }

    fn number(&mut self) -> Result<f64, VerifyError> {
        match self.take()? {
            Expr::Number(v) => Ok(*v),
            Expr::Integer(v) => Ok(*v as f64),
            other => Err(self.error(format!("expected a number, found {:?}", other))),
        }
    }

    fn int(&mut self) -> Result<i32, VerifyError> {
        match self.take()? {
            Expr::Integer(v) => i32::try_from(*v).map_err(|_| self.error("integer out of range")),
            other => Err(self.error(format!("expected an integer, found {:?}", other))),
        }
    }

    /// A `c*PI` angle, returned in degrees.
    fn degrees(&mut self) -> Result<f64, VerifyError> {
        Ok(self.number()?.to_degrees())
    }

    fn vector(&mut self, constructor: &str) -> Result<DVec3, VerifyError> {
        match self.take()? {
            Expr::Chain(chain) if chain.calls.len() == 1 && chain.head() == constructor => vector_of(&chain.calls[0]),
            other => Err(self.error(format!("expected {}(..), found {:?}", constructor, other))),
        }
    }

    fn location(&mut self) -> Result<DVec3, VerifyError> {
        self.vector("RelativeLocation")
    }

    fn components(&mut self) -> Result<DVec3, VerifyError> {
        Ok(DVec3::new(self.number()?, self.number()?, self.number()?))
    }

    fn chain(&mut self) -> Result<&'a Chain, VerifyError> {
        match self.take()? {
            Expr::Chain(chain) => Ok(chain),
            other => Err(self.error(format!("expected a builder, found {:?}", other))),
        }
    }

    fn name(&mut self) -> Result<&'a str, VerifyError> {
        match self.take()? {
            Expr::Name(name) => Ok(name),
            other => Err(self.error(format!("expected a name, found {:?}", other))),
        }
    }

    /// Trailing `SeededRandom(s)`, if present.
    fn rng(&mut self) -> Result<RandomSource, VerifyError> {
        if self.next >= self.call.args.len() {
            return Ok(RandomSource::new(None));
        }
        match self.take()? {
            Expr::Chain(chain) if chain.calls.len() == 1 && chain.head() == "SeededRandom" => {
                let mut seed = Args::new(&chain.calls[0]);
                let Expr::Integer(value) = seed.take()? else {
                    return Err(seed.error("expected an integer seed"));
                };
                let value = *value;
                seed.finish()?;
                Ok(RandomSource::new(Some(value)))
            }
            other => Err(self.error(format!("expected SeededRandom(..), found {:?}", other))),
        }
    }

    fn finish(&self) -> Result<(), VerifyError> {
        if self.next == self.call.args.len() {
            Ok(())
        } else {
            Err(self.error(format!("expected {} arguments, found {}", self.next, self.call.args.len())))
        }
    }
}

fn vector_of(call: &Call) -> Result<DVec3, VerifyError> {
    let mut args = Args::new(call);
    let v = args.components()?;
    args.finish()?;
    Ok(v)
}

/// Replays geometry programs.
struct Builder<'a> {
    declarations: &'a BTreeMap<String, Chain>,
}

impl Builder<'_> {
    fn fourier(&self, name: &str) -> Result<Vec<FourierTerm>, VerifyError> {
        let chain = self
            .declarations
            .get(name)
            .ok_or_else(|| VerifyError::Undeclared(name.to_string()))?;
        if chain.head() != "FourierSeries" {
            return Err(VerifyError::WrongProgram {
                expected: "FourierSeries",
                found: chain.head().to_string(),
            });
        }
        chain
            .methods()
            .iter()
            .map(|call| {
                if call.name != "term" {
                    return Err(VerifyError::UnknownCall(call.name.clone()));
                }
                let mut args = Args::new(call);
                let term = FourierTerm {
                    r: args.number()?,
                    w: args.number()?,
                    start_angle: args.degrees()?,
                };
                args.finish()?;
                Ok(term)
            })
            .collect()
    }

    fn run(&self, chain: &Chain) -> Result<Vec<DVec3>, VerifyError> {
        if chain.head() != "PointsBuilder" {
            return Err(VerifyError::WrongProgram {
                expected: "PointsBuilder",
                found: chain.head().to_string(),
            });
        }
        let mut points: Vec<DVec3> = Vec::new();
        let mut axis = DVec3::Y;

        for call in chain.methods() {
            let mut args = Args::new(call);
            match call.name.as_str() {
                "axis" => axis = args.location()?,
                "scale" => shapes::scale(&mut points, args.number()?),
                "rotateAsAxis" => {
                    let degrees = args.degrees()?;
                    let about = if call.args.len() > 1 { args.location()? } else { axis };
                    shapes::rotate_as_axis(&mut points, about, degrees);
                }
                "rotateTo" => {
                    if let Some(new_axis) = shapes::rotate_to(&mut points, axis, args.location()?) {
                        axis = new_axis;
                    }
                }
                "addPoint" => points.push(args.location()?),
                "addLine" => points.extend(shapes::line(args.location()?, args.location()?, args.int()?)),
                "addCircle" => points.extend(shapes::circle(args.number()?, args.int()?)),
                "addDiscreteCircleXZ" => {
                    let (radius, count, discrete) = (args.number()?, args.int()?, args.number()?);
                    let mut rng = args.rng()?;
                    points.extend(shapes::discrete_circle(radius, count, discrete, &mut rng));
                }
                "addArc" => points.extend(shapes::arc(args.number()?, args.degrees()?, args.degrees()?, args.int()?)),
                "addBall" => points.extend(shapes::ball(args.number()?, args.int()?)),
                "addBezierCurve" => points.extend(shapes::bezier(
                    args.location()?,
                    args.location()?,
                    args.location()?,
                    args.location()?,
                    args.int()?,
                )),
                "addPolygonInCircle" => {
                    points.extend(shapes::polygon_in_circle(args.int()?, args.int()?, args.number()?))
                }
                "addRoundShape" => points.extend(shapes::round_shape(
                    args.number()?,
                    args.number()?,
                    args.int()?,
                    args.int()?,
                )),
                "addSpiral" => points.extend(shapes::spiral(
                    args.number()?,
                    args.number()?,
                    args.number()?,
                    args.int()?,
                    args.number()?,
                )),
                "addCube" => points.extend(shapes::cube(args.number()?, args.int()?)),
                "addRect" => points.extend(shapes::rect(args.number()?, args.number()?, args.int()?, args.int()?)),
                "addLightningPoints" => {
                    let (start, end, count, offset) = (args.location()?, args.location()?, args.int()?, args.number()?);
                    let mut rng = args.rng()?;
                    points.extend(shapes::lightning_points(start, end, count, offset, &mut rng));
                }
                "addLightningNodesAttenuation" => {
                    let (start, end) = (args.location()?, args.location()?);
                    let (nodes, max_offset, attenuation, lines) =
                        (args.int()?, args.number()?, args.number()?, args.int()?);
                    let mut rng = args.rng()?;
                    points.extend(shapes::lightning_nodes_attenuation(
                        start,
                        end,
                        nodes,
                        max_offset,
                        attenuation,
                        lines,
                        &mut rng,
                    ));
                }
                "addFourierSeries" => {
                    let terms = self.fourier(args.name()?)?;
                    points.extend(shapes::fourier_series(&terms, args.int()?, args.number()?));
                }
                "applyNoiseOffset" => {
                    let noise = args.components()?;
                    let mut rng = args.rng()?;
                    shapes::noise_offset(&mut points, noise, &mut rng);
                }
                "pointsOnEachOffset" => shapes::offset(&mut points, args.components()?),
                "applyRandomOffset" => {
                    let (min, max) = (args.number()?, args.number()?);
                    let mut rng = args.rng()?;
                    shapes::random_offset(&mut points, min, max, &mut rng);
                }
                "applySpiralOffset" => {
                    shapes::spiral_offset(&mut points, axis, args.number()?, args.degrees()?)
                }
                "addBuilder" => points.extend(self.run(args.chain()?)?),
                "addWith" => {
                    let (repeat, start) = (args.int()?, args.degrees()?);
                    let child = self.run(args.chain()?)?;
                    points.extend(shapes::repeat_rotated(&child, axis, repeat, start));
                }
                other => return Err(VerifyError::UnknownCall(other.to_string())),
            }
            args.finish()?;
        }
        Ok(points)
    }
}

/// Replay a geometry program, returning the points it would produce.
pub fn replay_points(program: &Program) -> Result<Vec<DVec3>, VerifyError> {
    Builder {
        declarations: &program.declarations,
    }
    .run(&program.body)
}

fn param_of(expr: &Expr) -> Result<ParamValue, VerifyError> {
    Ok(match expr {
        Expr::Number(v) => ParamValue::Number(*v),
        Expr::Integer(v) => ParamValue::Integer(*v),
        Expr::Bool(v) => ParamValue::Bool(*v),
        Expr::Text(v) => ParamValue::Text(v.clone()),
        Expr::Chain(chain) if chain.calls.len() == 1 && chain.head() == "Vec3" => {
            ParamValue::Vec3(vector_of(&chain.calls[0])?.to_array())
        }
        other => {
            return Err(VerifyError::Arguments {
                call: "add".into(),
                message: format!("unsupported value {:?}", other),
            })
        }
    })
}

/// Replay a command program, returning the commands it would queue.
pub fn replay_commands(program: &Program) -> Result<Vec<Command>, VerifyError> {
    let chain = &program.body;
    if chain.head() != "ParticleCommandQueue" {
        return Err(VerifyError::WrongProgram {
            expected: "ParticleCommandQueue",
            found: chain.head().to_string(),
        });
    }
    chain
        .methods()
        .iter()
        .map(|call| {
            if call.name != "add" {
                return Err(VerifyError::UnknownCall(call.name.clone()));
            }
            let mut args = Args::new(call);
            let inner = args.chain()?;
            args.finish()?;
            let [constructor] = inner.calls.as_slice() else {
                return Err(args.error("expected a single command constructor"));
            };
            let mut command =
                Command::from_name(&constructor.name).ok_or_else(|| VerifyError::UnknownCommand(constructor.name.clone()))?;
            for arg in &constructor.args {
                let key = arg.name.as_deref().ok_or_else(|| VerifyError::Arguments {
                    call: constructor.name.clone(),
                    message: "command arguments must be named".into(),
                })?;
                command.set_param(key, &param_of(&arg.value)?)?;
            }
            Ok(command)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Outcome of a successful verification.
#[derive(Clone, Debug, PartialEq)]
pub struct Verification {
    pub program: String,
    /// Points or commands compared.
    pub items: usize,
    /// Whether values were compared, not just counts. Unseeded random
    /// nodes make values differ between runs.
    pub values_compared: bool,
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * (1.0 + a.abs().max(b.abs()))
}

fn close_vec(a: DVec3, b: DVec3) -> bool {
    close(a.x, b.x) && close(a.y, b.y) && close(a.z, b.z)
}

/// Emit a geometry tree, replay the program and compare with evaluation.
pub fn verify_geometry(tree: &NodeTree<Geometry>) -> Result<Verification, VerifyError> {
    let expected = evaluate(tree.roots(), DVec3::Y).points;
    let program = emit_tree(tree);
    let found = replay_points(&parse(&program)?)?;

    if expected.len() != found.len() {
        return Err(VerifyError::CountMismatch {
            expected: expected.len(),
            found: found.len(),
        });
    }
    let values_compared = !tree.iter().any(|node| node.enabled && node.kind.is_unseeded_random());
    if values_compared {
        for (index, (a, b)) in expected.iter().zip(&found).enumerate() {
            if !close_vec(*a, *b) {
                return Err(VerifyError::PointMismatch {
                    index,
                    expected: *a,
                    found: *b,
                });
            }
        }
    }
    log::debug!("verified {} points", expected.len());
    Ok(Verification {
        program,
        items: expected.len(),
        values_compared,
    })
}

fn params_match(a: &ParamValue, b: &ParamValue) -> bool {
    match (a.as_vec3(), b.as_vec3()) {
        (Some(a), Some(b)) => close_vec(a, b),
        _ => match (a, b) {
            (ParamValue::Number(_) | ParamValue::Integer(_), ParamValue::Number(_) | ParamValue::Integer(_)) => {
                matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if close(x, y))
            }
            _ => a == b,
        },
    }
}

/// Emit a command tree, replay the program and compare with the enabled
/// commands.
pub fn verify_commands(tree: &NodeTree<Command>) -> Result<Verification, VerifyError> {
    let expected: Vec<&Command> = tree.roots().filter(|n| n.enabled).map(|n| &n.node().kind).collect();
    let program = emit_tree(tree);
    let found = replay_commands(&parse(&program)?)?;

    if expected.len() != found.len() {
        return Err(VerifyError::CountMismatch {
            expected: expected.len(),
            found: found.len(),
        });
    }
    for (index, (a, b)) in expected.iter().zip(&found).enumerate() {
        if a.name() != b.name() {
            return Err(VerifyError::CommandMismatch {
                index,
                detail: format!("{} replayed as {}", a.name(), b.name()),
            });
        }
        for (key, value) in a.params() {
            let replayed = b.param(&key);
            if !replayed.as_ref().is_some_and(|r| params_match(&value, r)) {
                return Err(VerifyError::CommandMismatch {
                    index,
                    detail: format!("{} = {:?} replayed as {:?}", key, value, replayed),
                });
            }
        }
    }
    Ok(Verification {
        program,
        items: found.len(),
        values_compared: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsbuilder::command::*;
    use pointsbuilder::geometry::*;

    #[test]
    fn test_parse_nested_and_declarations() {
        let program = parse(
            "run {\n    val fourier1 = FourierSeries()\n        .term(1.0, 2.0, 0.5*PI)\n    PointsBuilder()\n        .addFourierSeries(fourier1, 8, 1.0)\n        .addBuilder(\n            PointsBuilder()\n                .addPoint(RelativeLocation(-1.5, 0.0, 2.0))\n        )\n}",
        )
        .unwrap();
        assert_eq!(program.declarations.len(), 1);
        assert_eq!(program.body.calls.len(), 3);
        let points = replay_points(&program).unwrap();
        assert_eq!(points.len(), 9);
        assert_eq!(points[8], DVec3::new(-1.5, 0.0, 2.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("PointsBuilder("), Err(VerifyError::Parse { .. })));
        assert!(matches!(parse("PointsBuilder() #"), Err(VerifyError::Parse { position: 16, .. })));
        let program = parse("PointsBuilder().explode(1)").unwrap();
        assert!(matches!(replay_points(&program), Err(VerifyError::UnknownCall(_))));
    }

    #[test]
    fn test_every_geometry_kind_verifies() {
        let mut tree = NodeTree::new();
        for name in Geometry::CATALOG {
            let kind = Geometry::from_name(name).unwrap();
            let container = kind.is_container();
            let id = tree.push(kind);
            if container {
                tree.append(Some(id), Geometry::AddCircle(AddCircle::default())).unwrap();
            }
        }
        for id in tree.root_ids().to_vec() {
            // Seed the random kinds so values are comparable.
            let _ = tree.set_param(id, "seedEnabled", &true.into());
        }
        let report = verify_geometry(&tree).unwrap();
        assert!(report.values_compared);
        assert!(report.items > 0);
    }

    #[test]
    fn test_each_geometry_kind_verifies_after_a_ball() {
        for name in Geometry::CATALOG {
            let mut tree = NodeTree::new();
            tree.push(Geometry::AddBall(AddBall::default()));
            tree.push(Geometry::AddCircle(AddCircle::default()));
            let kind = Geometry::from_name(name).unwrap();
            let container = kind.is_container();
            let id = tree.push(kind);
            if container {
                tree.append(Some(id), Geometry::AddCircle(AddCircle::default())).unwrap();
            }
            let _ = tree.set_param(id, "seedEnabled", &true.into());

            let report = verify_geometry(&tree).unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(report.values_compared, "{name}");
        }
    }

    #[test]
    fn test_spiral_offset_verifies_over_many_points() {
        let mut tree = NodeTree::new();
        tree.push(Geometry::AddLine(AddLine {
            start: DVec3::ZERO,
            end: DVec3::new(0.0, 6.0, 0.0),
            count: 800,
        }));
        for angle_step in [10.0, 7.0, 1.0 / 3.0] {
            let id = tree.push(Geometry::ApplySpiralOffset(ApplySpiralOffset {
                radius: 0.2,
                angle_step,
            }));
            verify_geometry(&tree).unwrap_or_else(|e| panic!("{angle_step}: {e}"));
            tree.remove(id).unwrap();
        }
    }

    #[test]
    fn test_unseeded_compares_counts_only() {
        let mut tree = NodeTree::new();
        tree.push(Geometry::AddCircle(AddCircle::default()));
        tree.push(Geometry::ApplyRandomOffset(ApplyRandomOffset::default()));
        let report = verify_geometry(&tree).unwrap();
        assert!(!report.values_compared);
    }

    #[test]
    fn test_commands_verify() {
        let mut tree = NodeTree::new();
        for name in Command::CATALOG {
            tree.push(Command::from_name(name).unwrap());
        }
        tree.push(Command::FlowField(ParticleFlowField {
            pattern: FlowPattern::Swirl,
            amplitude: 1.0 / 3.0,
            ..Default::default()
        }));
        let report = verify_commands(&tree).unwrap();
        assert_eq!(report.items, 9);
    }

    #[test]
    fn test_replay_rejects_unknown_command() {
        let program = parse("ParticleCommandQueue()\n    .add(ParticleTeleportCommand(range = 1.0))").unwrap();
        assert!(matches!(replay_commands(&program), Err(VerifyError::UnknownCommand(_))));
    }
}
