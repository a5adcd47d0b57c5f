//! Abstract syntax tree for the branchwood language.
//!
//! Every node here is an immutable value carrying a [`Location`] back into the
//! source it was parsed from. The tree is a closed, tagged-union family (no
//! open polymorphism): declarations, type-use chains, statements, and
//! expressions each get their own enum with one variant per grammar
//! production in `SPEC_FULL.md` §4.1.

use std::fmt::Display;
use std::ops::Range;

use strum_macros::EnumIs;

/// A one-based (line, column) source coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        debug_assert!(line >= 1 && column >= 1);
        Self { line, column }
    }
}

/// An error raised when a [`Location`] would have `begin > end`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: begin {begin:?} is after end {end:?}")]
pub struct InvalidLocation {
    pub begin: Position,
    pub end: Position,
}

/// A span between two source positions, plus the underlying byte range used
/// for diagnostic rendering. Construction fails if `begin > end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub begin: Position,
    pub end: Position,
    pub byte_range: Range<usize>,
}

impl Location {
    pub fn new(begin: Position, end: Position, byte_range: Range<usize>) -> Result<Self, InvalidLocation> {
        if begin > end {
            return Err(InvalidLocation { begin, end });
        }
        Ok(Self { begin, end, byte_range })
    }

    /// A location with no meaningful source position, for synthesized nodes.
    pub fn synthetic() -> Self {
        Location { begin: Position::new(1, 1), end: Position::new(1, 1), byte_range: 0..0 }
    }

    /// Builds the smallest location spanning both `self` and `other`.
    pub fn merge(&self, other: &Location) -> Location {
        Location {
            begin: self.begin.min(other.begin),
            end: self.end.max(other.end),
            byte_range: self.byte_range.start.min(other.byte_range.start)..self.byte_range.end.max(other.byte_range.end),
        }
    }
}

/// An immutable, ordered path of identifier segments, e.g. `UI::Component::Button`.
///
/// Equality and hashing are structural over the segment tuple; `Display`
/// joins segments with `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Vec<String>);

impl TypeName {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns a new `TypeName` with `segment` appended.
    pub fn extend(&self, segment: impl Into<String>) -> TypeName {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        TypeName(segments)
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("::"))
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        TypeName::single(value)
    }
}

/// The closed set of primitive type names recognized everywhere a `TypeName`
/// is compared against a concrete value type.
pub const PRIMITIVE_TYPES: [&str; 4] = ["i32", "f32", "bool", "str"];

pub fn is_primitive_type_name(name: &TypeName) -> bool {
    name.segments().len() == 1 && PRIMITIVE_TYPES.contains(&name.segments()[0].as_str())
}

// ---------------------------------------------------------------------
// Types at use sites
// ---------------------------------------------------------------------

/// A type reference as written at a use site: either a bare `Name` or a
/// left-associative `::`-chained `VariantAccess`.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum TypeUse {
    Name { name: String, location: Location },
    VariantAccess { parent: Box<TypeUse>, name: String, location: Location },
}

impl TypeUse {
    pub fn location(&self) -> Location {
        match self {
            TypeUse::Name { location, .. } => location.clone(),
            TypeUse::VariantAccess { location, .. } => location.clone(),
        }
    }

    /// Flattens this use-site chain into a qualified [`TypeName`].
    pub fn to_type_name(&self) -> TypeName {
        match self {
            TypeUse::Name { name, .. } => TypeName::single(name.clone()),
            TypeUse::VariantAccess { parent, name, .. } => parent.to_type_name().extend(name.clone()),
        }
    }
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub declared_type: TypeUse,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclaration {
    pub name: String,
    pub fields: Vec<FieldDeclaration>,
    pub location: Location,
}

/// The body of an `enum` variant: either a nested struct or a nested enum.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum TypeDeclaration {
    Struct(StructDeclaration),
    Enum(EnumDeclaration),
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        match self {
            TypeDeclaration::Struct(s) => &s.name,
            TypeDeclaration::Enum(e) => &e.name,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            TypeDeclaration::Struct(s) => s.location.clone(),
            TypeDeclaration::Enum(e) => e.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub name: String,
    pub variants: Vec<TypeDeclaration>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub mutable: bool,
    pub declared_type: TypeUse,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub returns: Option<TypeUse>,
    pub body: Block,
    pub location: Location,
}

/// The root of a parsed translation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub struct_declarations: Vec<StructDeclaration>,
    pub enum_declarations: Vec<EnumDeclaration>,
    pub function_declarations: Vec<FunctionDeclaration>,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Statement>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: String,
    pub mutable: bool,
    pub declared_type: Option<TypeUse>,
    pub value: Option<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub access: Expression,
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expression>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expression,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matcher {
    pub declared_type: TypeUse,
    pub binding_name: String,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub subject: Expression,
    pub matchers: Vec<Matcher>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum Statement {
    Block(Block),
    VariableDeclaration(VariableDeclaration),
    Assignment(Assignment),
    Return(Return),
    If(If),
    While(While),
    Match(Match),
    /// `FnCall(...)` and `NewStruct{...}` used in statement position.
    Expression(Expression),
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::Block(b) => b.location.clone(),
            Statement::VariableDeclaration(v) => v.location.clone(),
            Statement::Assignment(a) => a.location.clone(),
            Statement::Return(r) => r.location.clone(),
            Statement::If(i) => i.location.clone(),
            Statement::While(w) => w.location.clone(),
            Statement::Match(m) => m.location.clone(),
            Statement::Expression(e) => e.location(),
        }
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum CompareMode {
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        write!(f, "{s}")
    }
}

impl Display for BoolOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

impl Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompareMode::Equal => "==",
            CompareMode::NotEqual => "!=",
            CompareMode::Less => "<",
            CompareMode::Greater => ">",
        };
        write!(f, "{s}")
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
        };
        write!(f, "{s}")
    }
}

/// A literal value as written in source, tagged with its primitive kind.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum ConstantValue {
    I32(i32),
    F32(f32),
    Bool(bool),
    Str(String),
}

impl ConstantValue {
    pub fn type_name(&self) -> TypeName {
        let name = match self {
            ConstantValue::I32(_) => "i32",
            ConstantValue::F32(_) => "f32",
            ConstantValue::Bool(_) => "bool",
            ConstantValue::Str(_) => "str",
        };
        TypeName::single(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub name: String,
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum Expression {
    Constant { value: ConstantValue, location: Location },
    Name { identifier: String, location: Location },
    Access { parent: Box<Expression>, name: String, location: Location },
    UnaryOperation { op: UnaryOp, operand: Box<Expression>, location: Location },
    BinaryOperation { op: BinaryOp, left: Box<Expression>, right: Box<Expression>, location: Location },
    BoolOperation { op: BoolOp, left: Box<Expression>, right: Box<Expression>, location: Location },
    Compare { mode: CompareMode, left: Box<Expression>, right: Box<Expression>, location: Location },
    Cast { value: Box<Expression>, to_type: TypeUse, location: Location },
    IsCompare { value: Box<Expression>, is_type: TypeUse, location: Location },
    FnCall { name: String, arguments: Vec<Expression>, location: Location },
    NewStruct { variant: TypeUse, assignments: Vec<FieldAssignment>, location: Location },
}

impl Expression {
    pub fn location(&self) -> Location {
        match self {
            Expression::Constant { location, .. }
            | Expression::Name { location, .. }
            | Expression::Access { location, .. }
            | Expression::UnaryOperation { location, .. }
            | Expression::BinaryOperation { location, .. }
            | Expression::BoolOperation { location, .. }
            | Expression::Compare { location, .. }
            | Expression::Cast { location, .. }
            | Expression::IsCompare { location, .. }
            | Expression::FnCall { location, .. }
            | Expression::NewStruct { location, .. } => location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn location_rejects_inverted_range() {
        let begin = Position::new(2, 1);
        let end = Position::new(1, 1);
        assert!(Location::new(begin, end, 0..0).is_err());
    }

    #[test]
    fn location_accepts_equal_bounds() {
        let pos = Position::new(1, 1);
        assert!(Location::new(pos, pos, 0..0).is_ok());
    }

    #[rstest]
    #[case(vec!["A"], "A")]
    #[case(vec!["A", "B"], "A::B")]
    #[case(vec!["A", "B", "C"], "A::B::C")]
    fn type_name_display(#[case] segments: Vec<&str>, #[case] expected: &str) {
        let name = TypeName::new(segments.into_iter().map(String::from).collect());
        assert_eq!(name.to_string(), expected);
    }

    #[test]
    fn type_name_extend_matches_constructed() {
        let name = TypeName::single("A").extend("B").extend("C");
        let expected = TypeName::new(vec!["A".into(), "B".into(), "C".into()]);
        assert_eq!(name, expected);
    }

    #[test]
    fn type_use_flattens_to_type_name() {
        let loc = Location::new(Position::new(1, 1), Position::new(1, 1), 0..0).unwrap();
        let use_ = TypeUse::VariantAccess {
            parent: Box::new(TypeUse::Name { name: "Elem".into(), location: loc.clone() }),
            name: "Button".into(),
            location: loc,
        };
        assert_eq!(use_.to_type_name(), TypeName::new(vec!["Elem".into(), "Button".into()]));
    }
}
