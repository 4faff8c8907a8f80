//! Predicate text parser using nom.
//!
//! Parses lambda-like predicate text into the predicate AST.
//!
//! # Syntax Overview
//!
//! ```text
//! x => x.anInt == 5 && ($flag.has_value || x.aString in ["a", "b"])
//! ┬─── ─┬───── ─┬─    ──┬──────────────    ─┬─────── ─┬────────
//! │     │       │       │                   │         └── literal list
//! │     │       │       │                   └── membership
//! │     │       │       └── captured variable + has-value test
//! │     │       └── comparison
//! │     └── entity member
//! └── optional header naming the entity parameter
//! ```
//!
//! Captured variables (`$name`, `$obj.member`) are looked up in a
//! [`Variables`] map by their full dotted path when the text is parsed.

use std::collections::HashMap;
use std::str::FromStr;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{cut, map, not, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use rust_decimal::Decimal;

use crate::ast::{CompareOp, MemberPath, Operand, Owner, Predicate, Value, ValueType};
use crate::error::{PredError, PredResult};

/// Entity parameter name assumed when the text has no `ident =>` header.
pub const DEFAULT_PARAM: &str = "x";

/// Values of captured variables, keyed by dotted path without the `$`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        self.values.insert(path.to_string(), value.into());
    }

    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse predicate text. Variables are resolved from `vars`.
pub fn parse_predicate(input: &str, vars: &Variables) -> PredResult<Predicate> {
    let total = input.len();
    let (rest, param) = match parse_header(input) {
        Ok((rest, param)) => (rest, param),
        Err(_) => (input, DEFAULT_PARAM),
    };

    let grammar = Grammar { param };
    let (rest, expr) = grammar.or_expr(rest).map_err(|e| to_error(total, e))?;
    let (rest, _) = multispace0::<&str, Error<&str>>(rest).map_err(|e| to_error(total, e))?;
    if !rest.is_empty() {
        return Err(PredError::parse(
            total - rest.len(),
            format!("Unexpected trailing content: '{}'", rest),
        ));
    }

    Lowering { vars, total }.predicate(expr)
}

/// Parse a single literal (`5`, `5L`, `1.5`, `2.50m`, `"text"`, `true`,
/// `null`, `[1, 2]`), as used for variable values on the command line.
pub fn parse_literal(input: &str) -> PredResult<Value> {
    let total = input.len();
    let trimmed = input.trim_start();
    let offset = total - trimmed.len();
    match literal(trimmed) {
        Ok((rest, v)) if rest.trim().is_empty() => Ok(v),
        Ok((rest, _)) => Err(PredError::parse(
            total - rest.len(),
            format!("Unexpected trailing content: '{}'", rest),
        )),
        Err(e) => Err(match to_error(trimmed.len(), e) {
            PredError::Parse { position, message } => PredError::parse(position + offset, message),
            other => other,
        }),
    }
}

fn to_error(total: usize, err: nom::Err<Error<&str>>) -> PredError {
    match err {
        nom::Err::Incomplete(_) => PredError::parse(total, "unexpected end of input"),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let position = total - e.input.len();
            if e.input.is_empty() {
                PredError::parse(position, "unexpected end of input")
            } else {
                let near: String = e.input.chars().take(16).collect();
                PredError::parse(position, format!("unexpected input near '{}'", near))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Raw syntax tree, before variables are resolved
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Term {
    /// The entity parameter itself.
    Entity,
    Field(Vec<String>),
    /// `$path`; `at` is the remaining input length where it starts.
    Var { path: Vec<String>, at: usize },
    Lit(Value),
}

#[derive(Debug, Clone, PartialEq)]
enum Post {
    HasValue,
    IsNone,
    Call { method: String, args: Vec<Access> },
}

#[derive(Debug, Clone, PartialEq)]
struct Access {
    term: Term,
    post: Option<Post>,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Compare(CompareOp, Access, Access),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    In(Access, Access),
    Truth(Access),
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(kw), not(satisfy(is_ident_char)))
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse `ident =>`.
fn parse_header(input: &str) -> IResult<&str, &str> {
    let (input, (_, name, _, _)) = tuple((multispace0, identifier, multispace0, tag("=>")))(input)?;
    Ok((input, name))
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, tag("<")),
        value(CompareOp::Gt, tag(">")),
    ))(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
        value(Value::Null(ValueType::String), keyword("null")),
        map(string_literal, Value::String),
        number,
        list,
    ))(input)
}

/// Parse a number: `-3`, `5L` (bigint), `1.5` (float), `2.50m` (decimal).
fn number(input: &str) -> IResult<&str, Value> {
    let (rest, digits) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;
    let (rest, suffix) = opt(alt((char('L'), char('m'), char('M'))))(rest)?;
    let fail = || nom::Err::Failure(Error::new(input, ErrorKind::Digit));

    let parsed = match suffix {
        Some('L') => Value::BigInt(digits.parse().map_err(|_| fail())?),
        Some(_) => Value::Decimal(Decimal::from_str(digits).map_err(|_| fail())?),
        None if digits.contains('.') => Value::Float(digits.parse().map_err(|_| fail())?),
        None => match digits.parse::<i32>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::BigInt(digits.parse().map_err(|_| fail())?),
        },
    };
    Ok((rest, parsed))
}

/// Parse a double-quoted string with `\"`, `\\`, `\n` and `\t` escapes.
fn string_literal(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            None => return Err(nom::Err::Failure(Error::new(rest, ErrorKind::Char))),
            Some('"') => return Ok((chars.as_str(), out)),
            Some('\\') => {
                let escaped = match chars.next() {
                    Some('"') => '"',
                    Some('\\') => '\\',
                    Some('n') => '\n',
                    Some('t') => '\t',
                    _ => return Err(nom::Err::Failure(Error::new(rest, ErrorKind::Escaped))),
                };
                out.push(escaped);
            }
            Some(c) => out.push(c),
        }
        rest = chars.as_str();
    }
}

fn list(input: &str) -> IResult<&str, Value> {
    map(
        delimited(
            terminated(char('['), multispace0),
            separated_list0(ws(char(',')), literal),
            preceded(multispace0, cut(char(']'))),
        ),
        Value::list,
    )(input)
}

/// Recursive-descent rules that depend on the entity parameter name.
struct Grammar<'p> {
    param: &'p str,
}

impl Grammar<'_> {
    /// `and_expr (("||" | "or") and_expr)*`
    fn or_expr<'a>(&self, input: &'a str) -> IResult<&'a str, Expr> {
        let (input, first) = self.and_expr(input)?;
        let (input, rest) = many0(preceded(
            ws(alt((tag("||"), keyword("or")))),
            cut(|i| self.and_expr(i)),
        ))(input)?;
        let folded = rest
            .into_iter()
            .fold(first, |l, r| Expr::Or(Box::new(l), Box::new(r)));
        Ok((input, folded))
    }

    /// `unary (("&&" | "and") unary)*`
    fn and_expr<'a>(&self, input: &'a str) -> IResult<&'a str, Expr> {
        let (input, first) = self.unary(input)?;
        let (input, rest) = many0(preceded(
            ws(alt((tag("&&"), keyword("and")))),
            cut(|i| self.unary(i)),
        ))(input)?;
        let folded = rest
            .into_iter()
            .fold(first, |l, r| Expr::And(Box::new(l), Box::new(r)));
        Ok((input, folded))
    }

    /// `("!" | "not") unary | primary`
    fn unary<'a>(&self, input: &'a str) -> IResult<&'a str, Expr> {
        let (input, _) = multispace0(input)?;
        if let Ok((rest, _)) = alt((tag::<_, _, Error<&str>>("!"), keyword("not")))(input) {
            let (rest, inner) = cut(|i| self.unary(i))(rest)?;
            return Ok((rest, Expr::Not(Box::new(inner))));
        }
        self.primary(input)
    }

    /// `"(" or_expr ")" | test`
    fn primary<'a>(&self, input: &'a str) -> IResult<&'a str, Expr> {
        if let Ok((rest, _)) = ws(char::<_, Error<&str>>('('))(input) {
            let (rest, inner) = cut(|i| self.or_expr(i))(rest)?;
            let (rest, _) = cut(ws(char(')')))(rest)?;
            return Ok((rest, inner));
        }
        self.test(input)
    }

    /// `access (compare_op access | "in" access)?`
    fn test<'a>(&self, input: &'a str) -> IResult<&'a str, Expr> {
        let (input, left) = ws(|i| self.access(i))(input)?;
        if left.post.is_some() {
            return Ok((input, Expr::Truth(left)));
        }

        if let Ok((rest, op)) = ws(compare_op)(input) {
            let (rest, right) = cut(ws(|i| self.access(i)))(rest)?;
            return Ok((rest, Expr::Compare(op, left, right)));
        }
        if let Ok((rest, _)) = ws(keyword("in"))(input) {
            let (rest, collection) = cut(ws(|i| self.access(i)))(rest)?;
            return Ok((rest, Expr::In(left, collection)));
        }
        Ok((input, Expr::Truth(left)))
    }

    /// A literal, `$var.path`, or `param.path`, with an optional
    /// `.has_value` / `.is_none` suffix or trailing method call.
    fn access<'a>(&self, input: &'a str) -> IResult<&'a str, Access> {
        match literal(input) {
            Ok((rest, v)) => {
                return Ok((
                    rest,
                    Access {
                        term: Term::Lit(v),
                        post: None,
                    },
                ));
            }
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            Err(_) => {}
        }

        let at = input.len();
        let (rest, dollar) = opt(char('$'))(input)?;
        let (rest, segments) = separated_list1(char('.'), identifier)(rest)?;
        let mut path: Vec<String> = segments.into_iter().map(str::to_string).collect();

        let is_var = dollar.is_some();
        if !is_var && path.first().map(String::as_str) != Some(self.param) {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Tag)));
        }

        let (rest, args) = opt(delimited(
            ws(char('(')),
            separated_list0(ws(char(',')), |i| self.access(i)),
            cut(ws(char(')'))),
        ))(rest)?;

        // a suffix needs a variable name or `param.member` left in front of it
        let keep = if is_var { 1 } else { 2 };
        let post = match args {
            Some(args) => path.pop().map(|method| Post::Call { method, args }),
            None if path.len() > keep => match path.last().map(String::as_str) {
                Some("has_value") => path.pop().map(|_| Post::HasValue),
                Some("is_none") => path.pop().map(|_| Post::IsNone),
                _ => None,
            },
            None => None,
        };

        let term = if is_var {
            Term::Var { path, at }
        } else {
            let members = path.split_off(1);
            if members.is_empty() {
                Term::Entity
            } else {
                Term::Field(members)
            }
        };
        Ok((rest, Access { term, post }))
    }
}

// ---------------------------------------------------------------------------
// Lowering to the predicate AST
// ---------------------------------------------------------------------------

struct Lowering<'v> {
    vars: &'v Variables,
    total: usize,
}

impl Lowering<'_> {
    fn predicate(&self, expr: Expr) -> PredResult<Predicate> {
        Ok(match expr {
            Expr::Compare(op, left, right) => Predicate::Compare {
                op,
                left: self.operand(left)?,
                right: self.operand(right)?,
            },
            Expr::Not(inner) => !self.predicate(*inner)?,
            Expr::And(l, r) => self.predicate(*l)?.and(self.predicate(*r)?),
            Expr::Or(l, r) => self.predicate(*l)?.or(self.predicate(*r)?),
            Expr::In(item, collection) => Predicate::Membership {
                item: self.operand(item)?,
                collection: self.collection(collection)?,
            },
            Expr::Truth(access) => self.truth(access)?,
        })
    }

    fn truth(&self, access: Access) -> PredResult<Predicate> {
        let Access { term, post } = access;
        let bare = Access { term, post: None };
        match post {
            None => Ok(Predicate::Truth(self.operand(bare)?)),
            Some(Post::HasValue) => Ok(Predicate::IsNotNull(self.operand(bare)?)),
            Some(Post::IsNone) => Ok(Predicate::IsNull(self.operand(bare)?)),
            Some(Post::Call { method, mut args }) if method == "contains" && args.len() == 1 => {
                let item = args.remove(0);
                Ok(Predicate::Membership {
                    item: self.operand(item)?,
                    collection: self.collection(bare)?,
                })
            }
            Some(Post::Call { method, args }) => Err(PredError::unsupported(
                "method call",
                format!("no translation for '{}' with {} argument(s)", method, args.len()),
            )),
        }
    }

    fn operand(&self, access: Access) -> PredResult<Operand> {
        if let Some(post) = access.post {
            let what = match post {
                Post::HasValue => "has_value".to_string(),
                Post::IsNone => "is_none".to_string(),
                Post::Call { method, .. } => format!("{}()", method),
            };
            return Err(PredError::unsupported(
                "comparison",
                format!("'{}' cannot be used as a value", what),
            ));
        }
        match access.term {
            Term::Entity => Err(PredError::unsupported(
                "member access",
                "the entity itself is not a value",
            )),
            Term::Field(path) => Ok(Operand::FieldRef {
                path: MemberPath::new(path),
                owner: Owner::Entity,
            }),
            Term::Var { path, at } => {
                let path = MemberPath::new(path);
                let value = self.variable(&path, at)?;
                Ok(Operand::FieldRef {
                    path,
                    owner: Owner::Captured(value),
                })
            }
            Term::Lit(v) => Ok(Operand::constant(v)),
        }
    }

    fn collection(&self, access: Access) -> PredResult<Vec<Value>> {
        let shown = match &access.term {
            Term::Var { path, .. } => format!("${}", path.join(".")),
            Term::Field(path) => format!("x.{}", path.join(".")),
            Term::Entity => "the entity".to_string(),
            Term::Lit(v) => v.to_string(),
        };
        match self.operand(access)? {
            Operand::Constant {
                value: Value::List(_, items),
                ..
            }
            | Operand::FieldRef {
                owner: Owner::Captured(Value::List(_, items)),
                ..
            } => Ok(items),
            _ => Err(PredError::unsupported(
                "membership test",
                format!("{} is not a list", shown),
            )),
        }
    }

    fn variable(&self, path: &MemberPath, at: usize) -> PredResult<Value> {
        self.vars
            .get(&path.to_string())
            .cloned()
            .ok_or_else(|| PredError::parse(self.total - at, format!("unknown variable '${}'", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builders::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Predicate {
        parse_predicate(input, &Variables::new()).unwrap()
    }

    #[test]
    fn test_simple_conjunction() {
        let p = parse("x => x.anInt == 5 && x.aString == \"foo\"");
        assert_eq!(p, field("anInt").eq(5).and(field("aString").eq("foo")));
    }

    #[test]
    fn test_header_is_optional() {
        assert_eq!(parse("x.aBool"), field("aBool").truth());
        assert_eq!(parse("e => e.anInt > 3"), field("anInt").gt(3));
    }

    #[test]
    fn test_wrong_parameter_name() {
        let err = parse_predicate("e => x.anInt > 3", &Variables::new()).unwrap_err();
        assert!(matches!(err, PredError::Parse { position: 5, .. }));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let p = parse("x.a == 1 || x.b == 2 && x.c == 3");
        assert_eq!(
            p,
            field("a").eq(1).or(field("b").eq(2).and(field("c").eq(3)))
        );
    }

    #[test]
    fn test_word_operators_and_parens() {
        let p = parse("not (x.a == 1 or x.b == 2) and x.c != 3");
        assert_eq!(
            p,
            (!(field("a").eq(1).or(field("b").eq(2)))).and(field("c").ne(3))
        );
    }

    #[test]
    fn test_negated_bool() {
        assert_eq!(parse("!x.aBool"), !field("aBool").truth());
    }

    #[test]
    fn test_null_literal() {
        let p = parse("x.nullableInt == null");
        match p {
            Predicate::Compare { op, right, .. } => {
                assert_eq!(op, CompareOp::Eq);
                assert!(right.is_null_literal());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_has_value_with_variable() {
        let vars = Variables::new().with("prm", Some(5));
        let p = parse_predicate("$prm.has_value && x.nullableInt == $prm", &vars).unwrap();
        assert_eq!(
            p,
            var("prm", 5).has_value().and(field("nullableInt").eq(var("prm", 5)))
        );
        assert_eq!(parse("x.nullableInt.is_none"), field("nullableInt").is_null());
    }

    #[test]
    fn test_dotted_variable() {
        let vars = Variables::new().with("someInstance.aString", "foo");
        let p = parse_predicate("$someInstance.aString == x.aString", &vars).unwrap();
        assert_eq!(p, var("someInstance.aString", "foo").eq(field("aString")));
    }

    #[test]
    fn test_membership_forms() {
        assert_eq!(parse("x.anInt in [1, 2, 3]"), field("anInt").is_in([1, 2, 3]));

        let vars = Variables::new().with("ids", vec![6, 7]);
        let expected = field("anInt").is_in([6, 7]);
        assert_eq!(parse_predicate("x.anInt in $ids", &vars).unwrap(), expected);
        assert_eq!(
            parse_predicate("$ids.contains(x.anInt)", &vars).unwrap(),
            expected
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_literal("5L").unwrap(), Value::BigInt(5));
        assert_eq!(parse_literal("-3").unwrap(), Value::Int(-3));
        assert_eq!(parse_literal("1.5").unwrap(), Value::Float(1.5));
        assert_eq!(
            parse_literal("2.50m").unwrap(),
            Value::Decimal(Decimal::from_str("2.50").unwrap())
        );
        assert_eq!(
            parse_literal("\"a\\\"b\"").unwrap(),
            Value::String("a\"b".into())
        );
        assert_eq!(parse_literal("3000000000").unwrap(), Value::BigInt(3_000_000_000));
        assert_eq!(
            parse_literal("[\"a\", \"b\"]").unwrap(),
            Value::List(
                ValueType::String,
                vec![Value::String("a".into()), Value::String("b".into())]
            )
        );
    }

    #[test]
    fn test_unsupported_method() {
        let err = parse_predicate("x.aString.startsWith(\"a\")", &Variables::new()).unwrap_err();
        assert!(matches!(err, PredError::Unsupported { node: "method call", .. }));
    }

    #[test]
    fn test_unknown_variable() {
        let err = parse_predicate("x.anInt == $missing", &Variables::new()).unwrap_err();
        match err {
            PredError::Parse { position, message } => {
                assert_eq!(position, 11);
                assert!(message.contains("$missing"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors_have_positions() {
        let err = parse_predicate("x.anInt == ", &Variables::new()).unwrap_err();
        assert!(matches!(err, PredError::Parse { position: 11, .. }));

        let err = parse_predicate("x.anInt == 5 )", &Variables::new()).unwrap_err();
        assert!(matches!(err, PredError::Parse { position: 13, .. }));

        let err = parse_predicate("x.aString == \"open", &Variables::new()).unwrap_err();
        assert!(matches!(err, PredError::Parse { .. }));
    }
}
