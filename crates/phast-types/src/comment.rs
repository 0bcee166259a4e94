//! Doc-comment parsing.
//!
//! Comments are scanned line by line for the annotations the analyzer
//! understands: `@param T $name`, `@var T`, `@return T`, `@template T`,
//! `@inherits T`, `@deprecated` and `@suppress IssueName`. Types are
//! parsed with [`UnionType::from_string_in_context`]; `@template` names
//! declared in the same comment are visible to its other annotations.

use crate::context::Context;
use crate::union::UnionType;
use phast_common::Atom;

/// A `@param`/`@var` annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentParameter {
    /// Variable name without the `$`; empty for bare `@var T`.
    pub name: Atom,
    pub union_type: UnionType,
}

/// The parsed annotations of one doc comment.
#[derive(Clone, Debug, Default)]
pub struct Comment {
    pub is_deprecated: bool,
    pub parameters: Vec<CommentParameter>,
    pub variables: Vec<CommentParameter>,
    pub return_type: UnionType,
    pub template_types: Vec<Atom>,
    /// The `@inherits` parent type, carrying concrete template
    /// parameters for the extended generic class.
    pub inherited_type: Option<UnionType>,
    pub suppressions: Vec<Atom>,
}

impl Comment {
    #[must_use]
    pub fn parse(source: &str, context: &Context) -> Self {
        let mut comment = Comment::default();

        // First pass: template declarations, so the second pass parses
        // `T` in this comment as a template type.
        for line in source.lines() {
            let line = trim_comment_line(line);
            if let Some(rest) = tag_argument(line, "@template") {
                if let Some(name) = first_word(rest) {
                    comment.template_types.push(Atom::new(name));
                }
            }
        }

        let context = if comment.template_types.is_empty() {
            context.clone()
        } else {
            let scope = context.scope().with_added_template_types(
                comment
                    .template_types
                    .iter()
                    .map(|t| (*t, UnionType::empty())),
            );
            context.with_scope(scope)
        };

        for line in source.lines() {
            let line = trim_comment_line(line);
            if let Some(rest) = tag_argument(line, "@param") {
                if let Some(param) = parse_typed_variable(rest, &context) {
                    comment.parameters.push(param);
                }
            } else if let Some(rest) = tag_argument(line, "@var") {
                if let Some(param) = parse_typed_variable(rest, &context) {
                    comment.variables.push(param);
                }
            } else if let Some(rest) = tag_argument(line, "@return") {
                if let Some(type_str) = first_word(rest) {
                    comment
                        .return_type
                        .add_union(&UnionType::from_string_in_context(type_str, &context));
                }
            } else if let Some(rest) = tag_argument(line, "@inherits") {
                if let Some(type_str) = first_word(rest) {
                    comment.inherited_type =
                        Some(UnionType::from_string_in_context(type_str, &context));
                }
            } else if let Some(rest) = tag_argument(line, "@suppress") {
                if let Some(name) = first_word(rest) {
                    comment.suppressions.push(Atom::new(name));
                }
            } else if line.starts_with("@deprecated") {
                comment.is_deprecated = true;
            }
        }

        comment
    }

    /// The `@param` type for a parameter name (without `$`).
    #[must_use]
    pub fn parameter_type(&self, name: &str) -> Option<&UnionType> {
        self.parameters
            .iter()
            .find(|p| p.name.as_str() == name)
            .map(|p| &p.union_type)
    }

    /// The first `@var` type, if any.
    #[must_use]
    pub fn var_type(&self) -> Option<&UnionType> {
        self.variables.first().map(|v| &v.union_type)
    }
}

fn trim_comment_line(line: &str) -> &str {
    line.trim_start()
        .trim_start_matches("/**")
        .trim_start_matches("*/")
        .trim_start_matches('*')
        .trim_start()
        .trim_end_matches("*/")
        .trim_end()
}

/// `tag_argument("@param int $x", "@param")` → `Some("int $x")`.
/// Requires whitespace after the tag so `@params` does not match.
fn tag_argument<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

/// Parse `Type $name` or a bare `Type`.
fn parse_typed_variable(rest: &str, context: &Context) -> Option<CommentParameter> {
    let mut words = rest.split_whitespace();
    let type_str = words.next()?;
    if type_str.starts_with('$') {
        // `@param $x` with no type carries no information.
        return None;
    }
    let name = words
        .next()
        .and_then(|w| w.strip_prefix('$'))
        .map_or_else(Atom::empty, Atom::new);
    Some(CommentParameter {
        name,
        union_type: UnionType::from_string_in_context(type_str, context),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Type;

    fn context() -> Context {
        Context::new(Atom::new("src.php"))
    }

    #[test]
    fn parses_params_and_return() {
        let comment = Comment::parse(
            "/**\n * @param int|string $x\n * @param bool $flag\n * @return string\n */",
            &context(),
        );
        assert_eq!(comment.parameters.len(), 2);
        let x = comment.parameter_type("x").unwrap();
        assert!(x.has_type(&Type::INT));
        assert!(x.has_type(&Type::STRING));
        assert_eq!(comment.return_type, UnionType::of(Type::STRING));
    }

    #[test]
    fn parses_var_with_and_without_name() {
        let named = Comment::parse("/** @var int $count */", &context());
        assert_eq!(named.variables[0].name.as_str(), "count");
        let bare = Comment::parse("/** @var string[] */", &context());
        assert_eq!(
            bare.var_type().unwrap(),
            &UnionType::of(Type::generic_array_of(Type::STRING))
        );
    }

    #[test]
    fn template_declared_in_comment_is_visible_to_its_types() {
        let comment = Comment::parse(
            "/**\n * @template T\n * @param T $value\n * @return T[]\n */",
            &context(),
        );
        assert_eq!(comment.template_types, vec![Atom::new("T")]);
        assert!(comment.parameter_type("value").unwrap().has_template_type());
        assert!(comment.return_type.has_template_type());
    }

    #[test]
    fn inherits_carries_template_parameters() {
        let comment = Comment::parse("/** @inherits Container<int> */", &context());
        let inherited = comment.inherited_type.unwrap();
        let ty = inherited.types().next().unwrap();
        match ty {
            Type::ClassInstance { params, .. } => {
                assert_eq!(params.len(), 1);
                assert_eq!(params[0], UnionType::of(Type::INT));
            }
            other => panic!("expected class type, got {other}"),
        }
    }

    #[test]
    fn deprecated_and_suppress() {
        let comment = Comment::parse(
            "/**\n * @deprecated\n * @suppress PhanUndeclaredVariable\n */",
            &context(),
        );
        assert!(comment.is_deprecated);
        assert_eq!(
            comment.suppressions,
            vec![Atom::new("PhanUndeclaredVariable")]
        );
    }

    #[test]
    fn untyped_param_is_skipped() {
        let comment = Comment::parse("/** @param $x */", &context());
        assert!(comment.parameters.is_empty());
    }
}
