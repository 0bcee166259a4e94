//! The flag-keyed binary operator sub-visitor.

use crate::error::AnalysisResult;
use crate::state::AnalysisState;
use phast_ast::flags::binary_flags::*;
use phast_ast::Node;
use phast_common::issue::catalog;
use phast_types::{Context, NativeType, Type, UnionType};

impl AnalysisState<'_> {
    pub(crate) fn visit_binary_op(
        &mut self,
        ctx: &Context,
        node: &Node,
    ) -> AnalysisResult<UnionType> {
        let left = node.child("left").cloned();
        let right = node.child("right").cloned();
        let left_type = left
            .map(|c| self.union_type_of_child(ctx, &c))
            .unwrap_or_default();
        let right_type = right
            .map(|c| self.union_type_of_child(ctx, &c))
            .unwrap_or_default();
        Ok(self.binary_op_result(ctx, node.flags, &left_type, &right_type))
    }

    /// The result type of a binary operator over already-inferred
    /// operand types. Also used for `op=` compound assignments.
    pub(crate) fn binary_op_result(
        &mut self,
        ctx: &Context,
        flags: u32,
        left_type: &UnionType,
        right_type: &UnionType,
    ) -> UnionType {
        match flags {
            BINARY_ADD => {
                // `array + array` is the union operator; one-sided arrays
                // are invalid.
                let left_array = left_type.is_exclusively_array_like();
                let right_array = right_type.is_exclusively_array_like();
                if left_array && right_array {
                    UnionType::of(Type::ARRAY)
                } else if left_array {
                    self.emit(ctx, &catalog::TYPE_INVALID_RIGHT_OPERAND, 0, Vec::new());
                    UnionType::of(Type::ARRAY)
                } else if right_array {
                    self.emit(ctx, &catalog::TYPE_INVALID_LEFT_OPERAND, 0, Vec::new());
                    UnionType::of(Type::ARRAY)
                } else {
                    arithmetic_result(left_type, right_type)
                }
            }
            BINARY_SUB | BINARY_MUL | BINARY_MOD | BINARY_POW => {
                if left_type.is_exclusively_array_like() || right_type.is_exclusively_array_like()
                {
                    self.emit(
                        ctx,
                        &catalog::TYPE_ARRAY_OPERATOR,
                        0,
                        vec![left_type.to_string(), right_type.to_string()],
                    );
                }
                arithmetic_result(left_type, right_type)
            }
            BINARY_DIV => UnionType::from_types([Type::INT, Type::FLOAT]),
            BINARY_CONCAT => {
                for operand in [left_type, right_type] {
                    if operand.is_exclusively_array_like() {
                        self.emit(
                            ctx,
                            &catalog::TYPE_ARRAY_OPERATOR,
                            0,
                            vec![left_type.to_string(), right_type.to_string()],
                        );
                        break;
                    }
                }
                UnionType::of(Type::STRING)
            }
            BINARY_SHIFT_LEFT | BINARY_SHIFT_RIGHT | BINARY_BITWISE_AND | BINARY_BITWISE_OR
            | BINARY_BITWISE_XOR => UnionType::of(Type::INT),
            BINARY_BOOL_AND | BINARY_BOOL_OR | BINARY_BOOL_XOR => UnionType::of(Type::BOOL),
            BINARY_IS_EQUAL | BINARY_IS_NOT_EQUAL | BINARY_IS_IDENTICAL
            | BINARY_IS_NOT_IDENTICAL | BINARY_IS_SMALLER | BINARY_IS_SMALLER_OR_EQUAL
            | BINARY_IS_GREATER | BINARY_IS_GREATER_OR_EQUAL => {
                self.check_array_comparison(ctx, left_type, right_type);
                UnionType::of(Type::BOOL)
            }
            BINARY_SPACESHIP => UnionType::of(Type::INT),
            BINARY_COALESCE => {
                let mut union = left_type.clone();
                union.add_union(right_type);
                union
            }
            _ => UnionType::empty(),
        }
    }

    fn check_array_comparison(&mut self, ctx: &Context, left: &UnionType, right: &UnionType) {
        let left_array = left.is_exclusively_array_like();
        let right_array = right.is_exclusively_array_like();
        if left_array && !right_array && !right.is_empty() {
            self.emit(
                ctx,
                &catalog::TYPE_COMPARISON_FROM_ARRAY,
                0,
                vec![right.to_string()],
            );
        } else if right_array && !left_array && !left.is_empty() {
            self.emit(
                ctx,
                &catalog::TYPE_COMPARISON_TO_ARRAY,
                0,
                vec![left.to_string()],
            );
        }
    }
}

/// `int` stays `int`; any `float` operand floats the result; anything
/// else could go either way at runtime.
fn arithmetic_result(left: &UnionType, right: &UnionType) -> UnionType {
    let exact_int = |u: &UnionType| u.len() == 1 && u.has_native(NativeType::Int);
    if left.has_native(NativeType::Float) || right.has_native(NativeType::Float) {
        UnionType::of(Type::FLOAT)
    } else if exact_int(left) && exact_int(right) {
        UnionType::of(Type::INT)
    } else {
        UnionType::from_types([Type::INT, Type::FLOAT])
    }
}
