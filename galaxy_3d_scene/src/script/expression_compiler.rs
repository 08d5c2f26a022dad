/// Compiles boolean script conditions to scene instructions.
///
/// Grammar: identifiers combined with `!` (not), `&` (and), `|` (or) and
/// parentheses. Operators are single characters, so tokenizing needs no
/// lookahead. The token stream is built into a binary tree with a
/// two-stack operator-precedence parser, then flattened by a post-order
/// walk into `Load` / `And` / `Or` / `Not` instructions.
///
/// Precedence, from the table used by `precede`:
///
/// | operator | in-stack | incoming |
/// |----------|----------|----------|
/// | `#` end  | 0        | 0        |
/// | `(`      | 1        | 9        |
/// | `)`      | -        | 1        |
/// | `\|`     | 3        | 2        |
/// | `&`      | 5        | 4        |
/// | `!`      | 7        | 8        |

use std::cmp::Ordering;
use std::sync::Arc;
use crate::engine_warn;
use crate::error::{Galaxy3dError, Galaxy3dResult};
use crate::log::Logger;
use crate::procedure::OPERAND_STACK_SIZE;
use crate::renderer::ParamValue;
use super::scene_instruction::{parse_bool, SceneInstruction, SceneOpArg};
use super::scene_variable::SceneVariable;

const LOG_SOURCE: &str = "galaxy3d::ExpressionCompiler";

/// End-of-expression marker, pushed first and appended last
const END_MARKER: char = '#';

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Operand(String),
    Operator(char),
}

/// Binary expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    Operand(String),
    Not(Box<ExpressionNode>),
    And(Box<ExpressionNode>, Box<ExpressionNode>),
    Or(Box<ExpressionNode>, Box<ExpressionNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precedence {
    /// Push the incoming operator
    Shift,
    /// Pop a matching pair: `(` with `)`, or the end markers
    Match,
    /// Pop the stack-top operator and build its node
    Reduce,
}

pub struct ExpressionCompiler {
    logger: Arc<dyn Logger>,
}

impl ExpressionCompiler {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Build the expression tree.
    pub fn parse(&self, expression: &str) -> Galaxy3dResult<ExpressionNode> {
        let syntax_error = |message: String| Galaxy3dError::ExpressionSyntax {
            expression: expression.to_string(),
            message,
        };

        let mut tokens = tokenize(expression);
        tokens.push(Token::Operator(END_MARKER));

        let mut operators = vec![END_MARKER];
        let mut operands: Vec<ExpressionNode> = Vec::new();
        // Operands and binary operators must alternate; `!` and `(` only
        // open an operand, `)` only closes one
        let mut expect_operand = true;

        for token in tokens {
            let next = match token {
                Token::Operand(name) => {
                    if !expect_operand {
                        return Err(syntax_error(format!("unexpected operand '{}'", name)));
                    }
                    operands.push(ExpressionNode::Operand(name));
                    expect_operand = false;
                    continue;
                }
                Token::Operator(op) => op,
            };

            let opens_operand = matches!(next, '!' | '(');
            if opens_operand != expect_operand {
                return Err(syntax_error(if expect_operand {
                    format!("missing operand before '{}'", display_operator(next))
                } else {
                    format!("unexpected '{}' after an operand", next)
                }));
            }
            expect_operand = matches!(next, '!' | '(' | '&' | '|');

            loop {
                let Some(&top) = operators.last() else {
                    return Err(syntax_error(format!("unexpected '{}' after the end of the expression", next)));
                };
                match precede(top, next).map_err(&syntax_error)? {
                    Precedence::Shift => {
                        operators.push(next);
                        break;
                    }
                    Precedence::Match => {
                        operators.pop();
                        break;
                    }
                    Precedence::Reduce => {
                        operators.pop();
                        reduce(top, &mut operands).map_err(&syntax_error)?;
                    }
                }
            }
        }

        if operands.len() != 1 {
            return Err(syntax_error(format!("expected one operand, found {}", operands.len())));
        }
        operands.pop().ok_or_else(|| syntax_error("empty expression".to_string()))
    }

    /// Compile `expression`, appending its instructions to `out`.
    ///
    /// Fails when the program would overflow the pass operand stack.
    ///
    /// Leaves naming a variable load it (`name` or `name.Property`); other
    /// leaves load a boolean literal (`true`, `false`, integers).
    pub fn compile(
        &self,
        expression: &str,
        variables: &[SceneVariable],
        out: &mut Vec<SceneInstruction>,
    ) -> Galaxy3dResult<()> {
        let tree = self.parse(expression)?;

        let depth = stack_depth(&tree);
        if depth > OPERAND_STACK_SIZE {
            return Err(Galaxy3dError::ExpressionSyntax {
                expression: expression.to_string(),
                message: format!(
                    "needs {} operand stack slots, passes have {}", depth, OPERAND_STACK_SIZE
                ),
            });
        }

        self.emit(&tree, variables, out);
        Ok(())
    }

    fn emit(&self, node: &ExpressionNode, variables: &[SceneVariable], out: &mut Vec<SceneInstruction>) {
        match node {
            ExpressionNode::Operand(name) => out.push(SceneInstruction::Load(self.resolve_operand(name, variables))),
            ExpressionNode::Not(operand) => {
                self.emit(operand, variables, out);
                out.push(SceneInstruction::Not);
            }
            ExpressionNode::And(left, right) => {
                self.emit(left, variables, out);
                self.emit(right, variables, out);
                out.push(SceneInstruction::And);
            }
            ExpressionNode::Or(left, right) => {
                self.emit(left, variables, out);
                self.emit(right, variables, out);
                out.push(SceneInstruction::Or);
            }
        }
    }

    fn resolve_operand(&self, text: &str, variables: &[SceneVariable]) -> SceneOpArg {
        let reference = text.strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(text);
        let (name, property) = match reference.split_once('.') {
            Some((name, property)) => (name, Some(property.to_string())),
            None => (reference, None),
        };

        if let Some(index) = variables.iter().position(|v| v.name() == name) {
            return SceneOpArg::Variable { index, property };
        }
        if let Some(value) = parse_bool(text) {
            return SceneOpArg::Immediate(ParamValue::Bool(value));
        }

        engine_warn!(self.logger, LOG_SOURCE,
            "Unknown identifier '{}' in expression, loading false", text);
        SceneOpArg::Immediate(ParamValue::Bool(false))
    }
}

/// Peak operand stack usage of the post-order program for `node`.
///
/// The right operand of a binary node is evaluated while the left
/// result is still on the stack.
fn stack_depth(node: &ExpressionNode) -> usize {
    match node {
        ExpressionNode::Operand(_) => 1,
        ExpressionNode::Not(operand) => stack_depth(operand),
        ExpressionNode::And(left, right) | ExpressionNode::Or(left, right) => {
            stack_depth(left).max(stack_depth(right) + 1)
        }
    }
}

fn display_operator(op: char) -> String {
    if op == END_MARKER {
        "end of expression".to_string()
    } else {
        op.to_string()
    }
}

fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in expression.chars() {
        let is_operator = matches!(c, '&' | '|' | '!' | '(' | ')');
        if is_operator || c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(Token::Operand(std::mem::take(&mut current)));
            }
            if is_operator {
                tokens.push(Token::Operator(c));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(Token::Operand(current));
    }
    tokens
}

fn in_stack_priority(op: char) -> Option<u8> {
    match op {
        '#' => Some(0),
        '(' => Some(1),
        '|' => Some(3),
        '&' => Some(5),
        '!' => Some(7),
        _ => None,
    }
}

fn incoming_priority(op: char) -> Option<u8> {
    match op {
        '#' => Some(0),
        ')' => Some(1),
        '|' => Some(2),
        '&' => Some(4),
        '!' => Some(8),
        '(' => Some(9),
        _ => None,
    }
}

/// Compare the stack-top operator with the incoming one.
fn precede(top: char, next: char) -> std::result::Result<Precedence, String> {
    if top == END_MARKER && next == ')' {
        return Err("unmatched ')'".to_string());
    }
    if top == '(' && next == END_MARKER {
        return Err("unmatched '('".to_string());
    }

    let in_stack = in_stack_priority(top).ok_or_else(|| format!("'{}' cannot be stacked", top))?;
    let incoming = incoming_priority(next).ok_or_else(|| format!("unknown operator '{}'", next))?;

    Ok(match in_stack.cmp(&incoming) {
        Ordering::Less => Precedence::Shift,
        Ordering::Equal => Precedence::Match,
        Ordering::Greater => Precedence::Reduce,
    })
}

/// Pop the operands of `op` and push the node it builds.
fn reduce(op: char, operands: &mut Vec<ExpressionNode>) -> std::result::Result<(), String> {
    let mut pop = || operands.pop().ok_or_else(|| format!("missing operand for '{}'", op));

    let node = match op {
        '!' => ExpressionNode::Not(Box::new(pop()?)),
        '&' | '|' => {
            let right = pop()?;
            let left = pop()?;
            if op == '&' {
                ExpressionNode::And(Box::new(left), Box::new(right))
            } else {
                ExpressionNode::Or(Box::new(left), Box::new(right))
            }
        }
        _ => return Err(format!("'{}' cannot be reduced", op)),
    };

    operands.push(node);
    Ok(())
}

#[cfg(test)]
#[path = "expression_compiler_tests.rs"]
mod tests;
