use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

use log::debug;

use crate::{
    environment::Env,
    error::{Error, Result},
    parser::{BinaryOp, Expr, UnaryOp},
};

#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Closure(Closure),
}

/// A callable value: a parameter shape, a body, and the environment frame
/// in effect when it was created. The capture is by reference: the frame
/// is shared, never copied.
#[derive(Clone)]
pub struct Closure {
    pub params: Params,
    pub body: Rc<Expr>,
    pub env: Env,
}

/// The parameter shape drives application: a `Single` closure (from a
/// lambda) applies one argument at a time, a `Fixed` closure (from a
/// `Defun`) requires its exact argument count.
#[derive(Clone)]
pub enum Params {
    Single(String),
    Fixed(Vec<String>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Closure(_), Value::Closure(_)) => false,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Closure(c) => write!(f, "{}", c),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.params {
            Params::Single(parameter) => write!(f, "<lambda {}>", parameter),
            Params::Fixed(parameters) => write!(f, "<function ({})>", parameters.join(", ")),
        }
    }
}

impl Debug for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Closure(_) => true,
    }
}

// Floor division and the matching modulo: quotients round toward negative
// infinity, remainders take the divisor's sign.
fn floor_div(left: i64, right: i64) -> i64 {
    let quotient = left / right;
    if left % right != 0 && (left < 0) != (right < 0) {
        quotient - 1
    } else {
        quotient
    }
}

fn floor_mod(left: i64, right: i64) -> i64 {
    let remainder = left % right;
    if remainder != 0 && (remainder < 0) != (right < 0) {
        remainder + right
    } else {
        remainder
    }
}

/// Evaluates a node against the given environment. `Ok(None)` is the
/// "no value" outcome: a `Defun`, or an `if` whose condition fails and
/// that has no `else` branch.
pub fn evaluate(expr: &Expr, env: &Env) -> Result<Option<Value>> {
    match expr {
        Expr::Int(value) => Ok(Some(Value::Integer(*value))),
        Expr::Bool(value) => Ok(Some(Value::Boolean(*value))),
        Expr::Identifier(name) => match env.get(name) {
            Some(value) => Ok(Some(value)),
            None => Err(Error::Name { name: name.clone() }),
        },
        Expr::Unary { operator, operand } => {
            let value = evaluate_value(operand, env)?;
            match operator {
                UnaryOp::Not => Ok(Some(Value::Boolean(!is_truthy(&value)))),
            }
        }
        Expr::Binary {
            left,
            operator,
            right,
        } => evaluate_binary(left, *operator, right, env).map(Some),
        Expr::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition_value = evaluate_value(condition, env)?;
            if is_truthy(&condition_value) {
                evaluate(then_branch, env)
            } else if let Some(alternative) = else_branch {
                evaluate(alternative, env)
            } else {
                Ok(None)
            }
        }
        Expr::Lambda { parameter, body } => Ok(Some(Value::Closure(Closure {
            params: Params::Single(parameter.clone()),
            body: Rc::new((**body).clone()),
            env: env.clone(),
        }))),
        Expr::FuncDef {
            name,
            parameters,
            body,
        } => {
            // Bound in the current frame, which is also the captured frame,
            // so the function can resolve itself recursively
            let closure = Closure {
                params: Params::Fixed(parameters.clone()),
                body: Rc::new((**body).clone()),
                env: env.clone(),
            };
            env.define(name.clone(), Value::Closure(closure));
            Ok(None)
        }
        Expr::Call { callee, arguments } => evaluate_call(callee, arguments, env),
    }
}

// Expression positions that need a value (operands, conditions, arguments,
// callees) convert the "no value" outcome into a TypeError.
fn evaluate_value(expr: &Expr, env: &Env) -> Result<Value> {
    evaluate(expr, env)?.ok_or_else(|| Error::Type {
        message: "expression produced no value".to_string(),
    })
}

fn evaluate_binary(left: &Expr, operator: BinaryOp, right: &Expr, env: &Env) -> Result<Value> {
    let left_value = evaluate_value(left, env)?;

    // Short-circuit paths: the right operand is never evaluated
    match operator {
        BinaryOp::Or if is_truthy(&left_value) => return Ok(Value::Boolean(true)),
        BinaryOp::And if !is_truthy(&left_value) => return Ok(Value::Boolean(false)),
        _ => {}
    }

    let right_value = evaluate_value(right, env)?;

    match operator {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => match (&left_value, &right_value) {
            (Value::Integer(a), Value::Integer(b)) => apply_arithmetic(operator, *a, *b),
            _ => operand_error(operator),
        },
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
            match (&left_value, &right_value) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Boolean(match operator {
                    BinaryOp::Less => a < b,
                    BinaryOp::Greater => a > b,
                    BinaryOp::LessEqual => a <= b,
                    _ => a >= b,
                })),
                _ => operand_error(operator),
            }
        }
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let equal = match (&left_value, &right_value) {
                (Value::Integer(a), Value::Integer(b)) => a == b,
                (Value::Boolean(a), Value::Boolean(b)) => a == b,
                _ => return operand_error(operator),
            };
            Ok(Value::Boolean(if operator == BinaryOp::Equal {
                equal
            } else {
                !equal
            }))
        }
        // Outside the short-circuit path the result is determined by the
        // right operand, returned unchanged
        BinaryOp::And | BinaryOp::Or => Ok(right_value),
    }
}

fn apply_arithmetic(operator: BinaryOp, left: i64, right: i64) -> Result<Value> {
    let result = match operator {
        BinaryOp::Add => left + right,
        BinaryOp::Subtract => left - right,
        BinaryOp::Multiply => left * right,
        BinaryOp::Divide => {
            if right == 0 {
                return Err(Error::DivisionByZero);
            }
            floor_div(left, right)
        }
        BinaryOp::Modulo => {
            if right == 0 {
                return Err(Error::DivisionByZero);
            }
            floor_mod(left, right)
        }
        _ => unreachable!(),
    };
    Ok(Value::Integer(result))
}

fn operand_error<T>(operator: BinaryOp) -> Result<T> {
    Err(Error::Type {
        message: format!("invalid operands for '{}'", operator),
    })
}

fn evaluate_call(callee: &Expr, arguments: &[Expr], env: &Env) -> Result<Option<Value>> {
    let callee_value = evaluate_value(callee, env)?;
    let Value::Closure(closure) = callee_value else {
        return Err(Error::Type {
            message: "can only call functions and lambdas".to_string(),
        });
    };

    let mut args = Vec::with_capacity(arguments.len());
    for argument in arguments {
        args.push(evaluate_value(argument, env)?);
    }

    match closure.params {
        Params::Fixed(ref parameters) => {
            if parameters.len() != args.len() {
                return Err(Error::Type {
                    message: format!(
                        "function expected {} arguments but got {}",
                        parameters.len(),
                        args.len()
                    ),
                });
            }

            let frame = closure.env.extend();
            for (parameter, arg) in parameters.iter().zip(args) {
                frame.define(parameter.clone(), arg);
            }

            evaluate(&closure.body, &frame)
        }
        Params::Single(_) => {
            // Currying: one argument at a time, each application extending
            // the captured environment with a single binding. With no
            // arguments the closure is the result.
            let mut result = Some(Value::Closure(closure));

            for arg in args {
                let current = match result {
                    Some(Value::Closure(current)) => current,
                    _ => {
                        return Err(Error::Type {
                            message: "can only call functions and lambdas".to_string(),
                        })
                    }
                };

                let Params::Single(parameter) = &current.params else {
                    return Err(Error::Type {
                        message: "curried application requires a single-parameter lambda"
                            .to_string(),
                    });
                };

                let frame = current.env.extend();
                frame.define(parameter.clone(), arg);
                result = evaluate(&current.body, &frame)?;
            }

            Ok(result)
        }
    }
}

/// Runs the statements of a program in order against one shared
/// environment. Evaluation errors are contained per statement, so the rest
/// of the program still runs. The caller owns the output sink.
pub fn interpret(program: &[Expr], env: &Env) -> Vec<Result<Option<Value>>> {
    program
        .iter()
        .map(|statement| {
            let outcome = evaluate(statement, env);
            if let Err(err) = &outcome {
                debug!("statement failed, continuing: {}", err);
            }
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tokenizer::tokenize;

    fn eval_str(input: &str) -> Vec<Result<Option<Value>>> {
        let tokens = tokenize(input).unwrap();
        let program = parse(&tokens).unwrap();
        interpret(&program, &Env::new())
    }

    // Evaluates a program and unwraps the last statement's value
    fn eval_last(input: &str) -> Value {
        eval_str(input)
            .pop()
            .expect("program had no statements")
            .expect("evaluation failed")
            .expect("statement produced no value")
    }

    fn last_error(input: &str) -> Error {
        eval_str(input)
            .pop()
            .expect("program had no statements")
            .expect_err("evaluation unexpectedly succeeded")
    }

    #[test]
    fn test_integer_literals_evaluate_to_themselves() {
        for value in [0, 1, 42, -7, 1000000] {
            assert_eq!(eval_last(&value.to_string()), Value::Integer(value));
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_last("2 + 3"), Value::Integer(5));
        assert_eq!(eval_last("2 - 3"), Value::Integer(-1));
        assert_eq!(eval_last("6 * 7"), Value::Integer(42));

        // One precedence tier, left to right
        assert_eq!(eval_last("1 + 2 * 3"), Value::Integer(9));
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(eval_last("7 / 2"), Value::Integer(3));
        assert_eq!(eval_last("-7 / 2"), Value::Integer(-4));
        assert_eq!(eval_last("7 / -2"), Value::Integer(-4));
        assert_eq!(eval_last("-7 / -2"), Value::Integer(3));
    }

    #[test]
    fn test_modulo_follows_floor_division() {
        assert_eq!(eval_last("7 % 2"), Value::Integer(1));
        assert_eq!(eval_last("-7 % 2"), Value::Integer(1));
        assert_eq!(eval_last("7 % -2"), Value::Integer(-1));
        assert_eq!(eval_last("-7 % -2"), Value::Integer(-1));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(last_error("1 / 0"), Error::DivisionByZero));
        assert!(matches!(last_error("1 % 0"), Error::DivisionByZero));
    }

    #[test]
    fn test_or_short_circuits() {
        // The right operand would divide by zero if evaluated
        assert_eq!(eval_last("1 == 1 || (1 / 0 == 0)"), Value::Boolean(true));
    }

    #[test]
    fn test_and_short_circuits() {
        assert_eq!(eval_last("1 == 2 && (1 / 0 == 0)"), Value::Boolean(false));
    }

    #[test]
    fn test_boolean_fallback_returns_right_operand() {
        // Outside the short-circuit path the right operand's value comes
        // through unchanged
        assert_eq!(eval_last("2 && 3"), Value::Integer(3));
        assert_eq!(eval_last("0 || 5"), Value::Integer(5));
        assert_eq!(eval_last("False || 7"), Value::Integer(7));
        assert_eq!(eval_last("1 && True"), Value::Boolean(true));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_last("1 < 2"), Value::Boolean(true));
        assert_eq!(eval_last("2 <= 2"), Value::Boolean(true));
        assert_eq!(eval_last("3 > 4"), Value::Boolean(false));
        assert_eq!(eval_last("4 >= 5"), Value::Boolean(false));
        assert_eq!(eval_last("1 == 1"), Value::Boolean(true));
        assert_eq!(eval_last("1 != 1"), Value::Boolean(false));
        assert_eq!(eval_last("True == True"), Value::Boolean(true));
        assert_eq!(eval_last("True != False"), Value::Boolean(true));
    }

    #[test]
    fn test_mixed_operand_kinds_are_type_errors() {
        assert!(matches!(last_error("1 + True"), Error::Type { .. }));
        assert!(matches!(last_error("True < False"), Error::Type { .. }));
        assert!(matches!(last_error("1 == True"), Error::Type { .. }));
    }

    #[test]
    fn test_unary_not() {
        assert_eq!(eval_last("!True"), Value::Boolean(false));
        assert_eq!(eval_last("!False"), Value::Boolean(true));
        assert_eq!(eval_last("!0"), Value::Boolean(true));
        assert_eq!(eval_last("!3"), Value::Boolean(false));
    }

    #[test]
    fn test_if_branches() {
        assert_eq!(eval_last("if True { 1 } else { 2 }"), Value::Integer(1));
        assert_eq!(eval_last("if False { 1 } else { 2 }"), Value::Integer(2));

        // No else and a failed condition: no value
        let results = eval_str("if False { 1 }");
        assert!(matches!(results[0], Ok(None)));

        // Integer conditions use truthiness
        assert_eq!(eval_last("if 3 { 1 } else { 2 }"), Value::Integer(1));
        assert_eq!(eval_last("if 0 { 1 } else { 2 }"), Value::Integer(2));
    }

    #[test]
    fn test_name_error_names_the_identifier() {
        match last_error("nonexistent") {
            Error::Name { name } => assert_eq!(name, "nonexistent"),
            other => panic!("expected name error, got {:?}", other),
        }
    }

    #[test]
    fn test_function_definition_produces_no_value() {
        let results = eval_str("Defun {name: double, arguments: (n,)} n * 2");
        assert!(matches!(results[0], Ok(None)));
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            eval_last("Defun {name: add, arguments: (x, y,)} x + y\nadd(3, 4)"),
            Value::Integer(7)
        );
        assert_eq!(
            eval_last("Defun {name: answer, arguments: ()} 42\nanswer()"),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_recursion_resolves_through_the_defining_frame() {
        let program = "\
            Defun {name: factorial, arguments: (n,)} if n <= 1 { 1 } else { n * factorial(n - 1) }\n\
            factorial(5)";
        assert_eq!(eval_last(program), Value::Integer(120));
    }

    #[test]
    fn test_arity_mismatch_names_expected_and_actual() {
        let program = "Defun {name: add, arguments: (x, y,)} x + y\nadd(1, 2, 3)";
        match last_error(program) {
            Error::Type { message } => {
                assert_eq!(message, "function expected 2 arguments but got 3");
            }
            other => panic!("expected type error, got {:?}", other),
        }

        let program = "Defun {name: add, arguments: (x, y,)} x + y\nadd(1)";
        match last_error(program) {
            Error::Type { message } => {
                assert_eq!(message, "function expected 2 arguments but got 1");
            }
            other => panic!("expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_captured_environment_outlives_the_defining_call() {
        // The lambda returned by make_adder still resolves `n` after the
        // call that created it has returned
        let program = "\
            Defun {name: make_adder, arguments: (n,)} (Lambd x. x + n)\n\
            make_adder(10)(5)";
        assert_eq!(eval_last(program), Value::Integer(15));
    }

    #[test]
    fn test_curried_application() {
        assert_eq!(
            eval_last("(Lambd x. (Lambd y. x + y))(3)(4)"),
            Value::Integer(7)
        );

        // One call with two arguments applies them one at a time
        assert_eq!(
            eval_last("(Lambd x. (Lambd y. x + y))(3, 4)"),
            Value::Integer(7)
        );
    }

    #[test]
    fn test_lambda_applied_to_no_arguments_is_itself() {
        assert!(matches!(
            eval_last("(Lambd x. x)()"),
            Value::Closure(Closure {
                params: Params::Single(_),
                ..
            })
        ));
    }

    #[test]
    fn test_over_application_of_a_lambda_is_a_type_error() {
        // (Lambd x. x)(1) yields 1, which cannot take the next argument
        assert!(matches!(
            last_error("(Lambd x. x)(1)(2)"),
            Error::Type { .. }
        ));
    }

    #[test]
    fn test_calling_a_non_callable_is_a_type_error() {
        let program = "Defun {name: one, arguments: ()} 1\none()()";
        assert!(matches!(last_error(program), Error::Type { .. }));
    }

    #[test]
    fn test_lambda_passed_as_argument() {
        let program = "\
            Defun {name: apply_twice, arguments: (f, x,)} f(f(x))\n\
            Defun {name: increment, arguments: (n,)} n + 1\n\
            apply_twice(increment, 5)";
        assert_eq!(eval_last(program), Value::Integer(7));
    }

    #[test]
    fn test_interpret_contains_errors_per_statement() {
        let results = eval_str("1 / 0\n5");
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(Error::DivisionByZero)));
        assert!(matches!(results[1], Ok(Some(Value::Integer(5)))));
    }

    #[test]
    fn test_environment_survives_an_earlier_failed_statement() {
        // The definition installed before the failure is still usable after
        let results = eval_str(
            "Defun {name: double, arguments: (n,)} n * 2\n\
             missing\n\
             double(4)",
        );
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Ok(None)));
        assert!(matches!(results[1], Err(Error::Name { .. })));
        assert!(matches!(results[2], Ok(Some(Value::Integer(8)))));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(eval_last("42").to_string(), "42");
        assert_eq!(eval_last("-7").to_string(), "-7");
        assert_eq!(eval_last("True").to_string(), "True");
        assert_eq!(eval_last("1 == 2").to_string(), "False");
        assert_eq!(eval_last("(Lambd x. x)").to_string(), "<lambda x>");
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Integer(42), Value::Integer(42));
        assert_ne!(Value::Integer(42), Value::Integer(43));
        assert_eq!(Value::Boolean(true), Value::Boolean(true));
        assert_ne!(Value::Integer(1), Value::Boolean(true));
    }
}
