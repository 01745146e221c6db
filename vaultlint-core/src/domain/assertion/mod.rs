// vaultlint-core/src/domain/assertion/mod.rs

//! Restricted boolean-expression evaluator for rule assertions.
//!
//! The context exposes the normalized query rows plus a closed set of
//! aggregate functions. There is no access to ambient state, no method
//! calls and no user-defined functions.

pub mod parser;

use crate::domain::error::DomainError;
use crate::domain::query::QueryData;
use parser::{ArithOp, CmpOp, Expr, Parser};
use serde_json::{Map, Number, Value};

const FUNCTIONS: [&str; 6] = ["len", "any", "all", "sum", "min", "max"];

/// Evaluates `assertion` against the query data and rule variables,
/// coercing the final value to a boolean via JSON truthiness.
pub fn evaluate(
    assertion: &str,
    data: &QueryData,
    variables: &Map<String, Value>,
) -> Result<bool, DomainError> {
    let expr = Parser::parse(assertion)?;
    let context = Context::new(data, variables);
    let value = context.eval(&expr)?;
    Ok(truthy(&value))
}

struct Context<'a> {
    data: &'a QueryData,
    variables: &'a Map<String, Value>,
}

impl<'a> Context<'a> {
    fn new(data: &'a QueryData, variables: &'a Map<String, Value>) -> Self {
        Context { data, variables }
    }

    fn lookup(&self, name: &str) -> Result<Value, DomainError> {
        match name {
            "results" => Ok(Value::Array(
                self.data
                    .rows
                    .iter()
                    .map(|row| Value::Object(row.clone()))
                    .collect(),
            )),
            "count" | "result_count" => Ok(Value::from(self.data.row_count())),
            "is_empty" => Ok(Value::Bool(self.data.is_empty())),
            _ => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| DomainError::AssertionName(format!("name '{name}' is not defined"))),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value, DomainError> {
        match expr {
            Expr::Number(n) => Ok(number(*n)?),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => self.lookup(name),
            Expr::Not(inner) => Ok(Value::Bool(!truthy(&self.eval(inner)?))),
            Expr::And(left, right) => {
                // Short-circuit, result is always a plain bool.
                if !truthy(&self.eval(left)?) {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(truthy(&self.eval(right)?)))
            }
            Expr::Or(left, right) => {
                if truthy(&self.eval(left)?) {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(truthy(&self.eval(right)?)))
            }
            Expr::Cmp(op, left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                compare(*op, &left, &right).map(Value::Bool)
            }
            Expr::Arith(op, left, right) => {
                let left = as_number(&self.eval(left)?)?;
                let right = as_number(&self.eval(right)?)?;
                let out = match op {
                    ArithOp::Add => left + right,
                    ArithOp::Sub => left - right,
                    ArithOp::Mul => left * right,
                    ArithOp::Div => {
                        if right == 0.0 {
                            return Err(DomainError::AssertionEval(
                                "division by zero".to_string(),
                            ));
                        }
                        left / right
                    }
                };
                number(out)
            }
            Expr::Neg(inner) => {
                let n = as_number(&self.eval(inner)?)?;
                number(-n)
            }
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value, DomainError> {
        if !FUNCTIONS.contains(&name) {
            return Err(DomainError::AssertionName(format!(
                "function '{name}' is not defined"
            )));
        }
        if args.len() != 1 {
            return Err(DomainError::AssertionEval(format!(
                "{name}() takes exactly one argument, got {}",
                args.len()
            )));
        }
        let arg = self.eval(&args[0])?;

        match name {
            "len" => match &arg {
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::String(s) => Ok(Value::from(s.chars().count())),
                Value::Object(map) => Ok(Value::from(map.len())),
                other => Err(DomainError::AssertionEval(format!(
                    "len() expects a list, string or mapping, got {}",
                    type_name(other)
                ))),
            },
            "any" => {
                let items = as_array(&arg, "any")?;
                Ok(Value::Bool(items.iter().any(truthy)))
            }
            "all" => {
                let items = as_array(&arg, "all")?;
                Ok(Value::Bool(items.iter().all(truthy)))
            }
            "sum" => {
                let items = as_array(&arg, "sum")?;
                let mut total = 0.0;
                for item in items {
                    total += as_number(item)?;
                }
                number(total)
            }
            "min" | "max" => {
                let items = as_array(&arg, name)?;
                if items.is_empty() {
                    return Err(DomainError::AssertionEval(format!(
                        "{name}() of an empty sequence"
                    )));
                }
                let mut best = as_number(&items[0])?;
                for item in &items[1..] {
                    let n = as_number(item)?;
                    if (name == "min" && n < best) || (name == "max" && n > best) {
                        best = n;
                    }
                }
                number(best)
            }
            _ => unreachable!("allowlist checked above"),
        }
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn number(n: f64) -> Result<Value, DomainError> {
    if n.fract() == 0.0 && n.abs() < (i64::MAX as f64) {
        return Ok(Value::from(n as i64));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| DomainError::AssertionEval(format!("non-finite number {n}")))
}

fn as_number(value: &Value) -> Result<f64, DomainError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            DomainError::AssertionEval(format!("number {n} is not representable"))
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(DomainError::AssertionEval(format!(
            "expected a number, got {}",
            type_name(other)
        ))),
    }
}

fn as_array<'v>(value: &'v Value, func: &str) -> Result<&'v Vec<Value>, DomainError> {
    value.as_array().ok_or_else(|| {
        DomainError::AssertionEval(format!(
            "{func}() expects a list, got {}",
            type_name(value)
        ))
    })
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, DomainError> {
    match op {
        CmpOp::Eq | CmpOp::Ne => {
            // Structural equality, with numeric coercion so 2 == 2.0 holds.
            let equal = match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => left == right,
            };
            Ok(if op == CmpOp::Eq { equal } else { !equal })
        }
        _ => {
            let ordering = match (left, right) {
                (Value::Number(_), Value::Number(_)) => {
                    let (a, b) = (as_number(left)?, as_number(right)?);
                    a.partial_cmp(&b).ok_or_else(|| {
                        DomainError::AssertionEval("numbers are not comparable".to_string())
                    })?
                }
                (Value::String(a), Value::String(b)) => a.cmp(b),
                (a, b) => {
                    return Err(DomainError::AssertionEval(format!(
                        "cannot order {} and {}",
                        type_name(a),
                        type_name(b)
                    )));
                }
            };
            Ok(match op {
                CmpOp::Lt => ordering.is_lt(),
                CmpOp::Le => ordering.is_le(),
                CmpOp::Gt => ordering.is_gt(),
                CmpOp::Ge => ordering.is_ge(),
                CmpOp::Eq | CmpOp::Ne => unreachable!(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::query::QueryKind;
    use serde_json::json;

    fn list_data(values: Value) -> QueryData {
        QueryData::from_value(Some(&values), QueryKind::List)
    }

    fn no_vars() -> Map<String, Value> {
        Map::new()
    }

    #[test]
    fn test_count_comparison() {
        let data = list_data(json!(["a.md", "b.md"]));
        assert!(evaluate("count == 2", &data, &no_vars()).unwrap());
        assert!(!evaluate("count == 0", &data, &no_vars()).unwrap());
        assert!(evaluate("result_count == 2", &data, &no_vars()).unwrap());
    }

    #[test]
    fn test_is_empty_alias() {
        let empty = QueryData::from_value(None, QueryKind::List);
        assert!(evaluate("is_empty", &empty, &no_vars()).unwrap());
        assert!(evaluate("not is_empty or count == 0", &empty, &no_vars()).unwrap());
    }

    #[test]
    fn test_boolean_connectives_short_circuit() {
        let data = list_data(json!([1]));
        // Right side would be a name error if evaluated.
        assert!(evaluate("count == 1 or missing_var", &data, &no_vars()).unwrap());
        assert!(!evaluate("count == 0 and missing_var", &data, &no_vars()).unwrap());
    }

    #[test]
    fn test_rule_variables_in_scope() {
        let data = list_data(json!([1, 2, 3]));
        let mut vars = Map::new();
        vars.insert("max_count".to_string(), json!(5));
        assert!(evaluate("count <= max_count", &data, &vars).unwrap());
    }

    #[test]
    fn test_len_of_results() {
        let data = list_data(json!(["a", "b", "c"]));
        assert!(evaluate("len(results) == 3", &data, &no_vars()).unwrap());
    }

    #[test]
    fn test_aggregates() {
        let data = QueryData::from_value(None, QueryKind::List);
        let mut vars = Map::new();
        vars.insert("sizes".to_string(), json!([3, 1, 2]));
        assert!(evaluate("sum(sizes) == 6", &data, &vars).unwrap());
        assert!(evaluate("min(sizes) == 1 and max(sizes) == 3", &data, &vars).unwrap());
        assert!(evaluate("any(sizes)", &data, &vars).unwrap());
        assert!(evaluate("all(sizes)", &data, &vars).unwrap());
    }

    #[test]
    fn test_undefined_name_is_name_error() {
        let data = QueryData::from_value(None, QueryKind::List);
        let err = evaluate("unknown > 1", &data, &no_vars()).unwrap_err();
        assert!(matches!(err, DomainError::AssertionName(_)));
        assert_eq!(err.kind(), "name");
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        let data = QueryData::from_value(None, QueryKind::List);
        let err = evaluate("open('/etc/passwd')", &data, &no_vars()).unwrap_err();
        assert!(matches!(err, DomainError::AssertionName(_)));
    }

    #[test]
    fn test_malformed_is_syntax_error() {
        let data = QueryData::from_value(None, QueryKind::List);
        let err = evaluate("count >< 5", &data, &no_vars()).unwrap_err();
        assert_eq!(err.kind(), "syntax");
    }

    #[test]
    fn test_type_error_is_eval_error() {
        let data = list_data(json!(["a"]));
        let err = evaluate("results > 1", &data, &no_vars()).unwrap_err();
        assert_eq!(err.kind(), "eval");
    }

    #[test]
    fn test_division_by_zero() {
        let data = QueryData::from_value(None, QueryKind::List);
        let err = evaluate("1 / 0 == 1", &data, &no_vars()).unwrap_err();
        assert!(matches!(err, DomainError::AssertionEval(_)));
    }

    #[test]
    fn test_arithmetic_in_comparison() {
        let data = list_data(json!([1, 2, 3, 4]));
        assert!(evaluate("count * 2 == 8", &data, &no_vars()).unwrap());
        assert!(evaluate("count - 1 >= 3 or count < 2 + 3", &data, &no_vars()).unwrap());
    }

    #[test]
    fn test_string_comparison() {
        let data = QueryData::from_value(None, QueryKind::List);
        let mut vars = Map::new();
        vars.insert("status".to_string(), json!("draft"));
        assert!(evaluate("status == \"draft\"", &data, &vars).unwrap());
        assert!(evaluate("status != 'published'", &data, &vars).unwrap());
        assert!(evaluate("status < 'final'", &data, &vars).unwrap());
    }

    #[test]
    fn test_numeric_equality_coercion() {
        let data = QueryData::from_value(None, QueryKind::List);
        let mut vars = Map::new();
        vars.insert("threshold".to_string(), json!(2.0));
        assert!(evaluate("threshold == 2", &data, &vars).unwrap());
    }
}
