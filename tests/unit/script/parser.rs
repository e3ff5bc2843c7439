use super::*;

#[test]
fn parses_arithmetic_precedence() {
    let e = parse_expr("1+2*3").unwrap();
    match e {
        Expr::Binary {
            op: BinaryOp::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        )),
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn parses_conditional_right_associative() {
    let e = parse_expr("a ? 1 : b ? 2 : 3").unwrap();
    match e {
        Expr::Cond { otherwise, .. } => assert!(matches!(*otherwise, Expr::Cond { .. })),
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn conditional_binds_looser_than_or() {
    let e = parse_expr("a || b ? 1 : 0").unwrap();
    match e {
        Expr::Cond { cond, .. } => assert!(matches!(
            *cond,
            Expr::Binary {
                op: BinaryOp::Or,
                ..
            }
        )),
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn parses_paths() {
    let e = parse_expr("params.barCount").unwrap();
    assert_eq!(
        e,
        Expr::Path(vec!["params".to_owned(), "barCount".to_owned()])
    );
}

#[test]
fn parses_calls() {
    let e = parse_expr("min(1, max(2, 3))").unwrap();
    match e {
        Expr::Call { func, args } => {
            assert_eq!(func, "min");
            assert_eq!(args.len(), 2);
        }
        other => panic!("unexpected ast: {other:?}"),
    }
}

#[test]
fn rejects_dotted_call_targets() {
    assert!(parse_expr("params.x(1)").is_err());
    assert!(parse_expr("(1)(2)").is_err());
}

#[test]
fn rejects_trailing_tokens_and_missing_colon() {
    assert!(parse_expr("1 2").is_err());
    assert!(parse_expr("a ? 1").is_err());
    assert!(parse_expr("").is_err());
}

#[test]
fn limits_nesting_depth() {
    let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    let err = parse_expr(&deep).unwrap_err();
    assert!(err.message.contains("nested too deeply"));

    let ok = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    assert_eq!(parse_expr(&ok).unwrap(), Expr::Lit(Lit::F64(1.0)));
}
