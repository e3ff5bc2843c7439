use super::*;
use crate::script::bind::{BindCtx, bind_expr};
use crate::script::parser::parse_expr;
use crate::script::vm::{ValueSlot, VmError, eval_program_with_stack};

fn eval_with_rand(src: &str, mut rand: impl FnMut() -> f64) -> ValueSlot {
    let ast = bind_expr(parse_expr(src).unwrap(), &BindCtx::default()).unwrap();
    let bc = lower_to_bytecode(&ast).unwrap();
    let mut fuel = 1_000;
    eval_program_with_stack(
        &bc,
        &mut Vec::new(),
        &mut fuel,
        |_| Err(VmError::new("no environment")),
        &mut rand,
    )
    .unwrap()
}

fn eval(src: &str) -> ValueSlot {
    eval_with_rand(src, || 0.0)
}

#[test]
fn lowers_and_evaluates_arithmetic() {
    assert_eq!(eval("(1+2)*3"), ValueSlot::F64(9.0));
    assert_eq!(eval("7 % 4 - -1"), ValueSlot::F64(4.0));
}

#[test]
fn lowers_and_evaluates_builtins() {
    assert_eq!(eval("clamp(-1, 0, 10)"), ValueSlot::F64(0.0));
    assert_eq!(eval("lerp(10, 20, 0.25)"), ValueSlot::F64(12.5));
    assert_eq!(eval("pow(2, 10)"), ValueSlot::F64(1024.0));
    assert_eq!(eval("floor(2.7) + ceil(0.2)"), ValueSlot::F64(3.0));
}

#[test]
fn conditional_picks_branch() {
    assert_eq!(eval("2 > 1 ? 10 : 20"), ValueSlot::F64(10.0));
    assert_eq!(eval("2 < 1 ? 10 : 20"), ValueSlot::F64(20.0));
    assert_eq!(eval("false ? 1 : true ? 2 : 3"), ValueSlot::F64(2.0));
}

#[test]
fn conditional_only_evaluates_taken_branch() {
    let mut calls = 0;
    let v = eval_with_rand("1 > 0 ? rand() : rand() + rand()", || {
        calls += 1;
        0.5
    });
    assert_eq!(v, ValueSlot::F64(0.5));
    assert_eq!(calls, 1);
}

#[test]
fn comparisons_and_logic_produce_bools() {
    assert_eq!(eval("1 < 2 && 3 >= 3"), ValueSlot::Bool(true));
    assert_eq!(eval("!(1 == 1) || 2 != 2"), ValueSlot::Bool(false));
}
