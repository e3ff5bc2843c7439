use super::*;
use crate::script::bytecode::ConstIdx;

fn program(ops: Vec<Op>, consts: Vec<ConstVal>) -> BytecodeProgram {
    BytecodeProgram { ops, consts }
}

fn run(p: &BytecodeProgram, fuel: &mut u64) -> Result<ValueSlot, VmError> {
    eval_program_with_stack(
        p,
        &mut Vec::new(),
        fuel,
        |slot| Ok(ValueSlot::F64(f64::from(slot.0) * 10.0)),
        || 0.5,
    )
}

#[test]
fn loads_slots_through_callback() {
    let p = program(
        vec![Op::Load(Slot(2)), Op::Load(Slot(3)), Op::Add],
        vec![],
    );
    assert_eq!(run(&p, &mut 10).unwrap(), ValueSlot::F64(50.0));
}

#[test]
fn charges_one_unit_per_op() {
    let p = program(
        vec![Op::Load(Slot(1)), Op::Load(Slot(1)), Op::Mul],
        vec![],
    );
    let mut fuel = 5;
    run(&p, &mut fuel).unwrap();
    assert_eq!(fuel, 2);

    let mut fuel = 2;
    let err = run(&p, &mut fuel).unwrap_err();
    assert_eq!(err.message, BUDGET_EXHAUSTED);
}

#[test]
fn arithmetic_on_bools_is_an_error() {
    let p = program(
        vec![
            Op::PushConst(ConstIdx(0)),
            Op::PushConst(ConstIdx(1)),
            Op::Add,
        ],
        vec![ConstVal::Bool(true), ConstVal::F64(1.0)],
    );
    assert!(run(&p, &mut 10).is_err());
}

#[test]
fn numbers_are_truthy_when_nonzero() {
    assert!(ValueSlot::F64(2.0).truthy());
    assert!(!ValueSlot::F64(0.0).truthy());
    assert!(!ValueSlot::F64(f64::NAN).truthy());
    assert!(ValueSlot::Bool(true).truthy());
}

#[test]
fn clamp_with_inverted_bounds_does_not_panic() {
    let p = program(
        vec![
            Op::PushConst(ConstIdx(0)),
            Op::PushConst(ConstIdx(1)),
            Op::PushConst(ConstIdx(2)),
            Op::CallBuiltin(BuiltinId::Clamp),
        ],
        vec![ConstVal::F64(5.0), ConstVal::F64(10.0), ConstVal::F64(0.0)],
    );
    assert_eq!(run(&p, &mut 10).unwrap(), ValueSlot::F64(0.0));
}

#[test]
fn round_goes_half_up() {
    assert_eq!(round_half_up(2.5), 3.0);
    assert_eq!(round_half_up(-2.5), -2.0);
    assert_eq!(round_half_up(-2.6), -3.0);
}

#[test]
fn unbalanced_program_is_rejected() {
    let p = program(
        vec![Op::PushConst(ConstIdx(0)), Op::PushConst(ConstIdx(0))],
        vec![ConstVal::F64(1.0)],
    );
    assert!(run(&p, &mut 10).is_err());
    assert!(run(&program(vec![], vec![]), &mut 10).is_err());
}
