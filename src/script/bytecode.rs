#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstIdx(pub(crate) u32);

/// Index into the evaluation environment of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Slot(pub(crate) u32);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConstVal {
    F64(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinId {
    Sin,
    Cos,
    Tan,
    Atan2,
    Abs,
    Min,
    Max,
    Clamp,
    Lerp,
    Floor,
    Ceil,
    Round,
    Sqrt,
    Pow,
    Rand,
}

impl BuiltinId {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "atan2" => Self::Atan2,
            "abs" => Self::Abs,
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "lerp" => Self::Lerp,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            "rand" => Self::Rand,
            _ => return None,
        })
    }

    pub(crate) fn arity(self) -> usize {
        match self {
            Self::Rand => 0,
            Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Abs
            | Self::Floor
            | Self::Ceil
            | Self::Round
            | Self::Sqrt => 1,
            Self::Atan2 | Self::Min | Self::Max | Self::Pow => 2,
            Self::Clamp | Self::Lerp => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    PushConst(ConstIdx),
    Load(Slot),

    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,

    /// Pop a bool; continue at the target op index when it is false.
    JumpIfFalse(u32),
    Jump(u32),

    CallBuiltin(BuiltinId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BytecodeProgram {
    pub(crate) ops: Vec<Op>,
    pub(crate) consts: Vec<ConstVal>,
}

impl BytecodeProgram {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            consts: Vec::new(),
        }
    }

    pub(crate) fn push_const(&mut self, c: ConstVal) -> ConstIdx {
        let idx = ConstIdx(self.consts.len() as u32);
        self.consts.push(c);
        idx
    }

    pub(crate) fn uses_rand(&self) -> bool {
        self.ops.contains(&Op::CallBuiltin(BuiltinId::Rand))
    }
}
