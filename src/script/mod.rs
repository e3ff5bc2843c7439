//! Template documents.
//!
//! Dynamic templates are data, never code: a JSON [`TemplateDocument`](document::TemplateDocument)
//! holds metadata, a parameter schema and a list of drawing instructions whose numeric operands
//! are small arithmetic expressions. Expressions are lexed, parsed, bound against the names a
//! template may see, lowered to bytecode and evaluated on a stack VM with an instruction
//! budget.

pub(crate) mod ast;
pub(crate) mod bind;
pub(crate) mod bytecode;
pub(crate) mod compile;
pub(crate) mod document;
pub(crate) mod error;
pub(crate) mod lexer;
pub(crate) mod lower;
pub(crate) mod parser;
pub(crate) mod run;
pub(crate) mod vm;

pub use compile::DocumentCompiler;
