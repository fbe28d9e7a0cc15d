use ml2c_core::Ml2cError;
use std::fmt::{self, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error(transparent)]
    Model(#[from] Ml2cError),
    #[error("test vector {index} has {actual} values, model expects {expected}")]
    TestVector {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unexpected harness output: {0}")]
    HarnessOutput(String),
    #[error("formatting error: {0}")]
    Format(#[from] fmt::Error),
}

pub type EmitResult<T = ()> = Result<T, EmitError>;

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "    ".to_string(),
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn nested(&self) -> Self {
        let mut ctx = self.clone();
        ctx.indent();
        ctx
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A code generator for one piece of the output file.
///
/// Emitters append to a caller-owned buffer and never keep output between calls.
pub trait Emitter {
    type Item;

    fn emit(&self, item: &Self::Item, out: &mut String, context: &mut EmitContext) -> EmitResult;

    fn emit_to_string(&self, item: &Self::Item) -> EmitResult<String> {
        let mut buffer = String::new();
        let mut context = EmitContext::new();
        self.emit(item, &mut buffer, &mut context)?;
        Ok(buffer)
    }
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line(out: &mut String, context: &EmitContext, text: &str) -> EmitResult {
        writeln!(out, "{}{}", context.get_indent(), text)?;
        Ok(())
    }

    pub fn blank_line(out: &mut String) {
        out.push('\n');
    }

    pub fn write_block<F>(
        out: &mut String,
        context: &mut EmitContext,
        header: &str,
        body: F,
    ) -> EmitResult
    where
        F: FnOnce(&mut String, &mut EmitContext) -> EmitResult,
    {
        Self::write_line(out, context, &format!("{} {{", header))?;
        context.indent();
        body(out, context)?;
        context.dedent();
        Self::write_line(out, context, "}")?;
        Ok(())
    }
}
