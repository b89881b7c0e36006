//! The mutable context threaded through every statement handler.

use crate::config::ParserConfig;
use crate::model::SchemaModel;
use crate::parser::error::ParseWarning;
use crate::parser::pending::PendingAttachments;

pub struct HandlerCtx<'a> {
    pub config: &'a ParserConfig,
    pub model: &'a mut SchemaModel,
    pub pending: &'a mut PendingAttachments,
    pub warnings: &'a mut Vec<ParseWarning>,
    pub line: usize,
}

impl<'a> HandlerCtx<'a> {
    pub fn warn(&mut self, message: impl Into<String>) {
        let warning = ParseWarning::new(message, Some(self.line));
        tracing::warn!(line = self.line, message = %warning.message, "parse warning");
        self.warnings.push(warning);
    }

    pub fn default_schema(&self) -> String {
        self.config.default_schema.clone()
    }
}
