//! Undo, redo and the audit log.

use crate::commands::AuditRecord;
use crate::error::Result;
use crate::PhotoTagApi;

impl PhotoTagApi {
    pub fn undo(&mut self) -> Result<AuditRecord> {
        self.history.undo_recent_command(&mut self.manager)
    }

    pub fn redo(&mut self) -> Result<AuditRecord> {
        self.history.redo_recent_command(&mut self.manager)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn audit_log(&self) -> &[AuditRecord] {
        self.history.audit_log()
    }

    /// Audit log as text, one record per line.
    pub fn render_log(&self) -> String {
        self.history.render_log()
    }
}
