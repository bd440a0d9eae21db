//! Undo/redo history and the audit log.

use crate::commands::audit::{AuditRecord, Severity};
use crate::commands::Command;
use crate::error::{HistoryDirection, PhotoTagError, Result};
use crate::library::PictureManager;
use tracing::{info, warn};

/// Owns the undo and redo stacks and the append-only audit log.
///
/// One per session. A command is pushed only after it executed successfully;
/// a command whose undo or redo fails stays where it was.
#[derive(Debug, Default)]
pub struct CommandManager {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    audit_log: Vec<AuditRecord>,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a new command. Clears the redo branch.
    pub fn execute(
        &mut self,
        command: impl Into<Command>,
        pictures: &mut PictureManager,
    ) -> Result<AuditRecord> {
        let mut command = command.into();
        command.execute(pictures)?;

        let record = command.audit_record();
        info!("{}", record.message);
        self.audit_log.push(record.clone());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        Ok(record)
    }

    /// Undo the most recent command.
    pub fn undo_recent_command(&mut self, pictures: &mut PictureManager) -> Result<AuditRecord> {
        let mut command = self
            .undo_stack
            .pop()
            .ok_or(PhotoTagError::EmptyHistory(HistoryDirection::Undo))?;

        if let Err(e) = command.undo(pictures) {
            warn!("Undo of '{}' failed: {}", command.description(), e);
            self.undo_stack.push(command);
            return Err(e);
        }

        let record = AuditRecord::undone(command.severity(), &command.description());
        info!("{}", record.message);
        self.audit_log.push(record.clone());
        self.redo_stack.push(command);
        Ok(record)
    }

    /// Redo the most recently undone command.
    pub fn redo_recent_command(&mut self, pictures: &mut PictureManager) -> Result<AuditRecord> {
        let mut command = self
            .redo_stack
            .pop()
            .ok_or(PhotoTagError::EmptyHistory(HistoryDirection::Redo))?;

        if let Err(e) = command.execute(pictures) {
            warn!("Redo of '{}' failed: {}", command.description(), e);
            self.redo_stack.push(command);
            return Err(e);
        }

        let record = AuditRecord::redone(command.severity(), &command.description());
        info!("{}", record.message);
        self.audit_log.push(record.clone());
        self.undo_stack.push(command);
        Ok(record)
    }

    /// Append a record for an action that is not a command (e.g. a deletion).
    pub fn record(&mut self, severity: Severity, message: impl Into<String>) -> AuditRecord {
        let record = AuditRecord::now(severity, message);
        info!("{}", record.message);
        self.audit_log.push(record.clone());
        record
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the command the next undo would reverse.
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    /// Description of the command the next redo would reapply.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }

    pub fn audit_log(&self) -> &[AuditRecord] {
        &self.audit_log
    }

    /// Audit log as text, one record per line.
    pub fn render_log(&self) -> String {
        self.audit_log
            .iter()
            .map(|record| format!("{}\n", record))
            .collect()
    }
}
