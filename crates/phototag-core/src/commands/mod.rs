//! Reversible mutations and the undo/redo history.
//!
//! Every change to pictures or tags is a [`Command`] executed through the
//! [`CommandManager`]. Commands capture what they need to reverse themselves
//! the first time they run; the manager keeps the two-stack history and the
//! audit log.

mod audit;
mod history;
mod picture_commands;
mod tag_commands;

pub use audit::{AuditRecord, Severity};
pub use history::CommandManager;
pub use picture_commands::{MovePicture, RenamePicture};
pub use tag_commands::{AddTagToPicture, DeleteTagsFromPicture, RenameTag};

use crate::error::Result;
use crate::library::PictureManager;

/// A reversible mutation.
#[derive(Debug, Clone)]
pub enum Command {
    AddTag(AddTagToPicture),
    DeleteTags(DeleteTagsFromPicture),
    RenameTag(RenameTag),
    RenamePicture(RenamePicture),
    MovePicture(MovePicture),
}

impl Command {
    /// Apply the mutation. Also used for redo.
    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        match self {
            Command::AddTag(cmd) => cmd.execute(pictures),
            Command::DeleteTags(cmd) => cmd.execute(pictures),
            Command::RenameTag(cmd) => cmd.execute(pictures),
            Command::RenamePicture(cmd) => cmd.execute(pictures),
            Command::MovePicture(cmd) => cmd.execute(pictures),
        }
    }

    /// Reverse the last execute.
    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        match self {
            Command::AddTag(cmd) => cmd.undo(pictures),
            Command::DeleteTags(cmd) => cmd.undo(pictures),
            Command::RenameTag(cmd) => cmd.undo(pictures),
            Command::RenamePicture(cmd) => cmd.undo(pictures),
            Command::MovePicture(cmd) => cmd.undo(pictures),
        }
    }

    /// Human-readable description of what the command did.
    pub fn description(&self) -> String {
        match self {
            Command::AddTag(cmd) => cmd.description(),
            Command::DeleteTags(cmd) => cmd.description(),
            Command::RenameTag(cmd) => cmd.description(),
            Command::RenamePicture(cmd) => cmd.description(),
            Command::MovePicture(cmd) => cmd.description(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Command::AddTag(cmd) => cmd.severity(),
            Command::DeleteTags(cmd) => cmd.severity(),
            Command::RenameTag(cmd) => cmd.severity(),
            Command::RenamePicture(cmd) => cmd.severity(),
            Command::MovePicture(cmd) => cmd.severity(),
        }
    }

    /// Audit record for the command's last execute.
    pub fn audit_record(&self) -> AuditRecord {
        AuditRecord::now(self.severity(), self.description())
    }
}

impl From<AddTagToPicture> for Command {
    fn from(cmd: AddTagToPicture) -> Self {
        Command::AddTag(cmd)
    }
}

impl From<DeleteTagsFromPicture> for Command {
    fn from(cmd: DeleteTagsFromPicture) -> Self {
        Command::DeleteTags(cmd)
    }
}

impl From<RenameTag> for Command {
    fn from(cmd: RenameTag) -> Self {
        Command::RenameTag(cmd)
    }
}

impl From<RenamePicture> for Command {
    fn from(cmd: RenamePicture) -> Self {
        Command::RenamePicture(cmd)
    }
}

impl From<MovePicture> for Command {
    fn from(cmd: MovePicture) -> Self {
        Command::MovePicture(cmd)
    }
}
