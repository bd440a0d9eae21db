//! Line commands and their dispatch onto the phototag API.

use anyhow::{anyhow, bail, Context, Result};
use phototag_core::{PhotoTagApi, PhotoTagError, PictureId, PictureInfo};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::debug;

pub const HELP: &str = "\
Commands (<n> is the number shown by the last list/search):
  open <dir> [-r]           open a directory (-r: include subdirectories)
  list                      list pictures in the open directory
  search <tag>              list pictures carrying a tag
  tags                      list available tags
  add <n> <tag>             add a tag to a picture
  remove <n> <tag>...       remove tags from a picture
  rename-tag <old> <new>    rename a tag on every picture
  rename <n> <words>...     rename a picture, keeping its tags
  move <n> <dir>            move a picture to another directory
  delete <n>                delete a picture's file (cannot be undone)
  undo | redo               step through the history
  log                       show the audit log and the next undo/redo
  history                   show every picture seen so far
  save                      save settings now
  help                      show this help
  quit                      save and exit
";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Open { dir: PathBuf, recursive: bool },
    List,
    Search(String),
    Tags,
    Add { index: usize, tag: String },
    Remove { index: usize, tags: Vec<String> },
    RenameTag { old: String, new: String },
    Rename { index: usize, name: String },
    Move { index: usize, dir: PathBuf },
    Delete(usize),
    Undo,
    Redo,
    Log,
    History,
    Save,
    Help,
    Quit,
}

/// What the caller should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>> {
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = tokens.collect();

    let command = match name {
        "open" => {
            let (recursive, rest) = match args.split_last() {
                Some((&"-r", rest)) | Some((&"--recursive", rest)) => (true, rest),
                _ => (false, &args[..]),
            };
            ReplCommand::Open {
                dir: PathBuf::from(joined(rest, "open <dir> [-r]")?),
                recursive,
            }
        }
        "list" | "ls" => ReplCommand::List,
        "search" => ReplCommand::Search(args.join(" ")),
        "tags" => ReplCommand::Tags,
        "add" => match args.as_slice() {
            [n, tag] => ReplCommand::Add {
                index: index(n)?,
                tag: tag.to_string(),
            },
            _ => bail!("usage: add <n> <tag>"),
        },
        "remove" | "rm" => match args.split_first() {
            Some((n, tags)) if !tags.is_empty() => ReplCommand::Remove {
                index: index(n)?,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
            _ => bail!("usage: remove <n> <tag>..."),
        },
        "rename-tag" => match args.as_slice() {
            [old, new] => ReplCommand::RenameTag {
                old: old.to_string(),
                new: new.to_string(),
            },
            _ => bail!("usage: rename-tag <old> <new>"),
        },
        "rename" => match args.split_first() {
            Some((n, words)) => ReplCommand::Rename {
                index: index(n)?,
                name: joined(words, "rename <n> <words>...")?,
            },
            None => bail!("usage: rename <n> <words>..."),
        },
        "move" | "mv" => match args.split_first() {
            Some((n, dir)) => ReplCommand::Move {
                index: index(n)?,
                dir: PathBuf::from(joined(dir, "move <n> <dir>")?),
            },
            None => bail!("usage: move <n> <dir>"),
        },
        "delete" => match args.as_slice() {
            [n] => ReplCommand::Delete(index(n)?),
            _ => bail!("usage: delete <n>"),
        },
        "undo" => ReplCommand::Undo,
        "redo" => ReplCommand::Redo,
        "log" => ReplCommand::Log,
        "history" => ReplCommand::History,
        "save" => ReplCommand::Save,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => bail!("unknown command '{}'; try 'help'", other),
    };
    Ok(Some(command))
}

fn index(token: &str) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!("'{}' is not a picture number", token),
    }
}

fn joined(words: &[&str], usage: &str) -> Result<String> {
    if words.is_empty() {
        bail!("usage: {}", usage);
    }
    Ok(words.join(" "))
}

/// Whether an error came from bad input rather than the environment.
pub fn is_user_error(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<PhotoTagError>() {
        Some(e) => e.is_user_error(),
        // Parse and lookup errors raised here are all input errors
        None => true,
    }
}

/// The interactive session: the API plus the last listing.
pub struct Session {
    api: PhotoTagApi,
    listing: Vec<PictureId>,
}

impl Session {
    pub fn new(api: PhotoTagApi) -> Self {
        Self {
            api,
            listing: Vec::new(),
        }
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        match parse_line(line)? {
            Some(command) => self.dispatch(command).await,
            None => Ok(Outcome::Continue(String::new())),
        }
    }

    pub async fn dispatch(&mut self, command: ReplCommand) -> Result<Outcome> {
        debug!("Dispatching {:?}", command);
        let output = match command {
            ReplCommand::Open { dir, recursive } => self.open(dir, recursive).await?,
            ReplCommand::List => {
                let pictures = self.api.pictures();
                self.show(pictures)
            }
            ReplCommand::Search(label) => {
                let pictures = self.api.search(&label);
                self.show(pictures)
            }
            ReplCommand::Tags => {
                let tags = self.api.available_tags();
                if tags.is_empty() {
                    "No tags.\n".to_string()
                } else {
                    tags.iter().map(|t| format!("@{}\n", t)).collect()
                }
            }
            ReplCommand::Add { index, tag } => {
                let id = self.picture_at(index)?;
                line(self.api.add_tag(id, &tag)?.message)
            }
            ReplCommand::Remove { index, tags } => {
                let id = self.picture_at(index)?;
                line(self.api.remove_tags(id, &tags)?.message)
            }
            ReplCommand::RenameTag { old, new } => line(self.api.rename_tag(&old, &new)?.message),
            ReplCommand::Rename { index, name } => {
                let id = self.picture_at(index)?;
                line(self.api.rename_picture(id, &name)?.message)
            }
            ReplCommand::Move { index, dir } => {
                let id = self.picture_at(index)?;
                line(self.api.move_picture(id, &dir)?.message)
            }
            ReplCommand::Delete(index) => {
                let id = self.picture_at(index)?;
                let record = self.api.delete_picture(id)?;
                self.listing.retain(|p| *p != id);
                line(record.message)
            }
            ReplCommand::Undo => line(self.api.undo()?.message),
            ReplCommand::Redo => line(self.api.redo()?.message),
            ReplCommand::Log => {
                let mut log = self.api.render_log();
                if log.is_empty() {
                    log.push_str("Log is empty.\n");
                }
                let history = self.api.history();
                if let Some(next) = history.undo_description() {
                    writeln!(log, "Next undo: {}", next)?;
                }
                if let Some(next) = history.redo_description() {
                    writeln!(log, "Next redo: {}", next)?;
                }
                log
            }
            ReplCommand::History => {
                let mut out = String::new();
                for record in self.api.historical_pictures() {
                    writeln!(out, "{}", record.path.display())?;
                }
                out
            }
            ReplCommand::Save => {
                self.save()?;
                format!("Saved {}\n", self.api.settings_path().display())
            }
            ReplCommand::Help => HELP.to_string(),
            ReplCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(output))
    }

    /// Scan on a blocking worker, then install the finished manager.
    pub async fn open(&mut self, dir: PathBuf, recursive: bool) -> Result<String> {
        let scanner = self.api.scanner();
        let scan_dir = dir.clone();
        let manager = tokio::task::spawn_blocking(move || scanner.scan(&scan_dir, recursive))
            .await
            .context("Directory scan worker failed")??;
        self.api.install_manager(manager);

        let pictures = self.api.pictures();
        let mut out = format!(
            "Opened {} ({} pictures)\n",
            self.api.root().unwrap_or(dir.as_path()).display(),
            pictures.len()
        );
        out.push_str(&self.show(pictures));
        Ok(out)
    }

    pub fn save(&mut self) -> Result<()> {
        Ok(self.api.save()?)
    }

    fn show(&mut self, pictures: Vec<PictureInfo>) -> String {
        self.listing = pictures.iter().map(|p| p.id).collect();
        if pictures.is_empty() {
            return "No pictures.\n".to_string();
        }
        pictures
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:>4}. {}\n", i + 1, p.file_name))
            .collect()
    }

    fn picture_at(&self, index: usize) -> Result<PictureId> {
        index
            .checked_sub(1)
            .and_then(|i| self.listing.get(i))
            .copied()
            .ok_or_else(|| anyhow!("no picture #{} in the last listing; run 'list'", index))
    }
}

fn line(message: String) -> String {
    format!("{}\n", message)
}
