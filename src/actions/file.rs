//! File actions: create, replace or delete a whole file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::{missing, unsupported, ActionConfig, Arguments};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::variables;

/// Source file content, read once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = fs::read(&path)
            .map_err(|e| Error::io(format!("failed to read file {}", path.display()), e))?;
        Ok(Self { path, data })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Create(SourceFile),
    Replace(SourceFile),
    CreateOrReplace(SourceFile),
    Delete,
}

impl FileOp {
    pub fn type_name(&self) -> &'static str {
        match self {
            FileOp::Create(_) => "createFile",
            FileOp::Replace(_) => "replaceFile",
            FileOp::CreateOrReplace(_) => "createOrReplaceFile",
            FileOp::Delete => "deleteFile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAction {
    op: FileOp,
    dst: String,
}

pub(super) fn parse(config: &ActionConfig) -> Result<FileAction> {
    if config.dst_path.is_empty() {
        return Err(missing("destination path", "file"));
    }

    let source = || -> Result<SourceFile> {
        if config.src_path.is_empty() {
            return Err(missing("source path", "file"));
        }
        SourceFile::read(&config.src_path)
    };
    let op = match config.r#type.as_str() {
        "createFile" => FileOp::Create(source()?),
        "replaceFile" => FileOp::Replace(source()?),
        "createOrReplaceFile" => FileOp::CreateOrReplace(source()?),
        "deleteFile" => FileOp::Delete,
        other => return Err(unsupported(other)),
    };

    Ok(FileAction {
        op,
        dst: config.dst_path.clone(),
    })
}

impl FileAction {
    pub fn op(&self) -> &FileOp {
        &self.op
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub(super) fn run(
        &self,
        token: &CancellationToken,
        root: &Path,
        args: &Arguments,
    ) -> Result<String> {
        let dst = root.join(&self.dst);
        let exists = dst.exists();

        let source = match &self.op {
            FileOp::Delete => {
                if !exists {
                    return Err(Error::NotExist { path: dst });
                }
                token.check()?;
                fs::remove_file(&dst)
                    .map_err(|e| Error::io(format!("failed to delete file {}", dst.display()), e))?;
                return Ok(format!("Deleted file `{}`", self.dst));
            }
            FileOp::Create(_) if exists => return Err(Error::AlreadyExists { path: dst }),
            FileOp::Replace(_) if !exists => return Err(Error::NotExist { path: dst }),
            FileOp::Create(s) | FileOp::Replace(s) | FileOp::CreateOrReplace(s) => s,
        };

        let context = format!("file {}", source.path.display());
        let data = variables::expand(&source.data, &args.variables, &context)?;

        token.check()?;
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("failed to create directory {}", parent.display()), e)
            })?;
        }
        fs::write(&dst, &data)
            .map_err(|e| Error::io(format!("failed to write file {}", dst.display()), e))?;

        if exists {
            Ok(format!("Replaced file `{}`", self.dst))
        } else {
            Ok(format!("Created file `{}`", self.dst))
        }
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dst = &self.dst;
        match &self.op {
            FileOp::Create(s) => write!(f, "create file: {dst:?}\n  from: {:?}", s.path),
            FileOp::Replace(s) => write!(f, "replace file: {dst:?}\n  with: {:?}", s.path),
            FileOp::CreateOrReplace(s) => {
                write!(f, "create or replace file: {dst:?}\n  with: {:?}", s.path)
            }
            FileOp::Delete => write!(f, "delete file: {dst:?}"),
        }
    }
}
