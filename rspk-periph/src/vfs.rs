use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use serde::Serialize;

use rspk_core::periph::{FileStore, StoreError, WriteMode};

/// One node of the virtual tree: a file body or a nested directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    File(String),
    Dir(BTreeMap<String, Entry>),
}

///
/// Hierarchical name-to-entry store with a current directory, the
/// machine's virtual filesystem. One context is created at process
/// start and owned by whoever drives the engine; nothing about it is
/// global.
///
/// `~` changes back to the root. Creating an entry under an existing
/// name replaces it.
///
pub struct VfsContext {
    root: BTreeMap<String, Entry>,
    cwd: Vec<String>,
}

impl VfsContext {
    pub fn new() -> VfsContext {
        VfsContext {
            root: BTreeMap::new(),
            cwd: Vec::new(),
        }
    }

    fn current(&self) -> &BTreeMap<String, Entry> {
        let mut dir = &self.root;
        for name in &self.cwd {
            match dir.get(name) {
                Some(Entry::Dir(next)) => dir = next,
                // cd only descends into directories that exist, and all
                // mutation happens inside the current directory, so an
                // ancestor can never disappear
                _ => unreachable!("current directory path is always valid"),
            }
        }
        dir
    }

    fn current_mut(&mut self) -> &mut BTreeMap<String, Entry> {
        let mut dir = &mut self.root;
        for name in &self.cwd {
            match dir.get_mut(name) {
                Some(Entry::Dir(next)) => dir = next,
                _ => unreachable!("current directory path is always valid"),
            }
        }
        dir
    }

    /// Serialize the whole tree to `path`, the snapshot taken once at
    /// process start.
    pub fn snapshot(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(file, &self.root)?;
        debug!("vfs: snapshot written to {:?}", path);
        Ok(())
    }
}

impl Default for VfsContext {
    fn default() -> Self {
        VfsContext::new()
    }
}

impl FileStore for VfsContext {
    fn list(&self) -> Vec<String> {
        self.current().keys().cloned().collect()
    }

    fn change_dir(&mut self, dir: &str) -> Result<(), StoreError> {
        if dir == "~" {
            self.cwd.clear();
            return Ok(());
        }

        match self.current().get(dir) {
            Some(Entry::Dir(_)) => {
                self.cwd.push(dir.to_string());
                Ok(())
            }
            Some(_) => Err(StoreError::NotADirectory(dir.to_string())),
            None => Err(StoreError::NotFound(dir.to_string())),
        }
    }

    fn make_dir(&mut self, name: &str) {
        self.current_mut()
            .insert(name.to_string(), Entry::Dir(BTreeMap::new()));
    }

    fn create_file(&mut self, name: &str) {
        self.current_mut()
            .insert(name.to_string(), Entry::File(String::new()));
    }

    fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        match self.current_mut().remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    fn write_file(&mut self, name: &str, text: &str, mode: WriteMode) -> Result<(), StoreError> {
        match self.current_mut().get_mut(name) {
            Some(Entry::File(body)) => {
                match mode {
                    WriteMode::Overwrite => *body = text.to_string(),
                    WriteMode::Append => body.push_str(text),
                }
                Ok(())
            }
            Some(Entry::Dir(_)) => Err(StoreError::NotAFile(name.to_string())),
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }
}
