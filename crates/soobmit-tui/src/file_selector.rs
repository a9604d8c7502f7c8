//! 文件选择器
//!
//! 简单的目录浏览器：上下移动，Enter 进入目录，空格标记文件。

use soobmit_core::SelectedFile;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

pub struct FileSelector {
    pub current_dir: PathBuf,
    pub entries: Vec<Entry>,
    pub cursor: usize,
    marked: BTreeSet<PathBuf>,
}

impl FileSelector {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: start_dir.into(),
            entries: Vec::new(),
            cursor: 0,
            marked: BTreeSet::new(),
        }
    }

    /// 重新读取当前目录
    ///
    /// 目录在前，文件在后，各自按名称排序。隐藏文件不显示。
    pub fn refresh(&mut self) -> io::Result<()> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in std::fs::read_dir(&self.current_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            // 读不到元数据的条目（断开的链接等）直接跳过
            let Ok(metadata) = std::fs::metadata(entry.path()) else {
                continue;
            };
            let item = Entry {
                path: entry.path(),
                name,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
            };
            if item.is_dir {
                dirs.push(item);
            } else {
                files.push(item);
            }
        }

        dirs.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));
        dirs.extend(files);

        self.entries = dirs;
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        Ok(())
    }

    pub fn next(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = self
                .cursor
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    pub fn current(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Enter：目录则进入，文件则切换标记
    pub fn enter(&mut self) -> io::Result<()> {
        let Some(entry) = self.current().cloned() else {
            return Ok(());
        };
        if entry.is_dir {
            self.change_dir(entry.path)
        } else {
            self.toggle();
            Ok(())
        }
    }

    /// 返回上一级目录
    pub fn parent(&mut self) -> io::Result<()> {
        match self.current_dir.parent() {
            Some(parent) => self.change_dir(parent.to_path_buf()),
            None => Ok(()),
        }
    }

    fn change_dir(&mut self, dir: PathBuf) -> io::Result<()> {
        let previous = std::mem::replace(&mut self.current_dir, dir);
        self.cursor = 0;
        if let Err(e) = self.refresh() {
            self.current_dir = previous;
            self.refresh()?;
            return Err(e);
        }
        Ok(())
    }

    /// 切换光标所在文件的标记，目录不可标记
    pub fn toggle(&mut self) {
        if let Some(entry) = self.current()
            && !entry.is_dir
        {
            let path = entry.path.clone();
            if !self.marked.remove(&path) {
                self.marked.insert(path);
            }
        }
    }

    pub fn is_marked(&self, path: &Path) -> bool {
        self.marked.contains(path)
    }

    pub fn marked_count(&self) -> usize {
        self.marked.len()
    }

    /// 取出所有标记的文件并清空标记
    pub fn take_marked(&mut self) -> io::Result<Vec<SelectedFile>> {
        let marked = std::mem::take(&mut self.marked);
        marked
            .into_iter()
            .map(|path| {
                let metadata = std::fs::metadata(&path)?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(SelectedFile::new(path, name, metadata.len()))
            })
            .collect()
    }
}
