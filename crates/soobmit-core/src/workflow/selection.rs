//! 文件选择

use crate::transfer::{FileId, SelectedFile};
use std::path::Path;

/// 按顺序排列的待上传文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }

    /// 从文件路径构造，任一路径不可读即失败
    pub async fn from_paths<I, P>(paths: I) -> std::io::Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut files = Vec::new();
        for path in paths {
            files.push(SelectedFile::from_path(path.as_ref()).await?);
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn push(&mut self, file: SelectedFile) {
        self.files.push(file);
    }

    /// 取消选择
    pub fn remove(&mut self, id: FileId) -> Option<SelectedFile> {
        let index = self.files.iter().position(|f| f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

impl From<Vec<SelectedFile>> for FileSelection {
    fn from(files: Vec<SelectedFile>) -> Self {
        Self::new(files)
    }
}
