// Copyright 2024 - 2026 Martin Pool

#![allow(dead_code)] // rustc doesn't understand they're used by multiple crates

//! Build throwaway MATLAB source trees for integration tests.

use std::fs::{create_dir_all, File};
use std::io::Write;

use camino::Utf8PathBuf;
use tempfile::TempDir;

/// A temporary directory populated with MATLAB sources.
pub struct TestTree {
    // Held for its Drop; the directory disappears with the tree.
    _tmp: TempDir,
    pub root: Utf8PathBuf,
}

impl TestTree {
    pub fn new() -> TestTree {
        let tmp = tempfile::tempdir().unwrap();
        // Canonicalized so that filesystem-relative lookups, which resolve
        // symlinks, compare equal to the registered roots.
        let root = Utf8PathBuf::from_path_buf(tmp.path().canonicalize().unwrap()).unwrap();
        TestTree { _tmp: tmp, root }
    }

    /// Write a file under the root, creating parent directories.
    pub fn file(&self, path: &str, content: &str) -> &TestTree {
        let full = self.root.join(path);
        create_dir_all(full.parent().unwrap()).unwrap();
        File::create(&full)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
        self
    }

    /// Create a (possibly empty) directory under the root.
    pub fn dir(&self, path: &str) -> &TestTree {
        create_dir_all(self.root.join(path)).unwrap();
        self
    }

    pub fn path(&self, path: &str) -> Utf8PathBuf {
        self.root.join(path)
    }
}
