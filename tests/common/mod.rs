//! Fabricated procfs trees for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use proctor::{BinaryHasher, InspectorConfig, Sha256Hasher};
use tempfile::{tempdir, TempDir};

/// A procfs-shaped directory plus a directory of fake executables.
pub struct FakeProcfs {
    pub proc_root: TempDir,
    pub bin_root: TempDir,
    pub cache_root: TempDir,
}

impl FakeProcfs {
    pub fn new() -> Self {
        Self {
            proc_root: tempdir().expect("Failed to create temp dir"),
            bin_root: tempdir().expect("Failed to create temp dir"),
            cache_root: tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn proc_path(&self) -> &Path {
        self.proc_root.path()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root.path().join("proctor")
    }

    /// Store settings pointing at this tree.
    pub fn config(&self) -> InspectorConfig {
        InspectorConfig {
            procfs_path: self.proc_path().to_path_buf(),
            cache_dir: self.cache_dir(),
            ..Default::default()
        }
    }

    /// Writes an executable with `content` and returns its path.
    pub fn add_binary(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.bin_root.path().join(name);
        fs::write(&path, content).expect("Failed to write binary");
        path
    }

    /// Adds a process directory. `exe` of `None` makes it a kernel task.
    pub fn add_process(&self, pid: u32, ppid: u32, comm: &str, exe: Option<&Path>, args: &[&str]) {
        let dir = self.proc_path().join(pid.to_string());
        fs::create_dir_all(&dir).expect("Failed to create proc dir");

        let stat = format!(
            "{pid} ({comm}) S {ppid} {pid} {pid} 0 -1 4194560 120 0 0 0 3 1 0 0 20 0 1 0 4316 12345678 321 18446744073709551615 94657007656960 94657008059597 140727172487872 0 0 0 0 4096 0 0 0 0 17 0 0 0 0 0 0 94657008206176 94657008240992 94657028120576 140727172496280 140727172496349 140727172496349 140727172497384 0\n"
        );
        fs::write(dir.join("stat"), stat).expect("Failed to write stat");

        if let Some(exe) = exe {
            std::os::unix::fs::symlink(exe, dir.join("exe")).expect("Failed to link exe");
            let mut cmdline = Vec::new();
            cmdline.extend_from_slice(exe.to_string_lossy().as_bytes());
            cmdline.push(0);
            for a in args {
                cmdline.extend_from_slice(a.as_bytes());
                cmdline.push(0);
            }
            fs::write(dir.join("cmdline"), cmdline).expect("Failed to write cmdline");
        } else {
            fs::write(dir.join("cmdline"), b"").expect("Failed to write cmdline");
        }
    }

    /// init(1) -> sshd(50) -> bash(99), plus a kernel thread (2).
    pub fn with_lineage() -> Self {
        let fake = Self::new();
        let init = fake.add_binary("init", b"\x7fELF init");
        let sshd = fake.add_binary("sshd", b"\x7fELF sshd");
        let bash = fake.add_binary("bash", b"\x7fELF bash");

        fake.add_process(1, 0, "systemd", Some(&init), &["--system"]);
        fake.add_process(2, 0, "kthreadd", None, &[]);
        fake.add_process(50, 1, "sshd", Some(&sshd), &["-D"]);
        fake.add_process(99, 50, "bash", Some(&bash), &["-l"]);
        fake
    }
}

/// Hasher that counts how many files it digested.
#[derive(Default)]
pub struct CountingHasher {
    pub calls: AtomicUsize,
}

impl CountingHasher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BinaryHasher for CountingHasher {
    fn hash_file(&self, path: &Path) -> std::io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Sha256Hasher.hash_file(path)
    }
}
