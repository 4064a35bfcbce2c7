//! Shell scripts standing in for ffmpeg
//!
//! Each script receives the same arguments the real decoder would. The
//! "frames" script writes its frames in reverse order so tests can check that
//! results are ordered by name, not by creation order.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub struct FakeDecoder {
    pub program: PathBuf,
    /// File the script appends its work directory to
    pub workdir_log: PathBuf,
    /// File the script writes its argument list to
    pub args_log: PathBuf,
}

impl FakeDecoder {
    pub fn program_str(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Work directories used so far
    pub fn workdirs(&self) -> Vec<PathBuf> {
        fs::read_to_string(&self.workdir_log)
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect()
    }

    pub fn args(&self) -> String {
        fs::read_to_string(&self.args_log).unwrap_or_default()
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> FakeDecoder {
    let program = dir.join(name);
    let workdir_log = dir.join(format!("{name}.workdirs"));
    let args_log = dir.join(format!("{name}.args"));

    let script = format!(
        "#!/bin/sh\n\
         for last in \"$@\"; do :; done\n\
         workdir=$(dirname \"$last\")\n\
         echo \"$workdir\" >> '{}'\n\
         echo \"$@\" > '{}'\n\
         {}\n",
        workdir_log.display(),
        args_log.display(),
        body
    );
    fs::write(&program, script).unwrap();
    fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

    FakeDecoder {
        program,
        workdir_log,
        args_log,
    }
}

/// Decoder that emits `frames` JPEG stand-ins named `frame_0001.jpg`...,
/// each containing `frame-N`, created last-first.
pub fn frames(dir: &Path, frames: usize) -> FakeDecoder {
    let mut body = String::from("[ -s \"$workdir/input.h264\" ] || exit 3\n");
    for n in (1..=frames).rev() {
        body.push_str(&format!(
            "printf 'frame-{n}' > \"$workdir/frame_{n:04}.jpg\"\n"
        ));
    }
    write_script(dir, "fake-ffmpeg", &body)
}

/// Decoder that copies the input stream into a single frame.
pub fn echo(dir: &Path) -> FakeDecoder {
    write_script(
        dir,
        "echo-ffmpeg",
        "cp \"$workdir/input.h264\" \"$workdir/frame_0001.jpg\"",
    )
}

/// Decoder that fails with a message on stderr.
pub fn failing(dir: &Path) -> FakeDecoder {
    write_script(
        dir,
        "failing-ffmpeg",
        "echo 'Invalid data found when processing input' >&2\nexit 1",
    )
}

/// Decoder that succeeds without producing any frame.
pub fn silent(dir: &Path) -> FakeDecoder {
    write_script(dir, "silent-ffmpeg", "exit 0")
}
