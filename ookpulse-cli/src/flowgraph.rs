//! External SDR flowgraph process lifecycle

use anyhow::{bail, Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// A running flowgraph script
///
/// The process is sent SIGTERM by [`terminate`](Flowgraph::terminate) and
/// killed on drop if it is still running.
#[derive(Debug)]
pub struct Flowgraph {
    script: PathBuf,
    child: Option<Child>,
}

impl Flowgraph {
    /// Launch the flowgraph script
    ///
    /// If the script does not exist but a `.grc` description with the same
    /// stem does, it is compiled with `grcc` first.
    pub fn launch(script: &Path, show_output: bool) -> Result<Self> {
        let child = match spawn(script, show_output) {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let grc = script.with_extension("grc");
                if !grc.exists() {
                    bail!(
                        "Flowgraph script {} not found and no {} to build it from",
                        script.display(),
                        grc.display()
                    );
                }
                warn!("Flowgraph script not found. Creating it from {}", grc.display());
                compile(&grc, show_output)?;
                spawn(script, show_output).with_context(|| {
                    format!("Failed to launch flowgraph script: {}", script.display())
                })?
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to launch flowgraph script: {}", script.display())
                })
            }
        };

        info!("Launched flowgraph {} (pid {})", script.display(), child.id());
        Ok(Self {
            script: script.to_path_buf(),
            child: Some(child),
        })
    }

    /// Launch and give the flowgraph time to come up
    pub fn launch_and_settle(script: &Path, show_output: bool, delay: Duration) -> Result<Self> {
        let flowgraph = Self::launch(script, show_output)?;
        info!("Waiting {:?} for the flowgraph to boot up", delay);
        thread::sleep(delay);
        Ok(flowgraph)
    }

    /// Script this process was started from
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Ask the flowgraph to exit and wait for it
    pub fn terminate(mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            info!("Terminating flowgraph {}", self.script.display());
            let pid = Pid::from_raw(child.id() as i32);
            if let Err(e) = kill(pid, Signal::SIGTERM) {
                warn!("SIGTERM failed ({}), killing flowgraph", e);
                child.kill().context("Failed to kill flowgraph")?;
            }
            child.wait().context("Failed to wait for flowgraph exit")?;
        }
        Ok(())
    }
}

impl Drop for Flowgraph {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn(script: &Path, show_output: bool) -> std::io::Result<Child> {
    let mut cmd = Command::new(script);
    if !show_output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }
    cmd.spawn()
}

fn compile(grc: &Path, show_output: bool) -> Result<()> {
    let dir = match grc.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut cmd = Command::new("grcc");
    cmd.arg("-d").arg(dir).arg(grc);
    if !show_output {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = cmd
        .status()
        .with_context(|| format!("Failed to run grcc on {}", grc.display()))?;
    if !status.success() {
        bail!("grcc failed on {} ({})", grc.display(), status);
    }
    Ok(())
}
