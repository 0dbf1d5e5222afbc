//! Launch parameters for the server process.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Artifact used when none is configured and none can be detected.
pub const DEFAULT_ARTIFACT: &str = "server.jar";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How to launch the server.
///
/// The argument vector is `launcher_args`, then `artifact_flag` (if any) and
/// the artifact, then `server_args`. Values are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Server installation directory; also the child's working directory.
    pub server_dir: PathBuf,
    /// Interpreter or launcher binary.
    pub java_path: String,
    /// Artifact to run. Auto-detected from `server_dir` when unset.
    pub jar_name: Option<String>,
    /// Arguments before the artifact (memory limits).
    pub launcher_args: Vec<String>,
    /// Flag introducing the artifact.
    pub artifact_flag: Option<String>,
    /// Arguments after the artifact.
    pub server_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            server_dir: PathBuf::from("exampleserver"),
            java_path: "java".to_string(),
            jar_name: None,
            launcher_args: vec!["-Xmx1024M".to_string(), "-Xms1024M".to_string()],
            artifact_flag: Some("-jar".to_string()),
            server_args: vec!["nogui".to_string()],
        }
    }
}

impl LaunchConfig {
    /// Default launch settings for the server in `server_dir`.
    #[must_use]
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_dir: server_dir.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_java_path(mut self, java_path: impl Into<String>) -> Self {
        self.java_path = java_path.into();
        self
    }

    #[must_use]
    pub fn with_jar_name(mut self, jar_name: impl Into<String>) -> Self {
        self.jar_name = Some(jar_name.into());
        self
    }

    #[must_use]
    pub fn with_launcher_args(mut self, args: &[&str]) -> Self {
        self.launcher_args = args.iter().map(|s| (*s).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_artifact_flag(mut self, flag: Option<&str>) -> Self {
        self.artifact_flag = flag.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_server_args(mut self, args: &[&str]) -> Self {
        self.server_args = args.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// The artifact file name: configured, else the first `*.jar` in the
    /// server directory (by name), else [`DEFAULT_ARTIFACT`].
    #[must_use]
    pub fn artifact_name(&self) -> String {
        self.jar_name
            .clone()
            .or_else(|| detect_artifact(&self.server_dir))
            .unwrap_or_else(|| DEFAULT_ARTIFACT.to_string())
    }

    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.server_dir.join(self.artifact_name())
    }

    /// Build the command-line arguments.
    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.launcher_args.clone();
        if let Some(flag) = &self.artifact_flag {
            args.push(flag.clone());
        }
        args.push(self.artifact_name());
        args.extend(self.server_args.iter().cloned());
        args
    }

    /// A command with all three standard streams piped and the server
    /// directory as working directory.
    #[must_use]
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.java_path);
        cmd.args(self.build_args())
            .current_dir(&self.server_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        cmd
    }
}

/// Find the first `*.jar` in `dir`, sorted by file name.
#[must_use]
pub fn detect_artifact(dir: &Path) -> Option<String> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut jars: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        })
        .collect();
    jars.sort();
    jars.into_iter().next()
}
