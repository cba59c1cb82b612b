use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::filter::resolve::ResolvedTargetSet;

/// External build system seam.
///
/// One `init` call prepares the output directory for a platform; one
/// `build` call compiles every named target. Either step failing aborts
/// the whole run before any test executes.
pub trait BuildSystem {
    /// Run the one-time build-system initialization step.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the step cannot be started or exits
    /// non-zero.
    fn init(&self) -> Result<(), BuildError>;

    /// Build the named targets, passing `extra_flags` through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the build cannot be started or exits
    /// non-zero.
    fn build(&self, targets: &[String], extra_flags: Option<&str>) -> Result<(), BuildError>;
}

/// Build every target in the resolved set.
///
/// # Errors
///
/// Propagates the first [`BuildError`]; the caller must not run any test
/// after a failure.
pub fn build_all(
    build_system: &dyn BuildSystem,
    resolved: &ResolvedTargetSet,
    extra_flags: Option<&str>,
) -> Result<(), BuildError> {
    build_system.init()?;
    let targets: Vec<String> = resolved.keys().cloned().collect();
    build_system.build(&targets, extra_flags)
}

/// Error from the build system invocation. Fatal to the run.
#[derive(Debug, Clone)]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Classification of build errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// The initialization step failed.
    InitFailed,
    /// The build invocation failed.
    BuildFailed,
}

impl fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "build system init failed"),
            Self::BuildFailed => write!(f, "build failed"),
        }
    }
}

/// Ninja-backed build system: an optional init command followed by
/// `ninja -C <out_directory> <targets...>`.
pub struct NinjaBuild {
    pub out_directory: PathBuf,
    /// Init command and arguments, e.g. the GYP/GN generation step.
    /// `None` skips initialization (the directory is already generated).
    pub init_command: Option<Vec<String>>,
}

impl NinjaBuild {
    pub fn new(out_directory: PathBuf) -> Self {
        Self {
            out_directory,
            init_command: None,
        }
    }
}

impl BuildSystem for NinjaBuild {
    fn init(&self) -> Result<(), BuildError> {
        let Some(command) = &self.init_command else {
            return Ok(());
        };
        let (program, args) = command.split_first().ok_or_else(|| BuildError {
            kind: BuildErrorKind::InitFailed,
            message: "empty init command".into(),
            detail: None,
        })?;
        run_checked(
            Command::new(program).args(args),
            BuildErrorKind::InitFailed,
        )
    }

    fn build(&self, targets: &[String], extra_flags: Option<&str>) -> Result<(), BuildError> {
        let mut command = Command::new("ninja");
        command.arg("-C").arg(&self.out_directory).args(targets);
        if let Some(flags) = extra_flags {
            command.args(flags.split_whitespace());
        }
        eprintln!("{command:?}");
        run_checked(&mut command, BuildErrorKind::BuildFailed)
    }
}

/// Run a command and map a spawn failure or non-zero exit to `kind`.
fn run_checked(command: &mut Command, kind: BuildErrorKind) -> Result<(), BuildError> {
    let description = format!("{command:?}");
    let status = command.status().map_err(|e| BuildError {
        kind: kind.clone(),
        message: format!("failed to start {description}"),
        detail: Some(e.to_string()),
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(BuildError {
            kind,
            message: format!("{description} exited with {status}"),
            detail: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    // -- Scripted mock build system --

    struct MockBuild {
        fail_init: bool,
        fail_build: bool,
        calls: Mutex<Vec<String>>,
    }

    impl MockBuild {
        fn passing() -> Self {
            Self {
                fail_init: false,
                fail_build: false,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl BuildSystem for MockBuild {
        fn init(&self) -> Result<(), BuildError> {
            self.calls.lock().unwrap().push("init".into());
            if self.fail_init {
                return Err(BuildError {
                    kind: BuildErrorKind::InitFailed,
                    message: "mock init failure".into(),
                    detail: None,
                });
            }
            Ok(())
        }

        fn build(&self, targets: &[String], extra_flags: Option<&str>) -> Result<(), BuildError> {
            self.calls.lock().unwrap().push(format!(
                "build {} [{}]",
                targets.join(","),
                extra_flags.unwrap_or("")
            ));
            if self.fail_build {
                return Err(BuildError {
                    kind: BuildErrorKind::BuildFailed,
                    message: "mock build failure".into(),
                    detail: None,
                });
            }
            Ok(())
        }
    }

    fn resolved(names: &[&str]) -> ResolvedTargetSet {
        names
            .iter()
            .map(|n| ((*n).to_owned(), Vec::new()))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn build_all_runs_init_then_build() {
        let build = MockBuild::passing();
        build_all(&build, &resolved(&["nplb", "base_unittests"]), None).unwrap();
        let calls = build.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], "init");
        assert!(calls[1].starts_with("build base_unittests,nplb"));
    }

    #[test]
    fn build_all_passes_extra_flags_verbatim() {
        let build = MockBuild::passing();
        build_all(&build, &resolved(&["nplb"]), Some("-j 4 -v")).unwrap();
        let calls = build.calls.lock().unwrap();
        assert_eq!(calls[1], "build nplb [-j 4 -v]");
    }

    #[test]
    fn build_all_init_failure_skips_build() {
        let build = MockBuild {
            fail_init: true,
            ..MockBuild::passing()
        };
        let err = build_all(&build, &resolved(&["nplb"]), None).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::InitFailed);
        assert_eq!(build.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn build_all_build_failure_propagates() {
        let build = MockBuild {
            fail_build: true,
            ..MockBuild::passing()
        };
        let err = build_all(&build, &resolved(&["nplb"]), None).unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::BuildFailed);
    }

    #[test]
    fn ninja_build_without_init_command_skips_init() {
        let build = NinjaBuild::new(PathBuf::from("out/linux-x64x11_devel"));
        build.init().unwrap();
    }

    #[test]
    fn ninja_build_empty_init_command_is_an_error() {
        let build = NinjaBuild {
            out_directory: PathBuf::from("out"),
            init_command: Some(vec![]),
        };
        let err = build.init().unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::InitFailed);
    }

    #[test]
    #[cfg(unix)]
    fn ninja_build_init_runs_configured_command() {
        let build = NinjaBuild {
            out_directory: PathBuf::from("out"),
            init_command: Some(vec!["true".into()]),
        };
        build.init().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn ninja_build_init_nonzero_exit_is_an_error() {
        let build = NinjaBuild {
            out_directory: PathBuf::from("out"),
            init_command: Some(vec!["false".into()]),
        };
        let err = build.init().unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::InitFailed);
        assert!(err.message.contains("exited with"));
    }

    #[test]
    fn build_error_display() {
        let err = BuildError {
            kind: BuildErrorKind::BuildFailed,
            message: "ninja exited with exit status: 1".into(),
            detail: None,
        };
        assert_eq!(
            err.to_string(),
            "build failed: ninja exited with exit status: 1"
        );
    }
}
