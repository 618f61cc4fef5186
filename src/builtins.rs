use crate::error::ShellError;
use crate::parser::ParsedCommand;
use crate::state::ShellState;
use nix::unistd::chdir;
use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// The commands the shell runs itself, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
    Status,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "exit" => Some(Builtin::Exit),
            "cd" => Some(Builtin::Cd),
            "status" => Some(Builtin::Status),
            _ => None,
        }
    }
}

/// What the main loop should do after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// Not a built-in; launch it as an external program.
    NotBuiltin,
    /// Handled; read the next line.
    Handled,
    /// `exit` was requested.
    Exit,
}

/// Checks if the command is a built-in command and, if so, executes it.
pub fn handle_builtin<W: Write>(
    cmd: &ParsedCommand,
    state: &ShellState,
    out: &mut W,
) -> Result<BuiltinOutcome, ShellError> {
    let Some(builtin) = cmd.program().and_then(Builtin::lookup) else {
        return Ok(BuiltinOutcome::NotBuiltin);
    };
    debug!(?builtin, "dispatching built-in");

    match builtin {
        Builtin::Exit => Ok(BuiltinOutcome::Exit),
        Builtin::Cd => {
            change_directory(cmd.argv.get(1).map(OsString::from), env::var_os("HOME"))?;
            Ok(BuiltinOutcome::Handled)
        }
        Builtin::Status => {
            writeln!(out, "{}", state.last_status())?;
            out.flush()?;
            Ok(BuiltinOutcome::Handled)
        }
    }
}

/// Changes to `target`, or to `home` when no target is given. Without either
/// this is a no-op.
fn change_directory(target: Option<OsString>, home: Option<OsString>) -> Result<(), ShellError> {
    let Some(dir) = target.or(home) else {
        return Ok(());
    };
    let dir = Path::new(&dir);
    chdir(dir).map_err(|source| ShellError::ChangeDir {
        path: dir.display().to_string(),
        source,
    })?;
    debug!(dir = %dir.display(), "changed directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ChildStatus;
    use crate::parser::parse_command_line;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn command(line: &str) -> ParsedCommand {
        parse_command_line(line, false).unwrap().unwrap()
    }

    fn run(line: &str, state: &ShellState) -> (Result<BuiltinOutcome, ShellError>, String) {
        let mut out = Vec::new();
        let outcome = handle_builtin(&command(line), state, &mut out);
        (outcome, String::from_utf8(out).unwrap())
    }

    /// Restores the working directory when dropped.
    struct CwdGuard(std::path::PathBuf);

    impl CwdGuard {
        fn new() -> Self {
            CwdGuard(env::current_dir().unwrap())
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            env::set_current_dir(&self.0).unwrap();
        }
    }

    #[test]
    fn lookup_recognizes_only_builtins() {
        assert_eq!(Builtin::lookup("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::lookup("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::lookup("status"), Some(Builtin::Status));
        assert_eq!(Builtin::lookup("ls"), None);
        assert_eq!(Builtin::lookup("Exit"), None);
    }

    #[test]
    fn external_commands_are_not_handled() {
        let (outcome, output) = run("ls -la", &ShellState::new());
        assert_eq!(outcome.unwrap(), BuiltinOutcome::NotBuiltin);
        assert_eq!(output, "");
    }

    #[test]
    fn exit_requests_shutdown() {
        let (outcome, _) = run("exit", &ShellState::new());
        assert_eq!(outcome.unwrap(), BuiltinOutcome::Exit);
    }

    #[test]
    fn status_reports_initial_exit_value() {
        let (outcome, output) = run("status", &ShellState::new());
        assert_eq!(outcome.unwrap(), BuiltinOutcome::Handled);
        assert_eq!(output, "exit value 0\n");
    }

    #[test]
    fn status_reports_signal_and_is_read_only() {
        let mut state = ShellState::new();
        state.record_foreground(ChildStatus::Signaled(2));
        let (_, first) = run("status", &state);
        let (_, second) = run("status", &state);
        assert_eq!(first, "terminated by signal 2\n");
        assert_eq!(second, first);
        assert_eq!(state.last_status(), ChildStatus::Signaled(2));
    }

    #[test]
    #[serial]
    fn cd_changes_to_the_given_directory() {
        let _guard = CwdGuard::new();
        let dir = tempdir().unwrap();
        let target = fs::canonicalize(dir.path()).unwrap();

        let (outcome, _) = run(&format!("cd {}", target.display()), &ShellState::new());
        assert_eq!(outcome.unwrap(), BuiltinOutcome::Handled);
        assert_eq!(env::current_dir().unwrap(), target);
    }

    #[test]
    #[serial]
    fn bare_cd_goes_home() {
        let _guard = CwdGuard::new();
        let dir = tempdir().unwrap();
        let home = fs::canonicalize(dir.path()).unwrap();

        change_directory(None, Some(home.clone().into_os_string())).unwrap();
        assert_eq!(env::current_dir().unwrap(), home);
    }

    #[test]
    #[serial]
    fn explicit_target_wins_over_home() {
        let _guard = CwdGuard::new();
        let home = tempdir().unwrap();
        let target = tempdir().unwrap();
        let target = fs::canonicalize(target.path()).unwrap();

        change_directory(
            Some(target.clone().into_os_string()),
            Some(home.path().as_os_str().to_owned()),
        )
        .unwrap();
        assert_eq!(env::current_dir().unwrap(), target);
    }

    #[test]
    #[serial]
    fn bare_cd_without_home_is_a_no_op() {
        let _guard = CwdGuard::new();
        let before = env::current_dir().unwrap();

        change_directory(None, None).unwrap();
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn cd_to_missing_directory_fails_and_stays_put() {
        let _guard = CwdGuard::new();
        let before = env::current_dir().unwrap();

        let (outcome, _) = run("cd /nonexistent/smallsh-test-dir", &ShellState::new());
        let err = outcome.unwrap_err();
        assert_eq!(
            err.to_string(),
            "cd: /nonexistent/smallsh-test-dir: No such file or directory"
        );
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
