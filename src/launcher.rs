//! The PATH-visible wrapper that points the real binary at its model.

use std::path::Path;

/// Environment variable the wrapped binary reads its model location from.
pub const MODEL_PATH_ENV: &str = "WHISPER_MODEL_PATH";

/// Render the launcher script.
///
/// The script exports [`MODEL_PATH_ENV`] only when the caller left it unset
/// or empty, then `exec`s the real binary with `"$@"`. Because of `exec` the
/// binary replaces the shell, so its exit status reaches the caller as is.
pub fn render_launcher(default_model_path: &Path, target_binary_path: &Path) -> String {
    format!(
        "#!/bin/sh\n\
         default_model_path={model}\n\
         export {env}=\"${{{env}:-$default_model_path}}\"\n\
         exec {binary} \"$@\"\n",
        env = MODEL_PATH_ENV,
        model = single_quote(&default_model_path.to_string_lossy()),
        binary = single_quote(&target_binary_path.to_string_lossy()),
    )
}

/// Quote `value` for POSIX sh. Inside single quotes nothing is special
/// except the quote itself, which becomes `'\''`.
fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_launcher_plain_paths() {
        let script = render_launcher(
            Path::new("/usr/local/share/whisper/ggml-base.en.bin"),
            Path::new("/usr/local/libexec/inkoscribe"),
        );

        assert_eq!(
            script,
            "#!/bin/sh\n\
             default_model_path='/usr/local/share/whisper/ggml-base.en.bin'\n\
             export WHISPER_MODEL_PATH=\"${WHISPER_MODEL_PATH:-$default_model_path}\"\n\
             exec '/usr/local/libexec/inkoscribe' \"$@\"\n"
        );
    }

    #[test]
    fn test_single_quote_escapes_quotes() {
        assert_eq!(single_quote("plain"), "'plain'");
        assert_eq!(single_quote("it's"), r"'it'\''s'");
        assert_eq!(single_quote("$HOME `x` \"y\""), "'$HOME `x` \"y\"'");
    }

    #[test]
    fn test_render_launcher_is_deterministic() {
        let model = PathBuf::from("/p/share/whisper/ggml-base.en.bin");
        let binary = PathBuf::from("/p/libexec/inkoscribe");
        assert_eq!(
            render_launcher(&model, &binary),
            render_launcher(&model, &binary)
        );
    }

    /// Runs the rendered launcher against a fake binary that reports what it received.
    #[cfg(unix)]
    mod execution {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use std::process::Command;
        use tempfile::{TempDir, tempdir};

        const FAKE_BINARY: &str = "#!/bin/sh\n\
            printf 'model=%s\\n' \"$WHISPER_MODEL_PATH\"\n\
            for arg in \"$@\"; do printf 'arg=[%s]\\n' \"$arg\"; done\n\
            exit \"${FAKE_EXIT_CODE:-0}\"\n";

        fn write_executable(path: &Path, contents: &str) {
            std::fs::write(path, contents).unwrap();
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        /// Lays out a launcher and fake binary; the model dir contains a quote and spaces.
        fn setup() -> (TempDir, PathBuf, PathBuf) {
            let dir = tempdir().unwrap();
            let binary = dir.path().join("lib exec").join("inkoscribe");
            std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
            write_executable(&binary, FAKE_BINARY);

            let model = dir.path().join("it's share").join("ggml-base.en.bin");
            let launcher = dir.path().join("inkoscribe");
            write_executable(&launcher, &render_launcher(&model, &binary));
            (dir, launcher, model)
        }

        #[test]
        fn test_default_model_path_is_exported() {
            let (_dir, launcher, model) = setup();
            let output = Command::new(&launcher)
                .env_remove(MODEL_PATH_ENV)
                .output()
                .unwrap();

            assert!(output.status.success());
            let stdout = String::from_utf8(output.stdout).unwrap();
            assert_eq!(stdout, format!("model={}\n", model.display()));
        }

        #[test]
        fn test_caller_value_wins() {
            let (_dir, launcher, _model) = setup();
            let output = Command::new(&launcher)
                .env(MODEL_PATH_ENV, "/custom/ggml-small.bin")
                .output()
                .unwrap();

            let stdout = String::from_utf8(output.stdout).unwrap();
            assert_eq!(stdout, "model=/custom/ggml-small.bin\n");
        }

        #[test]
        fn test_arguments_are_forwarded_verbatim() {
            let (_dir, launcher, _model) = setup();
            let output = Command::new(&launcher)
                .args(["--source", "mic", "--source", "/tmp/a b.wav", "", "$HOME", "*"])
                .env_remove(MODEL_PATH_ENV)
                .output()
                .unwrap();

            let stdout = String::from_utf8(output.stdout).unwrap();
            let args: Vec<&str> = stdout
                .lines()
                .filter_map(|line| line.strip_prefix("arg="))
                .collect();
            assert_eq!(
                args,
                vec![
                    "[--source]",
                    "[mic]",
                    "[--source]",
                    "[/tmp/a b.wav]",
                    "[]",
                    "[$HOME]",
                    "[*]"
                ]
            );
        }

        #[test]
        fn test_exit_code_propagates() {
            let (_dir, launcher, _model) = setup();
            let status = Command::new(&launcher)
                .env("FAKE_EXIT_CODE", "42")
                .status()
                .unwrap();

            assert_eq!(status.code(), Some(42));
        }
    }
}
