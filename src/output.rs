use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use arboard::Clipboard;

use crate::error::{Result, SetupError};
use crate::generator::OutputFormat;

/// Writes generated content to `path`, creating parent directories.
///
/// Shell scripts are made executable on unix.
pub fn save_output(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;

    #[cfg(unix)]
    if path.extension().is_some_and(|ext| ext == "sh") {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}

/// Explicit path if given, otherwise the format's default file name.
pub fn resolve_output_path(format: OutputFormat, explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(format.default_filename()),
    }
}

pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard through arboard.
pub struct ArboardClipboard {
    clipboard: Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard =
            Clipboard::new().map_err(|e| SetupError::ClipboardUnavailable(format!("{}", e)))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text)
            .map_err(|e| SetupError::ClipboardUnavailable(format!("{}", e)))
    }
}

/// Pipes text into the macOS `pbcopy` utility.
#[derive(Debug, Default)]
pub struct PbcopyClipboard;

impl ClipboardWriter for PbcopyClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new("pbcopy")
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| SetupError::ClipboardUnavailable(format!("pbcopy: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(SetupError::ClipboardUnavailable(format!(
                "pbcopy exited with {}",
                status
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMethod {
    Primary,
    Fallback,
}

/// Tries `primary` once, then `fallback` once.
pub fn copy_with_fallback(
    primary: &mut dyn ClipboardWriter,
    fallback: &mut dyn ClipboardWriter,
    text: &str,
) -> Result<ClipboardMethod> {
    let primary_error = match primary.write_text(text) {
        Ok(()) => return Ok(ClipboardMethod::Primary),
        Err(e) => e,
    };

    fallback
        .write_text(text)
        .map(|()| ClipboardMethod::Fallback)
        .map_err(|e| {
            SetupError::ClipboardUnavailable(format!("{}; fallback: {}", primary_error, e))
        })
}

pub fn copy_to_clipboard(text: &str) -> Result<ClipboardMethod> {
    let mut fallback = PbcopyClipboard;
    match ArboardClipboard::new() {
        Ok(mut primary) => copy_with_fallback(&mut primary, &mut fallback, text),
        Err(primary_error) => fallback
            .write_text(text)
            .map(|()| ClipboardMethod::Fallback)
            .map_err(|e| {
                SetupError::ClipboardUnavailable(format!("{}; fallback: {}", primary_error, e))
            }),
    }
}
