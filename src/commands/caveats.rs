use anyhow::Result;

/// Permission and usage notes shown after an install.
pub const CAVEATS: &str = "\
inkoscribe requires microphone and system audio permissions.

On first run, macOS will prompt for microphone access.
For system audio capture, you may need to grant additional permissions
in System Settings > Privacy & Security > Screen & System Audio Recording > ...

Usage:
  # Transcribe from microphone
  inkoscribe --source mic

  # Transcribe system audio
  inkoscribe --source sys

  # Transcribe audio file
  inkoscribe --source /path/to/audio.wav
";

pub fn caveats() -> Result<()> {
    print!("{}", CAVEATS);
    Ok(())
}
