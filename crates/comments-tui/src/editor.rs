use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, Write};
use std::process::Command;
use tempfile::NamedTempFile;
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Create a TextArea holding `content`, cursor at the end
pub fn create_textarea<'a>(content: &str) -> TextArea<'a> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }
    let mut textarea = TextArea::new(lines);

    textarea.move_cursor(CursorMove::Bottom);
    textarea.move_cursor(CursorMove::End);
    textarea.set_max_histories(100);

    textarea
}

/// Extract content from TextArea as a single String
pub fn textarea_content(textarea: &TextArea) -> String {
    textarea.lines().join("\n")
}

/// Translate a terminal key press into textarea input
pub fn to_input(key: KeyEvent) -> Input {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => Key::Null,
    };

    Input {
        key: code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        ..Input::default()
    }
}

/// Launch external editor with current content, return edited content
pub fn launch_external_editor(content: &str) -> Result<String> {
    // Get editor from environment, fallback to vim
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "vim".to_string());

    let mut temp_file = NamedTempFile::with_suffix(".txt")?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    let temp_path = temp_file.path().to_path_buf();

    // Leave TUI mode
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    tracing::debug!(%editor, "launching external editor");
    let status = Command::new(&editor).arg(&temp_path).status();

    // Restore TUI mode (always, even on error)
    let restore_result = (|| -> Result<()> {
        execute!(io::stdout(), EnterAlternateScreen)?;
        execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        enable_raw_mode()?;
        Ok(())
    })();

    if let Err(e) = restore_result {
        anyhow::bail!("Failed to restore terminal: {}", e);
    }

    match status {
        Ok(exit_status) if exit_status.success() => {
            let edited = std::fs::read_to_string(&temp_path)?;
            // Editors append a trailing newline on save
            Ok(edited.strip_suffix('\n').unwrap_or(&edited).to_string())
        }
        Ok(exit_status) => {
            anyhow::bail!("Editor exited with status: {}", exit_status)
        }
        Err(e) => {
            anyhow::bail!("Failed to launch editor '{}': {}", editor, e)
        }
    }
}
