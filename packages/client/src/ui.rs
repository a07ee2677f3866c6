//! Terminal helpers for the interactive prompt.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

pub fn prompt(username: &str) -> String {
    format!("{}> ", username)
}

/// Print output that arrived while the prompt was shown, then redraw it
pub fn print_above_prompt(output: &str, username: &str) {
    if output.is_empty() {
        return;
    }
    print!("{}{}", output, prompt(username));
    std::io::stdout().flush().ok();
}

/// Spawn a blocking thread that feeds non-empty prompt lines into a channel.
///
/// The thread lives for the whole process so it survives reconnects; it ends
/// on Ctrl+C, Ctrl+D or when the receiver is dropped.
pub fn spawn_readline(username: &str) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = prompt(username);

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
