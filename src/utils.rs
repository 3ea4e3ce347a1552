use std::{ffi::OsString, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

/// Rewrites the legacy `-ns` shorthand to `--natural-search`.
///
/// clap only supports single-character short flags, while `-ns` has always
/// been accepted on the command line.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "-ns" {
                OsString::from("--natural-search")
            } else {
                arg
            }
        })
        .collect()
}

/// Parses the `--N` result count.
pub fn parse_count(value: &str) -> Result<u32, String> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err("N must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("N must be a positive number, got '{}'", value)),
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
