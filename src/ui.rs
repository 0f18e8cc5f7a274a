use colored::Colorize;

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted note on stderr, leaving stdout to the commands
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}
