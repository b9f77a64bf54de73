use std::io::IsTerminal;

use log4rs::config::Deserializers;

mod default_appender;
mod default_pattern;

/// Size of the stack buffer a single log line is assembled in.
const WRITE_BUF_SIZE: usize = 1024;

pub fn deserializers() -> Deserializers {
    let mut d = Deserializers::new();
    d.insert("default", default_appender::DefaultAppenderDeserializer);
    d.insert("default", default_pattern::DefaultPatternDeserializer);
    d
}

/// Detects whether ANSI escape codes should be written to `stream`.
///
/// Honors `NO_COLOR`, `CLICOLOR`, and `CLICOLOR_FORCE`.
fn supports_ansi_escapes<T: IsTerminal>(stream: &T) -> bool {
    use anstyle_query as a;

    let clicolor = a::clicolor();
    if a::no_color() {
        false
    } else if a::clicolor_force() {
        true
    } else if clicolor == Some(false) {
        false
    } else {
        stream.is_terminal() && (a::term_supports_color() || clicolor == Some(true) || a::is_ci())
    }
}
