//! Terminal output sanitization
//!
//! # Security: Terminal Injection Prevention
//!
//! Transcript text is user-controlled. Before it reaches a terminal, escape
//! sequences are removed so a transcript cannot clear the screen, move the
//! cursor, retitle the window or change colors. [`strip_ansi_codes`] is used for
//! plain output; [`sanitize_line`] additionally flattens a string for a single
//! row of the interactive browser.

/// Strips ANSI escape sequences and control characters
///
/// Removes CSI sequences (`ESC [ ... final`), OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`) and two-byte escapes. Other control
/// characters are dropped except tab, newline and carriage return.
///
/// # Examples
///
/// ```
/// use convo_viewer::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mRed text\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "Red text");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.next() {
                // CSI: parameters and intermediates, then a final byte in @..~
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ST (ESC \)
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            continue;
        }

        result.push(ch);
    }

    result
}

/// One display row: escapes stripped, tabs expanded to spaces, CR removed
pub fn sanitize_line(text: &str) -> String {
    strip_ansi_codes(text).replace('\t', "    ").replace(['\r', '\n'], "")
}
