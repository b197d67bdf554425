use std::io::{BufRead, Lines};

/// Handling multi-line input at the prompt.
/// String literals may span physical lines, so a unit stays open for as
/// long as it contains an unterminated string. The language has no escape
/// sequences, which makes "unterminated" a simple quote-parity check.
/// An empty line always flushes whatever has accumulated, as an escape
/// hatch for genuinely broken input.
pub struct MultilineInput<T: BufRead> {
    lines: Lines<T>,
}

impl<T: BufRead> MultilineInput<T> {
    pub fn new(lines: Lines<T>) -> MultilineInput<T> {
        MultilineInput { lines }
    }
}

impl<T: BufRead> Iterator for MultilineInput<T> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let mut current_input = String::new();
        loop {
            let Some(line) = self.lines.next() else {
                // stdin closed; hand back whatever is pending so CTRL+D
                // on a half-typed unit still runs it (this is what python does)
                if !current_input.is_empty() {
                    return Some(current_input);
                }
                return None;
            };
            let line = line.expect("issue reading from stdin");

            let forced_flush = line.is_empty() && !current_input.is_empty();
            if !current_input.is_empty() {
                current_input.push('\n');
            }
            current_input += &line;

            let open_string = current_input.matches('"').count() % 2 == 1;
            if forced_flush || !open_string {
                return Some(current_input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufRead;

    use crate::repl::MultilineInput;

    fn units(input: &str) -> Vec<String> {
        MultilineInput::new(input.as_bytes().lines()).collect()
    }

    #[test]
    fn test_plain_lines_are_single_units() {
        assert_eq!(units("1 + 2\nprint x;"), vec!["1 + 2", "print x;"]);
    }

    #[test]
    fn test_open_string_keeps_the_unit_open() {
        assert_eq!(
            units("var a = \"first\nsecond\";\nprint a;"),
            vec!["var a = \"first\nsecond\";", "print a;"]
        );
    }

    #[test]
    fn test_empty_line_flushes_a_broken_unit() {
        assert_eq!(units("\"never closed\n\n"), vec!["\"never closed\n"]);
    }

    #[test]
    fn test_pending_input_survives_eof() {
        assert_eq!(units("\"still open"), vec!["\"still open"]);
    }
}
