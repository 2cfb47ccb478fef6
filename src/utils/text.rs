/// Trims a text. If the string length exceeds `max_length`, it'll be cut to be
/// `max_length` bytes long and appended an ellipsis (`...`).
///
/// The cut is moved back to the nearest character boundary.
pub fn trim(input: &str, max_length: usize) -> String {
    if input.len() > max_length {
        let mut end = max_length;

        while !input.is_char_boundary(end) {
            end -= 1;
        }

        format!("{}...", &input[..end])
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_untouched() {
        assert_eq!(trim("$2b$", 20), "$2b$");
    }

    #[test]
    fn long_input_gets_ellipsis() {
        assert_eq!(trim("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn cut_respects_char_boundaries() {
        assert_eq!(trim("ééé", 3), "é...");
    }
}
