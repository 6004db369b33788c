//! UTF-8 safe path input with an end-anchored cursor.
//!
//! Left and right arrows belong to the stratify selector, so editing is
//! limited to typing, backspace, paste and clear.

#[derive(Clone, Debug, Default)]
pub struct PathInput {
    text: String,
}

impl PathInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of characters, for cursor placement.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Insert pasted text. Terminals paste a dropped file as its quoted path,
    /// so newlines and one layer of matching quotes are removed.
    pub fn paste(&mut self, pasted: &str) {
        let line = pasted.trim().lines().next().unwrap_or_default().trim();
        let unquoted = ['"', '\'']
            .iter()
            .find_map(|q| line.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
            .unwrap_or(line);
        self.text.push_str(unquoted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_backspace_are_utf8_safe() {
        let mut input = PathInput::default();
        for c in "año.arff".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.width(), 8);
        input.backspace();
        input.backspace();
        assert_eq!(input.text(), "año.ar");
        input.clear();
        assert!(input.is_empty());
    }

    #[test]
    fn pasted_paths_lose_quotes_and_newlines() {
        let mut input = PathInput::default();
        input.paste("'/home/ada/My Data/KDDTrain+.arff'\n");
        assert_eq!(input.text(), "/home/ada/My Data/KDDTrain+.arff");

        let mut input = PathInput::default();
        input.paste("\"C:\\data\\train.arff\"");
        assert_eq!(input.text(), "C:\\data\\train.arff");

        let mut input = PathInput::default();
        input.paste("'unbalanced.arff");
        assert_eq!(input.text(), "'unbalanced.arff");
    }
}
