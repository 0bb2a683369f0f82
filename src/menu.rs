//! Numbered text menus read from a line-based input.
use std::io::{self, BufRead, Write};

/// One numbered entry of a [`Menu`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct MenuItem {
    idx: u32,
    label: String,
    blank_before: bool,
    blank_after: bool,
}

/// A title followed by numbered entries.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    title: String,
    items: Vec<MenuItem>,
}

impl Menu {
    /// An empty menu shown under `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Adds an entry.
    #[must_use]
    pub fn item(self, idx: u32, label: impl Into<String>) -> Self {
        self.push(idx, label.into(), false, false)
    }

    /// Adds an entry set apart by empty lines, as used for "Exit".
    #[must_use]
    pub fn spaced_item(self, idx: u32, label: impl Into<String>) -> Self {
        self.push(idx, label.into(), true, true)
    }

    fn push(mut self, idx: u32, label: String, blank_before: bool, blank_after: bool) -> Self {
        self.items.push(MenuItem {
            idx,
            label,
            blank_before,
            blank_after,
        });
        self
    }

    /// Shows the menu and reads answers until one names an entry.
    ///
    /// Returns `Ok(None)` when the input ends before a valid answer.
    pub fn choose<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        out: &mut W,
    ) -> io::Result<Option<u32>> {
        loop {
            self.render(out)?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(None);
            }

            // In windows newline is \r\n
            let answer = line.trim_end_matches(['\r', '\n']);
            let Ok(idx) = answer.trim().parse::<u32>() else {
                writeln!(out, "Cannot understand your choice (only numbers please)")?;
                continue;
            };

            if self.items.iter().any(|item| item.idx == idx) {
                return Ok(Some(idx));
            }
            writeln!(out, "Cannot understand your choice")?;
        }
    }

    fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.title)?;
        for item in &self.items {
            if item.blank_before {
                writeln!(out)?;
            }
            writeln!(out, "{}) {}", item.idx, item.label)?;
            if item.blank_after {
                writeln!(out)?;
            }
        }
        write!(out, "Make your choice > ")?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::Menu;
    use std::io::Cursor;

    fn main_menu() -> Menu {
        Menu::new("MAIN MENU:")
            .item(1, "Find a device")
            .item(2, "Something else")
            .spaced_item(0, "Exit")
    }

    fn choose(menu: &Menu, input: &str) -> (Option<u32>, String) {
        let mut out = Vec::new();
        let choice = menu.choose(&mut Cursor::new(input), &mut out).unwrap();
        (choice, String::from_utf8(out).unwrap())
    }

    #[test]
    fn renders_title_and_items() {
        let (choice, out) = choose(&main_menu(), "2\n");

        assert_eq!(choice, Some(2));
        assert_eq!(
            out,
            "MAIN MENU:\n1) Find a device\n2) Something else\n\n0) Exit\n\nMake your choice > "
        );
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let (choice, _) = choose(&main_menu(), "0\r\n");
        assert_eq!(choice, Some(0));
    }

    #[test]
    fn non_numeric_answer_prompts_again() {
        let (choice, out) = choose(&main_menu(), "one\n1\n");

        assert_eq!(choice, Some(1));
        assert!(out.contains("Cannot understand your choice (only numbers please)"));
        assert_eq!(out.matches("MAIN MENU:").count(), 2);
    }

    #[test]
    fn unknown_number_prompts_again() {
        let (choice, out) = choose(&main_menu(), "7\n0\n");

        assert_eq!(choice, Some(0));
        assert!(out.contains("Cannot understand your choice\n"));
    }

    #[test]
    fn end_of_input_is_no_choice() {
        let (choice, _) = choose(&main_menu(), "abc\n");
        assert_eq!(choice, None);
    }
}
