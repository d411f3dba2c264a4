//! An indented tree printer shared by the DOM and landmark dumps.

use std::io::{self, Write};

pub struct PrintTree<'a> {
    level: usize,
    dest: &'a mut dyn Write,
}

impl<'a> PrintTree<'a> {
    pub fn new(title: &str, dest: &'a mut dyn Write) -> io::Result<Self> {
        writeln!(dest, "{}", title)?;
        Ok(Self { level: 0, dest })
    }

    /// Prints `title` and nests everything after it until `end_level`.
    pub fn new_level(&mut self, title: &str) -> io::Result<()> {
        self.add_item(title)?;
        self.level += 1;
        Ok(())
    }

    pub fn end_level(&mut self) {
        debug_assert!(self.level > 0, "Unbalanced end_level");
        self.level = self.level.saturating_sub(1);
    }

    pub fn add_item(&mut self, text: &str) -> io::Result<()> {
        for _ in 0..self.level {
            self.dest.write_all(b"  ")?;
        }
        writeln!(self.dest, "- {}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::PrintTree;

    #[test]
    fn nests_levels() {
        let mut out = Vec::new();
        {
            let mut tree = PrintTree::new("Title", &mut out).unwrap();
            tree.new_level("a").unwrap();
            tree.add_item("b").unwrap();
            tree.end_level();
            tree.add_item("c").unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "Title\n- a\n  - b\n- c\n");
    }
}
