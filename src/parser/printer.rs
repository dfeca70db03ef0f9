use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use terminal_size::{terminal_size, Width};

use crate::constant::{
    CONTINUATION_INDENT, CONTINUATION_WIDTH, MINIMUM_BODY_WIDTH, SHORT_PREFIX_WIDTH,
};
use crate::model::{Flag, SharedFlag};

// Renders the defaults block: one entry per distinct flag, ordered by
// first-registered alias.
pub(crate) struct Printer {
    flags: Vec<SharedFlag>,
    terminal_width: Option<usize>,
}

impl Printer {
    /// Sized to the attached terminal, when there is one.
    pub(crate) fn terminal(flags: &HashMap<String, SharedFlag>) -> Self {
        let terminal_width = terminal_size().map(|(Width(width), _)| width as usize);
        Self::new(flags, terminal_width)
    }

    pub(crate) fn new(flags: &HashMap<String, SharedFlag>, terminal_width: Option<usize>) -> Self {
        // The alias map holds one entry per alias; deduplicate by record
        // identity before sorting.
        let mut visited: HashSet<*const RefCell<Flag>> = HashSet::default();
        let mut distinct: Vec<SharedFlag> = Vec::default();

        for flag in flags.values() {
            if visited.insert(Rc::as_ptr(flag)) {
                distinct.push(Rc::clone(flag));
            }
        }

        distinct.sort_by(|a, b| a.borrow().aliases()[0].cmp(&b.borrow().aliases()[0]));

        Self {
            flags: distinct,
            terminal_width,
        }
    }

    pub(crate) fn defaults(&self) -> String {
        let mut entries = Vec::default();

        for flag in &self.flags {
            entries.push(self.render(&flag.borrow()));
        }

        entries.join("\n")
    }

    fn render(&self, flag: &Flag) -> String {
        let mut line = String::from("  ");

        for (i, alias) in flag.aliases().iter().enumerate() {
            if i > 0 {
                line.push(',');
            }

            if alias.chars().count() > 1 {
                line.push_str("--");
            } else {
                line.push('-');
            }

            line.push_str(alias);
        }

        let (placeholder, usage) = unquote_usage(flag);

        if !placeholder.is_empty() {
            line.push(' ');
            line.push_str(&placeholder);
        }

        if line.chars().count() <= SHORT_PREFIX_WIDTH {
            line.push('\t');
        } else {
            line.push('\n');
            line.push_str(CONTINUATION_INDENT);
        }

        line.push_str(&self.layout(&usage));
        line
    }

    // Embedded newlines re-indent to the continuation column; with a known
    // terminal width, paragraphs word-wrap to fit as well.
    fn layout(&self, usage: &str) -> String {
        let width = self
            .terminal_width
            .map(|width| std::cmp::max(width.saturating_sub(CONTINUATION_WIDTH), MINIMUM_BODY_WIDTH));
        let mut parts: Vec<String> = Vec::default();

        for paragraph in usage.split('\n') {
            match width {
                Some(width) => parts.extend(chunk(paragraph, width)),
                None => parts.push(String::from(paragraph)),
            }
        }

        parts.join(&format!("\n{CONTINUATION_INDENT}"))
    }
}

// The first backtick-quoted span names the value placeholder; the backticks
// are stripped from the description. Without one, the value supplies a
// type-based default.
fn unquote_usage(flag: &Flag) -> (String, String) {
    let usage = flag.usage();

    if let Some(start) = usage.find('`') {
        if let Some(length) = usage[start + 1..].find('`') {
            let name = &usage[start + 1..start + 1 + length];
            let unquoted = format!(
                "{}{}{}",
                &usage[..start],
                name,
                &usage[start + 1 + length + 1..]
            );
            return (String::from(name), unquoted);
        }
    }

    let name = flag.placeholder().unwrap_or_default();
    (String::from(name), String::from(usage))
}

// Greedy word fill; a word longer than `width` gets its own line, unbroken.
fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + word.chars().count() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = String::from(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    // A blank paragraph still occupies a line.
    if lines.is_empty() {
        lines.push(String::default());
    }

    lines
}
