use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::api::value::{BoolValue, IntValue, StringValue, StringsValue, Value};
use crate::model::{Flag, SharedFlag};
use crate::parser::{ConsoleInterface, ParseError, Printer, Scanner, UserInterface};

/// The flag registry: owns every registered flag, runs parses against them,
/// and renders their usage text.
///
/// A `FlagSet` is an explicit, caller-constructed instance; there is no
/// process-wide default. Register every flag before the first
/// [`parse`](FlagSet::parse) call.
///
/// ### Example
/// ```
/// use flagset::FlagSet;
///
/// let mut set = FlagSet::console("program [flags] <file>");
/// let verbose = set.bool("v,verbose", "Print progress information.");
///
/// set.parse(&["-v", "notes.txt"]).unwrap();
///
/// assert!(*verbose.borrow());
/// assert_eq!(set.arg(0), "notes.txt");
/// ```
pub struct FlagSet {
    flags: HashMap<String, SharedFlag>,
    positionals: Vec<String>,
    header: String,
    interface: Box<dyn UserInterface>,
}

impl std::fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSet")
            .field("header", &self.header)
            .finish()
    }
}

impl FlagSet {
    /// Create a flag set writing diagnostics to `interface`; `header` is the
    /// text rendered after `Usage:` in the usage block.
    pub fn new(interface: Box<dyn UserInterface>, header: impl Into<String>) -> Self {
        Self {
            flags: HashMap::default(),
            positionals: Vec::default(),
            header: header.into(),
            interface,
        }
    }

    /// Create a flag set writing diagnostics to the console.
    pub fn console(header: impl Into<String>) -> Self {
        Self::new(Box::new(ConsoleInterface::default()), header)
    }

    /// Register `value` under every comma-separated alias in `names`.
    ///
    /// One-character aliases are addressed as `-x` on the command line;
    /// longer aliases as `--xyz`. All aliases share one flag record, so the
    /// bound cell and the `is_set` state are common to them. Re-using an
    /// already-registered alias re-routes that alias only; other aliases of
    /// the displaced flag keep pointing at it.
    ///
    /// # Panics
    /// When `names` yields no aliases. That is a programming error in the
    /// registering program, not a runtime condition.
    pub fn var(&mut self, value: impl Value + 'static, names: &str, usage: &str) {
        let aliases: Vec<String> = names.split(',').map(String::from).collect();
        assert!(
            !aliases.is_empty(),
            "tried to register a flag without any alias"
        );
        let flag = Flag::shared(aliases.clone(), usage, Box::new(value));

        for alias in aliases {
            self.flags.insert(alias, Rc::clone(&flag));
        }
    }

    /// Register a boolean flag with a fresh cell, returning the cell.
    pub fn bool(&mut self, names: &str, usage: &str) -> Rc<RefCell<bool>> {
        let cell = Rc::new(RefCell::new(false));
        self.bool_var(Rc::clone(&cell), names, usage);
        cell
    }

    /// Register a boolean flag bound to a caller-created cell.
    pub fn bool_var(&mut self, cell: Rc<RefCell<bool>>, names: &str, usage: &str) {
        self.var(BoolValue::new(cell), names, usage);
    }

    /// Register a text flag with a fresh cell, returning the cell.
    pub fn string(&mut self, names: &str, usage: &str) -> Rc<RefCell<String>> {
        let cell = Rc::new(RefCell::new(String::default()));
        self.string_var(Rc::clone(&cell), names, usage);
        cell
    }

    /// Register a text flag bound to a caller-created cell.
    pub fn string_var(&mut self, cell: Rc<RefCell<String>>, names: &str, usage: &str) {
        self.var(StringValue::new(cell), names, usage);
    }

    /// Register a text-list flag with a fresh cell, returning the cell.
    pub fn strings(&mut self, names: &str, usage: &str) -> Rc<RefCell<Vec<String>>> {
        let cell = Rc::new(RefCell::new(Vec::default()));
        self.strings_var(Rc::clone(&cell), names, usage);
        cell
    }

    /// Register a text-list flag bound to a caller-created cell.
    pub fn strings_var(&mut self, cell: Rc<RefCell<Vec<String>>>, names: &str, usage: &str) {
        self.var(StringsValue::new(cell), names, usage);
    }

    /// Register an integer flag with a fresh cell, returning the cell.
    pub fn int(&mut self, names: &str, usage: &str) -> Rc<RefCell<isize>> {
        let cell = Rc::new(RefCell::new(isize::default()));
        self.int_var(Rc::clone(&cell), names, usage);
        cell
    }

    /// Register an integer flag bound to a caller-created cell.
    pub fn int_var(&mut self, cell: Rc<RefCell<isize>>, names: &str, usage: &str) {
        self.var(IntValue::new(cell), names, usage);
    }

    /// Parse `tokens` against the registered flags.
    ///
    /// On the first error the parse aborts: the error line (suppressed for
    /// [`ParseError::HelpRequested`]) and the usage block are written to the
    /// interface, and the error is returned.
    ///
    /// Repeated calls accumulate. Positional arguments and list values keep
    /// appending, and `is_set` state carries over; nothing is reset between
    /// calls.
    pub fn parse(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
        let outcome = Scanner::new(&self.flags, &mut self.positionals, tokens).run();

        if let Err(error) = &outcome {
            if !matches!(error, ParseError::HelpRequested) {
                self.interface.print_error(error);
            }
            self.print_usage();
        }

        outcome
    }

    /// Whether `alias` was explicitly supplied during any parse so far.
    ///
    /// Unregistered aliases are never set.
    pub fn is_set(&self, alias: &str) -> bool {
        self.flags
            .get(alias)
            .map(|flag| flag.borrow().is_set())
            .unwrap_or(false)
    }

    /// The positional argument at `index`, or `""` when out of range.
    pub fn arg(&self, index: usize) -> &str {
        self.positionals
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All positional arguments in encounter order.
    pub fn args(&self) -> &[String] {
        &self.positionals
    }

    /// The defaults block: one entry per distinct flag, ordered by
    /// first-registered alias. Empty when no flags are registered.
    pub fn defaults(&self) -> String {
        Printer::terminal(&self.flags).defaults()
    }

    /// The full usage text: the `Usage:` header, then a blank line and the
    /// defaults block when any flags are registered.
    pub fn usage_text(&self) -> String {
        let defaults = self.defaults();

        if defaults.is_empty() {
            format!("Usage: {}", self.header)
        } else {
            format!("Usage: {}\n\n{}", self.header, defaults)
        }
    }

    /// Render the full usage text to the interface.
    pub fn print_usage(&self) {
        self.interface.print(self.usage_text());
    }

    /// Render `message` and the full usage text to the interface.
    pub fn print_error(&self, message: impl Into<String>) {
        self.interface.print(message.into());
        self.print_usage();
    }
}
