use std::cell::RefCell;
use std::rc::Rc;

use crate::api::{ConversionError, Value};

// Every alias of a flag maps to the same shared record, so `is_set` and the
// bound cell are one piece of state no matter which alias matched.
pub(crate) type SharedFlag = Rc<RefCell<Flag>>;

pub(crate) struct Flag {
    aliases: Vec<String>,
    usage: String,
    value: Box<dyn Value>,
    is_set: bool,
}

impl Flag {
    pub(crate) fn new(aliases: Vec<String>, usage: impl Into<String>, value: Box<dyn Value>) -> Self {
        Self {
            aliases,
            usage: usage.into(),
            value,
            is_set: false,
        }
    }

    pub(crate) fn shared(
        aliases: Vec<String>,
        usage: impl Into<String>,
        value: Box<dyn Value>,
    ) -> SharedFlag {
        Rc::new(RefCell::new(Self::new(aliases, usage, value)))
    }

    /// Record the match, then convert. The flag counts as supplied even when
    /// the token fails to convert.
    pub(crate) fn set(&mut self, token: &str) -> Result<(), ConversionError> {
        self.is_set = true;
        self.value.set(token)
    }

    pub(crate) fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn usage(&self) -> &str {
        &self.usage
    }

    pub(crate) fn is_set(&self) -> bool {
        self.is_set
    }

    pub(crate) fn is_bool_flag(&self) -> bool {
        self.value.is_bool_flag()
    }

    pub(crate) fn placeholder(&self) -> Option<&'static str> {
        self.value.placeholder()
    }
}

impl std::fmt::Debug for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flag")
            .field("aliases", &self.aliases)
            .field("is_set", &self.is_set)
            .finish()
    }
}
