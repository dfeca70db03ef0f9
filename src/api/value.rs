use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::constant::{
    DEFAULT_PLACEHOLDER, INT_PLACEHOLDER, STRINGS_PLACEHOLDER, STRING_PLACEHOLDER,
};

/// A token failed its type-specific literal conversion.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot convert '{token}' to {type_name}.")]
pub struct ConversionError {
    token: String,
    type_name: &'static str,
}

impl ConversionError {
    /// Create a conversion error for `token` failing to parse as `type_name`.
    pub fn new(token: impl Into<String>, type_name: &'static str) -> Self {
        Self {
            token: token.into(),
            type_name,
        }
    }
}

/// Behaviour to convert command line tokens into a typed storage cell.
///
/// Implementations hold a clone of an `Rc<RefCell<..>>` cell; the caller keeps
/// another clone and reads it after parsing. The `Display` form is the
/// canonical rendering of the current content. It exists for display purposes
/// only and is never consumed by the parser.
///
/// The two provided methods are capability hooks. Overriding them is how a
/// value kind changes parser and help behaviour without the parser naming any
/// concrete types.
pub trait Value: fmt::Display {
    /// Convert `token` and store the result into the bound cell.
    ///
    /// On failure the cell is left untouched.
    fn set(&mut self, token: &str) -> Result<(), ConversionError>;

    /// Whether bare presence implies a `true` value.
    ///
    /// When this returns `true` the parser never requires a following token
    /// to supply this flag's value.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// The value-placeholder shown in help text when the usage string carries
    /// no backtick-quoted name. `None` renders no placeholder at all.
    fn placeholder(&self) -> Option<&'static str> {
        Some(DEFAULT_PLACEHOLDER)
    }
}

/// A boolean cell.
///
/// Accepts the standard boolean literals `1`, `t`, `T`, `TRUE`, `true`,
/// `True`, `0`, `f`, `F`, `FALSE`, `false`, `False`.
pub struct BoolValue {
    cell: Rc<RefCell<bool>>,
}

impl BoolValue {
    /// Bind to `cell`.
    pub fn new(cell: Rc<RefCell<bool>>) -> Self {
        Self { cell }
    }
}

impl Value for BoolValue {
    fn set(&mut self, token: &str) -> Result<(), ConversionError> {
        let value = match token {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => return Err(ConversionError::new(token, std::any::type_name::<bool>())),
        };
        *self.cell.borrow_mut() = value;
        Ok(())
    }

    fn is_bool_flag(&self) -> bool {
        true
    }

    fn placeholder(&self) -> Option<&'static str> {
        None
    }
}

impl fmt::Display for BoolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cell.borrow())
    }
}

/// A text cell. Stores the raw token verbatim, replacing any prior value.
pub struct StringValue {
    cell: Rc<RefCell<String>>,
}

impl StringValue {
    /// Bind to `cell`.
    pub fn new(cell: Rc<RefCell<String>>) -> Self {
        Self { cell }
    }
}

impl Value for StringValue {
    fn set(&mut self, token: &str) -> Result<(), ConversionError> {
        *self.cell.borrow_mut() = String::from(token);
        Ok(())
    }

    fn placeholder(&self) -> Option<&'static str> {
        Some(STRING_PLACEHOLDER)
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cell.borrow())
    }
}

/// A text-list cell. Each occurrence appends one element in encounter order;
/// nothing is ever overwritten.
pub struct StringsValue {
    cell: Rc<RefCell<Vec<String>>>,
}

impl StringsValue {
    /// Bind to `cell`.
    pub fn new(cell: Rc<RefCell<Vec<String>>>) -> Self {
        Self { cell }
    }
}

impl Value for StringsValue {
    fn set(&mut self, token: &str) -> Result<(), ConversionError> {
        self.cell.borrow_mut().push(String::from(token));
        Ok(())
    }

    fn placeholder(&self) -> Option<&'static str> {
        Some(STRINGS_PLACEHOLDER)
    }
}

impl fmt::Display for StringsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.cell.borrow().join(", "))
    }
}

/// A platform-width integer cell.
///
/// Accepts an optional leading `-`, then `0x`/`0X` hex, `0o`/`0O` octal,
/// leading-zero octal, or decimal digits.
pub struct IntValue {
    cell: Rc<RefCell<isize>>,
}

impl IntValue {
    /// Bind to `cell`.
    pub fn new(cell: Rc<RefCell<isize>>) -> Self {
        Self { cell }
    }
}

impl Value for IntValue {
    fn set(&mut self, token: &str) -> Result<(), ConversionError> {
        let value = parse_int(token)
            .ok_or_else(|| ConversionError::new(token, std::any::type_name::<isize>()))?;
        *self.cell.borrow_mut() = value;
        Ok(())
    }

    fn placeholder(&self) -> Option<&'static str> {
        Some(INT_PLACEHOLDER)
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cell.borrow())
    }
}

fn parse_int(token: &str) -> Option<isize> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(octal) = body
        .strip_prefix("0o")
        .or_else(|| body.strip_prefix("0O"))
    {
        (8, octal)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() {
        return None;
    }

    // Parse with the sign attached; the magnitude of isize::MIN does not fit
    // in an isize on its own.
    if negative {
        isize::from_str_radix(&format!("-{digits}"), radix).ok()
    } else {
        isize::from_str_radix(digits, radix).ok()
    }
}
