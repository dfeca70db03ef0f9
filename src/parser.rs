mod base;
mod interface;
mod printer;

pub use base::ParseError;
pub use interface::{ConsoleInterface, UserInterface};

pub(crate) use base::Scanner;
pub(crate) use printer::Printer;

#[cfg(any(test, feature = "unit_test"))]
pub use interface::util;
