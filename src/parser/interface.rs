use crate::parser::ParseError;

/// The sink for diagnostics: parse error lines and usage text.
pub trait UserInterface {
    /// Print a message (usage text, caller-initiated diagnostics).
    fn print(&self, message: String);

    /// Print a parse error line.
    fn print_error(&self, error: &ParseError);
}

/// The production interface: messages to stdout, errors to stderr.
#[derive(Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: &ParseError) {
        eprintln!("{error}");
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub mod util {
    //! In-memory and channel-backed [`UserInterface`] implementations for
    //! test suites.

    use std::cell::RefCell;
    use std::sync::mpsc;

    use crate::parser::{ParseError, UserInterface};

    /// Collects printed messages and error lines in memory.
    ///
    /// Useful when the interface outlives the flag set under test; otherwise
    /// see [`channel_interface`].
    #[derive(Default)]
    pub struct InMemoryInterface {
        message: RefCell<Option<Vec<String>>>,
        error: RefCell<Option<Vec<String>>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            push(&self.message, message);
        }

        fn print_error(&self, error: &ParseError) {
            push(&self.error, error.to_string());
        }
    }

    impl InMemoryInterface {
        /// Take the accumulated (message, error) pair, each concatenated with
        /// newlines.
        pub fn consume(self) -> (Option<String>, Option<String>) {
            let InMemoryInterface { message, error } = self;
            (
                message.take().map(|messages| messages.join("\n")),
                error.take().map(|errors| errors.join("\n")),
            )
        }

        /// Take the accumulated message, asserting no error line was printed.
        pub fn consume_message(self) -> String {
            let (message, error) = self.consume();
            assert_eq!(error, None);
            message.unwrap()
        }
    }

    fn push(buffer: &RefCell<Option<Vec<String>>>, line: String) {
        let mut output = buffer.borrow_mut();

        match output.as_mut() {
            Some(lines) => lines.push(line),
            None => {
                output.replace(vec![line]);
            }
        }
    }

    /// A connected (sender, receiver) interface pair.
    ///
    /// Hand the sender to a flag set; drop the set, then read the output from
    /// the receiver. The receiver's `consume` blocks until the sender half is
    /// dropped.
    pub fn channel_interface() -> (SenderInterface, ReceiverInterface) {
        let (message_tx, message_rx) = mpsc::channel();
        let (error_tx, error_rx) = mpsc::channel();
        let sender = SenderInterface {
            message_tx,
            error_tx,
        };
        let receiver = ReceiverInterface {
            message_rx,
            error_rx,
        };
        (sender, receiver)
    }

    /// The sending half of [`channel_interface`].
    pub struct SenderInterface {
        message_tx: mpsc::Sender<Option<String>>,
        error_tx: mpsc::Sender<Option<String>>,
    }

    impl Drop for SenderInterface {
        fn drop(&mut self) {
            let _ = self.message_tx.send(None);
            let _ = self.error_tx.send(None);
        }
    }

    impl UserInterface for SenderInterface {
        fn print(&self, message: String) {
            self.message_tx.send(Some(message)).unwrap();
        }

        fn print_error(&self, error: &ParseError) {
            self.error_tx.send(Some(error.to_string())).unwrap();
        }
    }

    /// The receiving half of [`channel_interface`].
    pub struct ReceiverInterface {
        message_rx: mpsc::Receiver<Option<String>>,
        error_rx: mpsc::Receiver<Option<String>>,
    }

    impl ReceiverInterface {
        /// Drain both channels into a (message, error) pair, each
        /// concatenated with newlines.
        pub fn consume(self) -> (Option<String>, Option<String>) {
            let ReceiverInterface {
                message_rx,
                error_rx,
            } = self;
            (drain(message_rx), drain(error_rx))
        }

        /// Drain both channels, asserting no error line was printed.
        pub fn consume_message(self) -> String {
            let (message, error) = self.consume();
            assert_eq!(error, None);
            message.unwrap()
        }
    }

    fn drain(receiver: mpsc::Receiver<Option<String>>) -> Option<String> {
        let mut values = Vec::default();

        while let Some(message) = receiver.recv().unwrap() {
            values.push(message);
        }

        if values.is_empty() {
            None
        } else {
            Some(values.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::util::*;
    use super::*;

    #[test]
    fn in_memory_accumulates() {
        let interface = InMemoryInterface::default();

        interface.print(String::from("one"));
        interface.print(String::from("two"));
        interface.print_error(&ParseError::HelpRequested);

        let (message, error) = interface.consume();
        assert_eq!(message, Some(String::from("one\ntwo")));
        assert_eq!(error, Some(String::from("help requested.")));
    }

    #[test]
    fn channel_round_trip() {
        let (sender, receiver) = channel_interface();

        sender.print(String::from("one"));
        sender.print(String::from("two"));
        drop(sender);

        let message = receiver.consume_message();
        assert_eq!(message, "one\ntwo");
    }
}
