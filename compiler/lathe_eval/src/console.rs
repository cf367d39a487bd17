//! Console output for debug actions.
//!
//! The console is where `print` actions write. Output can go to stdout
//! (the default), be captured in a buffer (tests, embedding), or be
//! discarded. Enum dispatch keeps the hot path free of vtable calls.

use std::sync::Arc;

use parking_lot::Mutex;

/// Where console output goes.
pub enum Console {
    /// Write to the process stdout.
    Stdout,
    /// Capture into a buffer, retrievable with [`Console::captured`].
    Buffer(Mutex<String>),
    /// Discard everything.
    Silent,
}

impl Console {
    pub fn write(&self, text: &str) {
        match self {
            Console::Stdout => print!("{text}"),
            Console::Buffer(buf) => buf.lock().push_str(text),
            Console::Silent => {}
        }
    }

    pub fn writeln(&self, text: &str) {
        match self {
            Console::Stdout => println!("{text}"),
            Console::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(text);
                buf.push('\n');
            }
            Console::Silent => {}
        }
    }

    /// Everything captured so far. Empty for consoles that do not
    /// capture.
    pub fn captured(&self) -> String {
        match self {
            Console::Buffer(buf) => buf.lock().clone(),
            Console::Stdout | Console::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Console::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// A console handle shared by every frame of an evaluation.
pub type SharedConsole = Arc<Console>;

pub fn stdout_console() -> SharedConsole {
    Arc::new(Console::Stdout)
}

pub fn buffer_console() -> SharedConsole {
    Arc::new(Console::Buffer(Mutex::new(String::new())))
}

pub fn silent_console() -> SharedConsole {
    Arc::new(Console::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_captures_in_order() {
        let console = buffer_console();
        console.write("a");
        console.write("b");
        console.writeln("c");
        assert_eq!(console.captured(), "abc\n");
    }

    #[test]
    fn buffer_clear_empties() {
        let console = buffer_console();
        console.writeln("x");
        console.clear();
        assert_eq!(console.captured(), "");
    }

    #[test]
    fn silent_discards() {
        let console = silent_console();
        console.writeln("gone");
        assert_eq!(console.captured(), "");
    }
}
