use console::style;
use std::cell::RefCell;

/// Console report writer
///
/// Every line, passing or failing, goes to stdout so a summary reads top to
/// bottom from one stream. Fatal errors that abort a command are printed by
/// `main` on stderr.
pub struct Output {
    capture: Option<RefCell<String>>,
}

impl Output {
    pub fn new() -> Self {
        Self { capture: None }
    }

    /// Output that records lines instead of printing them
    #[cfg(test)]
    pub(crate) fn captured() -> Self {
        Self {
            capture: Some(RefCell::new(String::new())),
        }
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> String {
        self.capture
            .as_ref()
            .map(|c| c.borrow().clone())
            .unwrap_or_default()
    }

    fn emit(&self, line: String) {
        match &self.capture {
            Some(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(&line);
                buffer.push('\n');
            }
            None => println!("{}", line),
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(format!("{} {}", style("✓").green(), message));
    }

    pub fn error(&self, message: &str) {
        self.emit(format!("{} {}", style("✗").red(), message));
    }

    pub fn warning(&self, message: &str) {
        self.emit(format!("{} {}", style("⚠").yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.emit(format!("{} {}", style("ℹ").blue(), message));
    }

    /// Pass/fail line with an indented detail underneath
    pub fn status(&self, passed: bool, message: &str, detail: Option<&str>) {
        if passed {
            self.success(message);
        } else {
            self.error(message);
        }
        if let Some(detail) = detail {
            self.emit(format!("    {}", style(detail).dim()));
        }
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        self.emit(format!(
            "  {:<10} {}",
            style(format!("{}:", label)).dim(),
            value
        ));
    }

    pub fn blank(&self) {
        self.emit(String::new());
    }

    pub fn line(&self, text: &str) {
        self.emit(text.to_string());
    }

    pub fn header(&self, message: &str) {
        self.emit(format!("\n{}", style(message).bold().underlined()));
    }

    pub fn section(&self, message: &str) {
        self.emit(format!("\n{}", style(message).bold()));
        self.emit("─".repeat(40));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
