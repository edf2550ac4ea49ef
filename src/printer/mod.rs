//! Printers for one-shot results: colored text and JSON.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::coordinator::ViewState;
use crate::execution::ExecutionResult;

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    pub fn render(&self, result: &ExecutionResult) -> String {
        let text = result.message();
        if !self.color {
            return text.to_string();
        }
        match result {
            ExecutionResult::Success(_) => format!("{}", text.green()),
            ExecutionResult::Warning(_) => format!("{}", text.yellow()),
            ExecutionResult::Error(_) => format!("{}", text.red()),
        }
    }

    /// Successes go to stdout, warnings and errors to stderr.
    pub fn print(&self, result: &ExecutionResult) {
        let rendered = self.render(result);
        match result {
            ExecutionResult::Success(_) => println!("{}", rendered),
            _ => eprintln!("{}", rendered),
        }
    }
}

pub struct JsonPrinter;

impl JsonPrinter {
    pub fn render(&self, state: &ViewState) -> Result<String> {
        let value = serde_json::json!({
            "result": state.execution_result,
            "status": state.status,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn print(&self, state: &ViewState) -> Result<()> {
        println!("{}", self.render(state)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionStatus;

    #[test]
    fn plain_text_is_the_message() {
        let printer = TextPrinter { color: false };
        assert_eq!(printer.render(&ExecutionResult::Success("4".into())), "4");
    }

    #[test]
    fn colored_text_wraps_the_message() {
        let printer = TextPrinter { color: true };
        let rendered = printer.render(&ExecutionResult::Error("boom".into()));
        assert!(rendered.contains("boom"));
        assert_ne!(rendered, "boom");
    }

    #[test]
    fn json_includes_result_and_status() {
        let mut status = ExecutionStatus::default();
        status.set_info("Executed");
        let state = ViewState {
            execution_result: Some(ExecutionResult::Success("42".into())),
            status,
            ..ViewState::default()
        };
        let json: serde_json::Value = serde_json::from_str(&JsonPrinter.render(&state).unwrap()).unwrap();
        assert_eq!(json["result"]["type"], "success");
        assert_eq!(json["result"]["message"], "42");
        assert_eq!(json["status"]["label"], "Executed");
        assert_eq!(json["status"]["kind"], "info");
    }
}
