use std::fmt;

/// Severity code carried by an [`Outcome`].
///
/// Ordered so that merging two outcomes can keep the worse of the two codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutcomeCode {
    Success,
    Warning,
    Failure,
}

impl OutcomeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCode::Success => "Success",
            OutcomeCode::Warning => "Warning",
            OutcomeCode::Failure => "Failure",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform return value of every lifecycle operation.
///
/// Carries a severity code plus an ordered list of human-readable messages.
/// Callers must check the code rather than assume success; only
/// [`OutcomeCode::Failure`] means the requested transition did not happen.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    code: OutcomeCode,
    messages: Vec<String>,
}

impl Outcome {
    /// Successful outcome with no messages.
    pub fn success() -> Self {
        Self {
            code: OutcomeCode::Success,
            messages: Vec::new(),
        }
    }

    /// Warning outcome: the operation took effect but something is worth
    /// reporting to the caller.
    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            code: OutcomeCode::Warning,
            messages: vec![message.into()],
        }
    }

    /// Failure outcome: the operation did not take effect.
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            code: OutcomeCode::Failure,
            messages: vec![message.into()],
        }
    }

    pub fn code(&self) -> OutcomeCode {
        self.code
    }

    /// Messages in the order they were recorded.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_success(&self) -> bool {
        self.code == OutcomeCode::Success
    }

    pub fn is_failure(&self) -> bool {
        self.code == OutcomeCode::Failure
    }

    /// Append a message without changing the code.
    pub fn push_message<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }

    /// Combine two outcomes: the worse code wins and messages are
    /// concatenated in order. Used by compound operations such as restart.
    pub fn merge(mut self, other: Outcome) -> Outcome {
        self.code = self.code.max(other.code);
        self.messages.extend(other.messages);
        self
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::success()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.messages.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_messages() {
        let outcome = Outcome::success();
        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert!(outcome.messages().is_empty());
    }

    #[test]
    fn test_failure_carries_message() {
        let outcome = Outcome::failure("dependency not running");
        assert!(outcome.is_failure());
        assert_eq!(outcome.messages(), &["dependency not running".to_string()]);
    }

    #[test]
    fn test_merge_keeps_worst_code() {
        let merged = Outcome::success().merge(Outcome::warning("degraded"));
        assert_eq!(merged.code(), OutcomeCode::Warning);

        let merged = Outcome::warning("degraded").merge(Outcome::failure("broken"));
        assert_eq!(merged.code(), OutcomeCode::Failure);
        assert_eq!(merged.messages().len(), 2);
    }

    #[test]
    fn test_merge_preserves_message_order() {
        let merged = Outcome::failure("first").merge(Outcome::failure("second"));
        assert_eq!(
            merged.messages(),
            &["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_push_message_keeps_code() {
        let mut outcome = Outcome::warning("degraded");
        outcome.push_message("details follow");
        assert_eq!(outcome.code(), OutcomeCode::Warning);
        assert_eq!(
            outcome.messages(),
            &["degraded".to_string(), "details follow".to_string()]
        );
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Outcome::success().to_string(), "Success");
        assert_eq!(
            Outcome::failure("not running").to_string(),
            "Failure: not running"
        );
    }
}
