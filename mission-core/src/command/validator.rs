use regex::Regex;
use screen::{CommandDraft, CommandParameter};

const TWO_FACTOR_CODE_LEN: usize = 6;

/// First problem found in a command draft. `Display` is the operator-facing
/// status text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Command name is required.")]
    MissingCommand,
    #[error("Hazardous commands require a valid 6-digit 2FA code.")]
    InvalidTwoFactorCode,
    #[error("{message}")]
    MissingValue { key: String, message: String },
    #[error("Invalid regex pattern in \"{key}\".")]
    InvalidPattern { key: String, pattern: String },
    #[error("{message}")]
    PatternMismatch { key: String, message: String },
}

pub struct CommandValidator;

impl CommandValidator {
    /// Checks a draft, stopping at the first failure: command name, then the
    /// 2FA gate for hazardous commands, then parameters in declared order.
    pub fn validate(draft: &CommandDraft) -> Result<(), ValidationError> {
        if draft.command.trim().is_empty() {
            return Err(ValidationError::MissingCommand);
        }
        if draft.is_hazardous && !Self::is_valid_two_factor_code(&draft.two_factor_code) {
            return Err(ValidationError::InvalidTwoFactorCode);
        }
        for param in &draft.parameters {
            Self::validate_parameter(param)?;
        }
        Ok(())
    }

    pub fn is_valid_two_factor_code(code: &str) -> bool {
        code.len() == TWO_FACTOR_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
    }

    /// The required check looks at the trimmed value; the pattern is searched
    /// for anywhere in the raw value unless it carries its own anchors.
    pub fn validate_parameter(param: &CommandParameter) -> Result<(), ValidationError> {
        let rule = &param.rule;
        if rule.required && param.value.trim().is_empty() {
            return Err(ValidationError::MissingValue {
                key: param.key.clone(),
                message: rule
                    .error_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Value for \"{}\" is required.", param.key)),
            });
        }

        let Some(pattern) = rule.pattern() else {
            return Ok(());
        };
        let regex = Regex::new(pattern).map_err(|err| {
            log::debug!("pattern for `{}` does not compile: {err}", param.key);
            ValidationError::InvalidPattern {
                key: param.key.clone(),
                pattern: pattern.to_string(),
            }
        })?;
        if !regex.is_match(&param.value) {
            return Err(ValidationError::PatternMismatch {
                key: param.key.clone(),
                message: rule.error_message().map(str::to_string).unwrap_or_else(|| {
                    format!("Value for \"{}\" does not match pattern.", param.key)
                }),
            });
        }
        Ok(())
    }
}
