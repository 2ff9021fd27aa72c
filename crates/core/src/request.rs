//! Validated caller input.

use std::str::FromStr;

use crate::error::ValidationError;

/// A prompt that passed boundary validation.
///
/// Only constructible through [`GenerationRequest::new`], so the core never
/// sees an empty prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
	prompt: String,
}

impl GenerationRequest {
	/// Trims `prompt` and rejects it if nothing is left.
	pub fn new(prompt: impl AsRef<str>) -> Result<Self, ValidationError> {
		let prompt = prompt.as_ref().trim();
		if prompt.is_empty() {
			return Err(ValidationError::EmptyPrompt);
		}
		Ok(Self { prompt: prompt.to_string() })
	}

	pub fn prompt(&self) -> &str {
		&self.prompt
	}
}

impl FromStr for GenerationRequest {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_prompts_are_rejected() {
		assert_eq!(GenerationRequest::new(""), Err(ValidationError::EmptyPrompt));
		assert_eq!(GenerationRequest::new(" \n\t"), Err(ValidationError::EmptyPrompt));
	}

	#[test]
	fn prompt_is_trimmed() {
		let request: GenerationRequest = "  a red fox ".parse().unwrap();
		assert_eq!(request.prompt(), "a red fox");
	}
}
