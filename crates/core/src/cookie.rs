//! Turning raw `Set-Cookie` header values into a [`Session`].
//!
//! Pure functions only; the session provider feeds them header values and
//! the tests feed them fixtures.

use std::borrow::Cow;

use imagegen_protocol::{Session, TOKEN_COOKIE};

use crate::error::SessionError;
use crate::headers::check_session;

/// Splits one `Set-Cookie` value into its `(name, value)` pair.
///
/// Attributes after the first `;` are dropped. Returns `None` for values with
/// no `=` or an empty name.
pub fn parse_set_cookie(raw: &str) -> Option<(&str, &str)> {
	let pair = raw.split(';').next()?.trim();
	let (name, value) = pair.split_once('=')?;
	let name = name.trim();
	if name.is_empty() {
		return None;
	}
	Some((name, value.trim()))
}

/// Builds a [`Session`] from every `Set-Cookie` value of a response.
///
/// All cookies are rejoined as `name=value` pairs for the `Cookie` header.
/// The first [`TOKEN_COOKIE`] supplies the CSRF token after percent-decoding.
pub fn session_from_set_cookies<'a, I>(values: I) -> Result<Session, SessionError>
where
	I: IntoIterator<Item = &'a str>,
{
	let pairs: Vec<(&str, &str)> = values.into_iter().filter_map(parse_set_cookie).collect();

	let raw_token = pairs
		.iter()
		.find(|(name, _)| *name == TOKEN_COOKIE)
		.map(|(_, value)| *value)
		.ok_or(SessionError::MissingToken { cookie: TOKEN_COOKIE })?;

	let token = decode_token(raw_token)?;
	if token.trim().is_empty() {
		return Err(SessionError::EmptyToken { cookie: TOKEN_COOKIE });
	}

	let cookie_header = pairs
		.iter()
		.map(|(name, value)| format!("{name}={value}"))
		.collect::<Vec<_>>()
		.join("; ");

	let session = Session::new(cookie_header, token);
	check_session(&session)?;
	Ok(session)
}

fn decode_token(raw: &str) -> Result<String, SessionError> {
	urlencoding::decode(raw)
		.map(Cow::into_owned)
		.map_err(|_| SessionError::UndecodableToken { cookie: TOKEN_COOKIE })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_attributes_and_decodes_token() {
		let session = session_from_set_cookies([
			"XSRF-TOKEN=abc%3D%3D; expires=Tue, 01 Jan 2030 00:00:00 GMT; Max-Age=7200; path=/; samesite=lax",
			"tinywow_session=eyJpdiI6; expires=Tue, 01 Jan 2030 00:00:00 GMT; path=/; httponly",
		])
		.unwrap();

		assert_eq!(session.csrf_token, "abc==");
		assert_eq!(session.cookie_header, "XSRF-TOKEN=abc%3D%3D; tinywow_session=eyJpdiI6");
	}

	#[test]
	fn token_cookie_may_appear_anywhere() {
		let session = session_from_set_cookies(["a=1; Path=/", "XSRF-TOKEN=tok; Path=/", "b=2"]).unwrap();
		assert_eq!(session.csrf_token, "tok");
		assert_eq!(session.cookie_header, "a=1; XSRF-TOKEN=tok; b=2");
	}

	#[test]
	fn first_token_cookie_wins() {
		let session = session_from_set_cookies(["XSRF-TOKEN=first", "XSRF-TOKEN=second"]).unwrap();
		assert_eq!(session.csrf_token, "first");
	}

	#[test]
	fn missing_token_is_an_error() {
		let err = session_from_set_cookies(["laravel_session=x; Path=/"]).unwrap_err();
		assert!(matches!(err, SessionError::MissingToken { .. }));

		let err = session_from_set_cookies(std::iter::empty()).unwrap_err();
		assert!(matches!(err, SessionError::MissingToken { .. }));
	}

	#[test]
	fn empty_token_is_an_error() {
		let err = session_from_set_cookies(["XSRF-TOKEN=; Path=/"]).unwrap_err();
		assert!(matches!(err, SessionError::EmptyToken { .. }));
	}

	#[test]
	fn token_name_must_match_exactly() {
		let err = session_from_set_cookies(["XSRF-TOKEN-OLD=abc", "xsrf-token=abc"]).unwrap_err();
		assert!(matches!(err, SessionError::MissingToken { .. }));
	}

	#[test]
	fn undecodable_token_is_an_error() {
		let err = session_from_set_cookies(["XSRF-TOKEN=%FF%FE"]).unwrap_err();
		assert!(matches!(err, SessionError::UndecodableToken { .. }));
	}

	#[test]
	fn token_that_decodes_to_a_control_character_is_an_error() {
		let err = session_from_set_cookies(["XSRF-TOKEN=bad%0Atoken"]).unwrap_err();
		assert!(matches!(err, SessionError::Unsendable { .. }));
	}

	#[test]
	fn malformed_values_are_skipped() {
		assert_eq!(parse_set_cookie("novalue"), None);
		assert_eq!(parse_set_cookie("=orphan"), None);
		assert_eq!(parse_set_cookie(" name = v ; Secure"), Some(("name", "v")));
		assert_eq!(parse_set_cookie("a=b=c; Path=/"), Some(("a", "b=c")));
	}
}
