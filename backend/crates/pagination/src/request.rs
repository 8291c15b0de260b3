//! Parsing of the raw `page` query parameter.

/// Page number requested by a client, before range resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    /// No page parameter was supplied.
    #[default]
    Unspecified,
    /// The parameter was present but is not an integer.
    NotANumber,
    /// An integer page number, possibly outside the valid range.
    ///
    /// Values that overflow `i64` saturate so that very large numbers still
    /// resolve to the last page.
    Number(i64),
}

impl PageRequest {
    /// Parse the raw parameter value.
    ///
    /// Surrounding whitespace is ignored and an optional sign is accepted.
    /// Anything else that is not made of ASCII digits is
    /// [`PageRequest::NotANumber`].
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// assert_eq!(PageRequest::parse(None), PageRequest::Unspecified);
    /// assert_eq!(PageRequest::parse(Some(" 2 ")), PageRequest::Number(2));
    /// assert_eq!(PageRequest::parse(Some("two")), PageRequest::NotANumber);
    /// ```
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(value) = raw else {
            return Self::Unspecified;
        };
        let trimmed = value.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Self::NotANumber;
        }

        let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
        if negative {
            Self::Number(magnitude.saturating_neg())
        } else {
            Self::Number(magnitude)
        }
    }
}
