use nom_locate::LocatedSpan;

use crate::error::{Error, ErrorKind};

pub type Span<'a> = LocatedSpan<&'a str>;

pub type IResult<'a, O> = nom::IResult<Span<'a>, O, ParseError<'a>>;

#[derive(Debug, PartialEq)]
pub struct ParseError<'a> {
    message: String,
    wherein: Span<'a>,
}

impl<'a> ParseError<'a> {
    pub fn new(message: String, wherein: Span<'a>) -> Self {
        Self { message, wherein }
    }

    pub fn message(&self) -> &String {
        &self.message
    }

    pub fn line(&self) -> u32 {
        self.wherein.location_line()
    }

    pub fn offset(&self) -> usize {
        self.wherein.location_offset()
    }
}

impl<'a> nom::error::ParseError<Span<'a>> for ParseError<'a> {
    fn from_error_kind(input: Span<'a>, kind: nom::error::ErrorKind) -> Self {
        Self::new(format!("parse error {:?}", kind), input)
    }

    fn append(_input: Span<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: Span<'a>, c: char) -> Self {
        Self::new(format!("expected '{}'", c), input)
    }
}

impl<'a> From<ParseError<'a>> for Error {
    fn from(err: ParseError<'a>) -> Self {
        Error::with_kind(
            ErrorKind::Parse,
            &format!("{}:{} {}", err.line(), err.offset(), err.message()),
        )
    }
}

/// Converts a top-level parser outcome into a crate result, rejecting
/// anything left unconsumed.
pub(super) fn complete<'a, O>(result: IResult<'a, O>) -> crate::error::Result<O> {
    match result {
        Ok((rest, _)) if !rest.fragment().trim().is_empty() => Err(ParseError::new(
            format!("unexpected trailing input '{}'", rest.fragment()),
            rest,
        )
        .into()),
        Ok((_, output)) => Ok(output),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into()),
        Err(nom::Err::Incomplete(_)) => Err(Error::with_kind(
            ErrorKind::Parse,
            "unexpected end of input",
        )),
    }
}

pub(super) fn failure<'a, O>(message: String, wherein: Span<'a>) -> IResult<'a, O> {
    Err(nom::Err::Failure(ParseError::new(message, wherein)))
}
