use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, char as nom_char, digit1, multispace0, one_of},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{pair, preceded, separated_pair},
};

use super::result::{failure, IResult, Span};
use crate::model::{DimensionValue, MetricValue};

// Characters that terminate a bare dimension value in the text form.
const VALUE_DELIMITERS: &str = ",}= \t\r\n";

/// A bare identifier or a double-quoted string.
pub(super) fn name(input: Span) -> IResult<String> {
    alt((identifier, quoted))(input)
}

fn identifier(input: Span) -> IResult<String> {
    // [a-zA-Z_][a-zA-Z0-9_.:-]*
    let (rest, m) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_"), tag("."), tag(":"), tag("-")))),
    ))(input)?;
    Ok((rest, String::from(*m.fragment())))
}

/// `"..."` with `\"` and `\\` as the only escapes.
fn quoted(input: Span) -> IResult<String> {
    let (mut rest, _) = nom_char('"')(input)?;
    let mut unescaped = String::new();

    loop {
        let (r, chunk) = opt(is_not("\\\""))(rest)?;
        if let Some(chunk) = chunk {
            unescaped.push_str(chunk.fragment());
        }

        let closing: IResult<char> = nom_char('"')(r);
        if let Ok((r, _)) = closing {
            return Ok((r, unescaped));
        }

        let escaped: IResult<char> = preceded(nom_char('\\'), one_of("\\\""))(r);
        match escaped {
            Ok((r, c)) => {
                unescaped.push(c);
                rest = r;
            }
            Err(_) => return failure("unterminated string or invalid escape".to_owned(), r),
        }
    }
}

/// A quoted string or a bare run of characters up to the next delimiter.
/// Either way the literals `*` and `?` read as the sentinels.
pub(super) fn dimension_value(input: Span) -> IResult<DimensionValue> {
    alt((
        map(quoted, DimensionValue::from),
        map(is_not(VALUE_DELIMITERS), |v: Span| {
            DimensionValue::from(*v.fragment())
        }),
    ))(input)
}

pub(super) fn integer(input: Span) -> IResult<MetricValue> {
    let (rest, digits) = recognize(pair(opt(nom_char('-')), digit1))(input)?;
    match digits.fragment().parse::<MetricValue>() {
        Ok(n) => Ok((rest, n)),
        Err(e) => failure(format!("invalid integer: {}", e), input),
    }
}

/// `{name=value, name=value}` with optional whitespace around entries and an
/// optional trailing comma.
pub(super) fn braced_entries<'a, V, O>(
    value: V,
    wherein: &'static str,
) -> impl FnMut(Span<'a>) -> IResult<'a, Vec<(String, O)>>
where
    V: FnMut(Span<'a>) -> IResult<'a, O> + Copy,
{
    move |input: Span<'a>| {
        let (rest, _) = nom_char('{')(input)?;

        let (rest, entries) = separated_list0(
            maybe_lpadded(nom_char(',')),
            maybe_lpadded(separated_pair(name, nom_char('='), value)),
        )(rest)?;

        let (rest, _) = match entries.len() {
            0 => (rest, None),
            _ => opt(maybe_lpadded(nom_char(',')))(rest)?,
        };

        match maybe_lpadded(nom_char('}'))(rest) {
            Ok((rest, _)) => Ok((rest, entries)),
            Err(_) => failure(format!("expected ',' or '}}' in {}", wherein), rest),
        }
    }
}

pub(super) fn maybe_lpadded<'a, F, O>(f: F) -> impl FnMut(Span<'a>) -> IResult<'a, O>
where
    F: FnMut(Span<'a>) -> IResult<'a, O>,
{
    preceded(multispace0, f)
}

/// Renders a name the way [`name`] reads it back.
pub(crate) fn escape_name(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || "_.:-".contains(c))
        }
        _ => false,
    };

    if is_identifier {
        name.to_owned()
    } else {
        quote(name)
    }
}

/// Renders a dimension value the way [`dimension_value`] reads it back.
/// Sentinels stay bare; concrete values are quoted when they are empty or
/// hold a delimiter or a double quote.
pub(crate) fn escape_dimension_value(value: &DimensionValue) -> String {
    let s = value.as_str();
    let is_bare = !s.is_empty() && !s.contains(|c| VALUE_DELIMITERS.contains(c) || c == '"');

    if value.is_concrete() && !is_bare {
        quote(s)
    } else {
        s.to_owned()
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
