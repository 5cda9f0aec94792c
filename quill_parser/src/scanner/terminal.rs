//! Terminal character classes of the SQL lexical grammar.

use crate::matcher::Matcher;

/// `U+0020`.
pub const SPACE: Matcher = Matcher::rune("Space", ' ');
/// `"`.
pub const DOUBLE_QUOTE: Matcher = Matcher::rune("Double Quote", '"');
/// `%`.
pub const PERCENT: Matcher = Matcher::rune("Percent", '%');
/// `&`.
pub const AMPERSAND: Matcher = Matcher::rune("Ampersand", '&');
/// `'`.
pub const QUOTE: Matcher = Matcher::rune("Quote", '\'');
/// `(`.
pub const LEFT_PAREN: Matcher = Matcher::rune("Left Paren", '(');
/// `)`.
pub const RIGHT_PAREN: Matcher = Matcher::rune("Right Paren", ')');
/// `*`.
pub const ASTERISK: Matcher = Matcher::rune("Asterisk", '*');
/// `+`.
pub const PLUS_SIGN: Matcher = Matcher::rune("Plus Sign", '+');
/// `,`.
pub const COMMA: Matcher = Matcher::rune("Comma", ',');
/// `-`.
pub const MINUS_SIGN: Matcher = Matcher::rune("Minus Sign", '-');
/// `.`.
pub const PERIOD: Matcher = Matcher::rune("Period", '.');
/// `/`.
pub const SOLIDUS: Matcher = Matcher::rune("Solidus", '/');
/// `\`.
pub const REVERSE_SOLIDUS: Matcher = Matcher::rune("Reverse Solidus", '\\');
/// `:`.
pub const COLON: Matcher = Matcher::rune("Colon", ':');
/// `;`.
pub const SEMICOLON: Matcher = Matcher::rune("Semicolon", ';');
/// `<`.
pub const LESS_THAN_OPERATOR: Matcher = Matcher::rune("Less Than Operator", '<');
/// `=`.
pub const EQUALS_OPERATOR: Matcher = Matcher::rune("Equals Operator", '=');
/// `>`.
pub const GREATER_THAN_OPERATOR: Matcher = Matcher::rune("Greater Than Operator", '>');
/// `?`.
pub const QUESTION_MARK: Matcher = Matcher::rune("Question Mark", '?');
/// `[`.
pub const LEFT_BRACKET: Matcher = Matcher::rune("Left Bracket", '[');
/// `]`.
pub const RIGHT_BRACKET: Matcher = Matcher::rune("Right Bracket", ']');
/// `^`.
pub const CIRCUMFLEX: Matcher = Matcher::rune("Circumflex", '^');
/// `_`.
pub const UNDERSCORE: Matcher = Matcher::rune("Underscore", '_');
/// `|`.
pub const VERTICAL_BAR: Matcher = Matcher::rune("Vertical Bar", '|');
/// `{`.
pub const LEFT_BRACE: Matcher = Matcher::rune("Left Brace", '{');
/// `}`.
pub const RIGHT_BRACE: Matcher = Matcher::rune("Right Brace", '}');
/// `$`.
pub const DOLLAR_SIGN: Matcher = Matcher::rune("Dollar Sign", '$');

const SPECIAL_PARTS: &[Matcher] = &[
    SPACE,
    DOUBLE_QUOTE,
    PERCENT,
    AMPERSAND,
    QUOTE,
    LEFT_PAREN,
    RIGHT_PAREN,
    ASTERISK,
    PLUS_SIGN,
    COMMA,
    MINUS_SIGN,
    PERIOD,
    SOLIDUS,
    REVERSE_SOLIDUS,
    COLON,
    SEMICOLON,
    LESS_THAN_OPERATOR,
    EQUALS_OPERATOR,
    GREATER_THAN_OPERATOR,
    QUESTION_MARK,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    CIRCUMFLEX,
    UNDERSCORE,
    VERTICAL_BAR,
    LEFT_BRACE,
    RIGHT_BRACE,
    DOLLAR_SIGN,
];

/// Every single-character SQL special character.
pub const SQL_SPECIAL_CHARACTER: Matcher = Matcher::merge("SQL Special Character", SPECIAL_PARTS);

/// `A`..`Z`.
pub const SIMPLE_LATIN_UPPER_CASE_LETTER: Matcher =
    Matcher::any_of("Simple Latin Upper Case Letter", "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
/// `a`..`z`.
pub const SIMPLE_LATIN_LOWER_CASE_LETTER: Matcher =
    Matcher::any_of("Simple Latin Lower Case Letter", "abcdefghijklmnopqrstuvwxyz");

const LATIN_PARTS: &[Matcher] = &[SIMPLE_LATIN_UPPER_CASE_LETTER, SIMPLE_LATIN_LOWER_CASE_LETTER];

/// Simple Latin letters of either case.
pub const SIMPLE_LATIN_CHARACTER: Matcher = Matcher::merge("Simple Latin Character", LATIN_PARTS);

/// `0`..`9`.
pub const DIGIT: Matcher = Matcher::any_of("Digit", "0123456789");
/// Digits and `A`..`F` of either case.
pub const HEX_DIGIT: Matcher = Matcher::any_of("Hexit", "0123456789ABCDEFabcdef");

const LANGUAGE_PARTS: &[Matcher] = &[SIMPLE_LATIN_CHARACTER, DIGIT, SQL_SPECIAL_CHARACTER];

/// The SQL language character set.
pub const SQL_LANGUAGE_CHARACTER: Matcher =
    Matcher::merge("SQL Language Character", LANGUAGE_PARTS);

fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_white_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Characters that end a line for position tracking.
pub const NEWLINE: Matcher = Matcher::class("Newline", is_newline);

/// Characters that separate tokens.
pub const WHITE_SPACE: Matcher = Matcher::class("White Space", is_white_space);

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() && !is_identifier_extend_mark(c)
}

// Combining marks report as alphabetic but may only continue an identifier.
fn is_identifier_extend_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}'
        | '\u{1AB0}'..='\u{1AFF}'
        | '\u{1DC0}'..='\u{1DFF}'
        | '\u{20D0}'..='\u{20FF}'
        | '\u{FE20}'..='\u{FE2F}')
}

fn is_identifier_extend(c: char) -> bool {
    c == '\u{00B7}'
        || c == '_'
        || c == '\u{200C}'
        || c == '\u{200D}'
        || c == '\u{203F}'
        || c == '\u{2040}'
        || c.is_numeric()
        || is_identifier_extend_mark(c)
}

/// First character of a regular identifier.
pub const IDENTIFIER_START: Matcher = Matcher::class("Identifier Start", is_identifier_start);

/// Continuation characters of a regular identifier.
pub const IDENTIFIER_EXTEND: Matcher = Matcher::class("Identifier Extend", is_identifier_extend);

const IDENTIFIER_PARTS: &[Matcher] = &[IDENTIFIER_START, IDENTIFIER_EXTEND];

/// Any character of a regular identifier after the first.
pub const IDENTIFIER_PART: Matcher = Matcher::merge("Identifier Part", IDENTIFIER_PARTS);

/// Large object length multipliers: kilo, mega, giga, tera, peta.
pub const MULTIPLIER: Matcher = Matcher::any_of("Multiplier", "KMGTP");
