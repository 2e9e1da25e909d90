//! Token kinds for the Jactl lexer.
//!
//! Implements the closed token-kind set and tokeniser contract. Values reuse
//! [`logos`] for mechanical scanning; anything
//! context-sensitive (string interpolation boundaries, regex-vs-divide,
//! significant EOL) is layered on top in [`crate::lexer`].

mod precedence;

#[cfg(test)]
mod tests;

use logos::Logos;

pub use precedence::{Associativity, Precedence};

/// Jactl token kinds.
///
/// `startRegex()` (§6.1) is an out-of-band hint the parser gives the lexer to
/// reinterpret a pending `/` as the start of a regex literal instead of the
/// division operator; this enum has distinct kinds for both so the lexer can
/// retroactively relabel a buffered token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum TokenKind {
    // ==================== Keywords ====================
    #[token("def")]
    KwDef,
    #[token("var")]
    KwVar,
    #[token("class")]
    KwClass,
    #[token("extends")]
    KwExtends,
    #[token("static")]
    KwStatic,
    #[token("final")]
    KwFinal,
    #[token("const")]
    KwConst,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("unless")]
    KwUnless,
    #[token("while")]
    KwWhile,
    #[token("until")]
    KwUntil,
    #[token("do")]
    KwDo,
    #[token("for")]
    KwFor,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("return")]
    KwReturn,
    #[token("print")]
    KwPrint,
    #[token("println")]
    KwPrintln,
    #[token("die")]
    KwDie,
    #[token("eval")]
    KwEval,
    #[token("new")]
    KwNew,
    #[token("instanceof")]
    KwInstanceOf,
    #[token("in")]
    KwIn,
    #[token("!in")]
    BangIn,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,
    #[token("import")]
    KwImport,
    #[token("package")]
    KwPackage,
    #[token("as")]
    KwAs,
    #[token("sleep")]
    KwSleep,

    // Primitive / builtin type names
    #[token("boolean")]
    KwBoolean,
    #[token("byte")]
    KwByte,
    #[token("int")]
    KwInt,
    #[token("long")]
    KwLong,
    #[token("double")]
    KwDouble,
    #[token("Decimal")]
    KwDecimal,
    #[token("String")]
    KwString,
    #[token("Map")]
    KwMap,
    #[token("List")]
    KwList,
    #[token("Object")]
    KwObject,

    // ==================== Punctuation ====================
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token("?:")]
    QuestionColon,
    #[token("?:=")]
    QuestionColonEqual,
    #[token("?=")]
    QuestionEqual,
    #[token("?")]
    Question,
    #[token("?.")]
    QuestionDot,
    #[token("?[")]
    QuestionLeftBracket,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,

    // Assignment-family
    #[token("=")]
    Equal,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("<<=")]
    ShiftLeftEqual,
    #[token(">>=")]
    ShiftRightEqual,
    #[token(">>>=")]
    UnsignedShiftRightEqual,

    // Comparison
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("===")]
    TripleEqual,
    #[token("!==")]
    BangDoubleEqual,
    #[token("<=>")]
    Spaceship,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,

    // Boolean / bitwise
    #[token("&&")]
    AndAndTok,
    #[token("||")]
    OrOrTok,
    #[token("!")]
    Bang,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token(">>>")]
    UnsignedShiftRight,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Regex
    #[token("=~")]
    EqualTilde,
    #[token("!~")]
    BangTilde,

    // ==================== Literals ====================
    #[regex(r"[0-9][0-9_]*")]
    IntLiteral,
    #[regex(r"[0-9][0-9_]*[lL]")]
    LongLiteral,
    #[regex(r"[0-9][0-9_]*[dD]")]
    DoubleLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    DecimalLiteral,

    // ==================== Identifiers ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    /// `$1`, `$2`, ... — switch regex capture-group bindings (§6.1)
    #[regex(r"\$[0-9]+")]
    CaptureIdentifier,

    // ==================== String / regex boundary markers ====================
    /// Opening `"` of a (possibly interpolated) expression string.
    #[token("\"")]
    DoubleQuote,
    /// `${` inside an interpolated string, opening an embedded expression.
    ExprStringStart,
    /// Matching `}` closing an embedded expression inside a string.
    ExprStringEnd,
    /// Opening `/` of a regex match literal (emitted only after `startRegex()`).
    RegexStart,
    /// `/` separating the pattern from the replacement in `s/.../.../`.
    RegexReplaceSeparator,
    /// Closing `/` of a regex or regex-substitute literal.
    RegexEnd,
    StringContent,

    #[regex(r"\r?\n")]
    Eol,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,

    Eof,
    Error,
}

impl TokenKind {
    /// True for tokens that begin a statement-terminating keyword used by
    /// error-recovery synchronisation.
    pub fn is_statement_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwIf
                | TokenKind::KwWhile
                | TokenKind::KwFor
                | TokenKind::KwDo
                | TokenKind::KwReturn
                | TokenKind::KwClass
                | TokenKind::KwDef
                | TokenKind::KwPrint
                | TokenKind::KwPrintln
                | TokenKind::KwDie
                | TokenKind::KwSwitch
        )
    }

    /// True for the compound-assignment family (everything but plain `=`).
    pub fn is_compound_assignment(&self) -> bool {
        matches!(
            self,
            TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::AmpEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::ShiftLeftEqual
                | TokenKind::ShiftRightEqual
                | TokenKind::UnsignedShiftRightEqual
                | TokenKind::QuestionColonEqual
                | TokenKind::QuestionEqual
        )
    }

    /// True for any assignment-like operator (`=` included).
    pub fn is_assignment_like(&self) -> bool {
        *self == TokenKind::Equal || self.is_compound_assignment()
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::DecimalLiteral
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwNull
        )
    }

    /// A small set of reserved words that may still be used as map keys / field
    /// names in Jactl's permissive grammar.
    pub fn keyword_text(&self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            KwDef => "def",
            KwVar => "var",
            KwClass => "class",
            KwExtends => "extends",
            KwStatic => "static",
            KwFinal => "final",
            KwConst => "const",
            KwIf => "if",
            KwElse => "else",
            KwUnless => "unless",
            KwWhile => "while",
            KwUntil => "until",
            KwDo => "do",
            KwFor => "for",
            KwBreak => "break",
            KwContinue => "continue",
            KwReturn => "return",
            KwPrint => "print",
            KwPrintln => "println",
            KwDie => "die",
            KwEval => "eval",
            KwNew => "new",
            KwInstanceOf => "instanceof",
            KwIn => "in",
            KwSwitch => "switch",
            KwCase => "case",
            KwTrue => "true",
            KwFalse => "false",
            KwNull => "null",
            KwImport => "import",
            KwPackage => "package",
            KwAs => "as",
            KwSleep => "sleep",
            KwBoolean => "boolean",
            KwByte => "byte",
            KwInt => "int",
            KwLong => "long",
            KwDouble => "double",
            KwDecimal => "Decimal",
            KwString => "String",
            KwMap => "Map",
            KwList => "List",
            KwObject => "Object",
            _ => return None,
        })
    }

    /// True for tokens that name one of the built-in value types (used to
    /// disambiguate `Type name(...)` function declarations from expressions).
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwDef
                | TokenKind::KwVar
                | TokenKind::KwBoolean
                | TokenKind::KwByte
                | TokenKind::KwInt
                | TokenKind::KwLong
                | TokenKind::KwDouble
                | TokenKind::KwDecimal
                | TokenKind::KwString
                | TokenKind::KwMap
                | TokenKind::KwList
                | TokenKind::KwObject
        )
    }
}
