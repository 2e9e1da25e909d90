use super::*;
use logos::Logos;

#[test]
fn lexes_keywords_and_identifiers() {
    let mut lex = TokenKind::lexer("def x = 1");
    assert_eq!(lex.next(), Some(Ok(TokenKind::KwDef)));
    assert_eq!(lex.next(), Some(Ok(TokenKind::Identifier)));
    assert_eq!(lex.next(), Some(Ok(TokenKind::Equal)));
    assert_eq!(lex.next(), Some(Ok(TokenKind::IntLiteral)));
}

#[test]
fn compound_assignment_classification() {
    assert!(TokenKind::PlusEqual.is_compound_assignment());
    assert!(!TokenKind::Equal.is_compound_assignment());
    assert!(TokenKind::Equal.is_assignment_like());
}

#[test]
fn precedence_ordering_is_monotonic() {
    use precedence::Precedence::*;
    assert!(Comma < Assign);
    assert!(Assign < Ternary);
    assert!(Multiplicative > Additive);
    assert!(Postfix > Unary);
}

#[test]
fn capture_identifier_lexes() {
    let mut lex = TokenKind::lexer("$1");
    assert_eq!(lex.next(), Some(Ok(TokenKind::CaptureIdentifier)));
}
