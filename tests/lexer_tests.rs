// tests/lexer_tests.rs

use rcalc::ast::{Operator, Token};
use rcalc::lexer::{Lexer, Position};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = vec![];
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            break;
        }
        out.push(token);
    }
    out
}

fn lex_error_index(input: &str) -> usize {
    let mut lexer = Lexer::new(input);
    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => panic!("expected a lex error for {:?}", input),
            Ok(_) => continue,
            Err(e) => return e.position.index,
        }
    }
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_integers() {
    assert_eq!(
        tokens("0 42 -10 +3"),
        vec![
            Token::Integer(0),
            Token::Integer(42),
            Token::Integer(-10),
            Token::Integer(3),
        ]
    );
}

#[test]
fn test_reals() {
    assert_eq!(
        tokens("0.95 -1.5 .5 1. 2e-3 1E5"),
        vec![
            Token::Float(0.95),
            Token::Float(-1.5),
            Token::Float(0.5),
            Token::Float(1.0),
            Token::Float(0.002),
            Token::Float(100000.0),
        ]
    );
}

#[test]
fn test_minus_operator_vs_negative_number() {
    assert_eq!(
        tokens("(- 10 -2)"),
        vec![
            Token::LParen,
            Token::Operator(Operator::Subtract),
            Token::Integer(10),
            Token::Integer(-2),
            Token::RParen,
        ]
    );
}

#[test]
fn test_sign_after_open_paren_is_operator() {
    assert_eq!(
        tokens("(+1 2)"),
        vec![
            Token::LParen,
            Token::Operator(Operator::Add),
            Token::Integer(1),
            Token::Integer(2),
            Token::RParen,
        ]
    );
    assert_eq!(
        tokens("(-5 (+ -2 1))"),
        vec![
            Token::LParen,
            Token::Operator(Operator::Subtract),
            Token::Integer(5),
            Token::LParen,
            Token::Operator(Operator::Add),
            Token::Integer(-2),
            Token::Integer(1),
            Token::RParen,
            Token::RParen,
        ]
    );
}

#[test]
fn test_number_ends_at_paren() {
    assert_eq!(
        tokens("(+ 1 2)"),
        vec![
            Token::LParen,
            Token::Operator(Operator::Add),
            Token::Integer(1),
            Token::Integer(2),
            Token::RParen,
        ]
    );
}

#[test]
fn test_number_glued_to_word() {
    assert_eq!(lex_error_index("(+ 12abc 1)"), 3);
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(lex_error_index("99999999999999999999"), 0);
}

// ============================================================================
// Strings, names and keywords
// ============================================================================

#[test]
fn test_strings_both_quotes() {
    assert_eq!(
        tokens(r#"'uint8' "fast" ''"#),
        vec![
            Token::String("uint8".to_string()),
            Token::String("fast".to_string()),
            Token::String(String::new()),
        ]
    );
}

#[test]
fn test_strings_have_no_escapes() {
    assert_eq!(
        tokens(r#"'a\nb' "it's""#),
        vec![
            Token::String(r"a\nb".to_string()),
            Token::String("it's".to_string()),
        ]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(lex_error_index("(read 1 'uint8)"), 8);
    assert_eq!(lex_error_index("'abc\ndef'"), 0);
}

#[test]
fn test_symbols_are_whole_words() {
    assert_eq!(
        tokens("isnan nothing truthy is not truth _i1"),
        vec![
            Token::Symbol("isnan".to_string()),
            Token::Symbol("nothing".to_string()),
            Token::Symbol("truthy".to_string()),
            Token::Symbol("is".to_string()),
            Token::Symbol("not".to_string()),
            Token::Symbol("truth".to_string()),
            Token::Symbol("_i1".to_string()),
        ]
    );
}

#[test]
fn test_literal_words() {
    assert_eq!(
        tokens("true false null"),
        vec![Token::Boolean(true), Token::Boolean(false), Token::Null]
    );
}

#[test]
fn test_keyword_markers() {
    assert_eq!(
        tokens("(read 1 :dtype 'float32')"),
        vec![
            Token::LParen,
            Token::Symbol("read".to_string()),
            Token::Integer(1),
            Token::Keyword("dtype".to_string()),
            Token::String("float32".to_string()),
            Token::RParen,
        ]
    );
}

#[test]
fn test_bare_colon() {
    assert_eq!(lex_error_index("(f : 1)"), 3);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_all_punctuation_operators() {
    assert_eq!(
        tokens("+ - * / & | < <= == != >= >"),
        vec![
            Token::Operator(Operator::Add),
            Token::Operator(Operator::Subtract),
            Token::Operator(Operator::Multiply),
            Token::Operator(Operator::Divide),
            Token::Operator(Operator::BitAnd),
            Token::Operator(Operator::BitOr),
            Token::Operator(Operator::LessThan),
            Token::Operator(Operator::LessEqual),
            Token::Operator(Operator::Equal),
            Token::Operator(Operator::NotEqual),
            Token::Operator(Operator::GreaterEqual),
            Token::Operator(Operator::GreaterThan),
        ]
    );
}

#[test]
fn test_single_equals_and_bang() {
    assert_eq!(lex_error_index("(= 1 1)"), 1);
    assert_eq!(lex_error_index("(! 1)"), 1);
}

#[test]
fn test_unexpected_character() {
    assert_eq!(lex_error_index("(+ 1 #)"), 5);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_positions_follow_tokens() {
    let mut lexer = Lexer::new("(+ 125\n  (read 1))");
    let mut positions = vec![];
    loop {
        let token = lexer.next_token().unwrap();
        positions.push(lexer.token_position());
        if token == Token::Eof {
            break;
        }
    }
    let indices: Vec<usize> = positions.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 3, 9, 10, 15, 16, 17, 18]);
}

#[test]
fn test_offset_is_one_based() {
    assert_eq!(Position { index: 0 }.offset(), 1);
    assert_eq!(Position { index: 7 }.offset(), 8);
}
