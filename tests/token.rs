extern crate glox;

use glox::literal::Literal;
use glox::scanner::Scanner;
use glox::token::{Location, Token, Type};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[test]
fn scanned_tokens_carry_location_and_literal() {
    let tokens = Scanner::new("var answer = 42;").scan_tokens();

    // Lines are 1-based, columns are 0-based byte offsets into the line.
    let answer = &tokens[1];
    assert_eq!(answer.r#type, Type::Identifier);
    assert_eq!(answer.lexeme, "answer");
    assert_eq!(answer.literal, None);
    assert_eq!(answer.location, Location::new(1, 4));

    let number = &tokens[3];
    assert_eq!(number.r#type, Type::Number);
    assert_eq!(number.lexeme, "42");
    assert_eq!(number.literal, Some(Literal::Number(42.0)));
    assert_eq!(number.location, Location::new(1, 13));
}

#[test]
fn synthetic_tokens_sit_at_the_zero_position() {
    // `this` and `super` reads inside bound methods go through tokens made
    // from bare names; only the lexeme matters for those environment
    // lookups, so the location is pinned to the zero position.
    let token = Token::from("this");

    assert_eq!(token.r#type, Type::Identifier);
    assert_eq!(token.lexeme, "this");
    assert_eq!(token.literal, None);
    assert_eq!(token.location, Location::new(0, 0));
}

#[test]
fn equal_tokens() {
    let a = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 0));
    let b = a.clone();

    assert_eq!(a, b);
}

#[test]
fn same_lexeme_different_location_hashes_differently() {
    // The resolver's side table depends on same-name tokens at different
    // positions being distinct keys.
    let first = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 0));
    let second = Token::new(Type::Identifier, "a".to_string(), None, Location::new(1, 4));

    let mut first_hasher = DefaultHasher::new();
    first.hash(&mut first_hasher);
    let mut second_hasher = DefaultHasher::new();
    second.hash(&mut second_hasher);

    assert_ne!(first_hasher.finish(), second_hasher.finish());
    assert_ne!(first, second);
}
