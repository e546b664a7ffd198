use super::*;

fn token_types(source: &str) -> Vec<(TokenType, String)> {
    Lexer::new(source).map(|token| (token.token_type(), token.literal().to_owned())).collect()
}

#[test]
pub fn test_next_token() {
    let source = "enchanted five = 5.5;
    enchanted ten = 10;
    enchanted add = isme(x, y) {
    x + y;
    };
    enchanted result = add(five, ten);
    !-/*5;
    5 < 10 > 5;
    LoverEra (5 < 10) {
        hi SparksFly;
    } RepEra {
        hi BadBlood;
    }
    10 == 10;
    10 != 9;
    ";

    let expected = [
        (TokenType::Let, "enchanted"), (TokenType::Identifier, "five"), (TokenType::Assign, "="),
        (TokenType::Float, "5.5"), (TokenType::Semicolon, ";"),
        (TokenType::Let, "enchanted"), (TokenType::Identifier, "ten"), (TokenType::Assign, "="),
        (TokenType::Int, "10"), (TokenType::Semicolon, ";"),
        (TokenType::Let, "enchanted"), (TokenType::Identifier, "add"), (TokenType::Assign, "="),
        (TokenType::Function, "isme"), (TokenType::ParenthesisLeft, "("), (TokenType::Identifier, "x"),
        (TokenType::Comma, ","), (TokenType::Identifier, "y"), (TokenType::ParenthesisRight, ")"),
        (TokenType::BracketLeft, "{"), (TokenType::Identifier, "x"), (TokenType::Plus, "+"),
        (TokenType::Identifier, "y"), (TokenType::Semicolon, ";"), (TokenType::BracketRight, "}"),
        (TokenType::Semicolon, ";"),
        (TokenType::Let, "enchanted"), (TokenType::Identifier, "result"), (TokenType::Assign, "="),
        (TokenType::Identifier, "add"), (TokenType::ParenthesisLeft, "("), (TokenType::Identifier, "five"),
        (TokenType::Comma, ","), (TokenType::Identifier, "ten"), (TokenType::ParenthesisRight, ")"),
        (TokenType::Semicolon, ";"),
        (TokenType::Not, "!"), (TokenType::Minus, "-"), (TokenType::Divide, "/"), (TokenType::Multiply, "*"),
        (TokenType::Int, "5"), (TokenType::Semicolon, ";"),
        (TokenType::Int, "5"), (TokenType::Less, "<"), (TokenType::Int, "10"), (TokenType::Greater, ">"),
        (TokenType::Int, "5"), (TokenType::Semicolon, ";"),
        (TokenType::If, "LoverEra"), (TokenType::ParenthesisLeft, "("), (TokenType::Int, "5"),
        (TokenType::Less, "<"), (TokenType::Int, "10"), (TokenType::ParenthesisRight, ")"),
        (TokenType::BracketLeft, "{"), (TokenType::Return, "hi"), (TokenType::True, "SparksFly"),
        (TokenType::Semicolon, ";"), (TokenType::BracketRight, "}"), (TokenType::Else, "RepEra"),
        (TokenType::BracketLeft, "{"), (TokenType::Return, "hi"), (TokenType::False, "BadBlood"),
        (TokenType::Semicolon, ";"), (TokenType::BracketRight, "}"),
        (TokenType::Int, "10"), (TokenType::Equal, "=="), (TokenType::Int, "10"), (TokenType::Semicolon, ";"),
        (TokenType::Int, "10"), (TokenType::NotEqual, "!="), (TokenType::Int, "9"), (TokenType::Semicolon, ";"),
    ];

    let actual = token_types(source);
    assert_eq!(expected.len(), actual.len());

    for ((expected_type, expected_literal), (actual_type, actual_literal)) in expected.iter().zip(actual.iter()) {
        assert_eq!(*expected_type, *actual_type, "literal {}", actual_literal);
        assert_eq!(*expected_literal, actual_literal.as_str());
    }
}

#[test]
pub fn test_keywords() {
    let keywords = [
        ("isme", TokenType::Function),
        ("enchanted", TokenType::Let),
        ("SparksFly", TokenType::True),
        ("BadBlood", TokenType::False),
        ("LoverEra", TokenType::If),
        ("RepEra", TokenType::Else),
        ("hi", TokenType::Return),
    ];

    for (spelling, token_type) in keywords {
        assert_eq!(token_type, lookup_identifier(spelling));
        assert_eq!(vec![(token_type, spelling.to_owned())], token_types(spelling));
    }

    for name in ["his", "Enchanted", "sparksfly", "let", "fn", "if", "_hi", "isme_"] {
        assert_eq!(TokenType::Identifier, lookup_identifier(name));
        assert_eq!(vec![(TokenType::Identifier, name.to_owned())], token_types(name));
    }
}

#[test]
pub fn test_identifiers_stop_at_digits() {
    assert_eq!(vec![
        (TokenType::Identifier, String::from("x")),
        (TokenType::Int, String::from("1")),
    ], token_types("x1"));
}

#[test]
pub fn test_malformed_float_is_illegal() {
    assert_eq!(vec![
        (TokenType::Illegal, String::from("5.")),
        (TokenType::Identifier, String::from("x")),
    ], token_types("5.x"));

    assert_eq!(vec![(TokenType::Illegal, String::from("12."))], token_types("12."));
}

#[test]
pub fn test_unknown_characters() {
    assert_eq!(vec![
        (TokenType::Illegal, String::from("@")),
        (TokenType::Illegal, String::from("&")),
        (TokenType::Illegal, String::from("é")),
        (TokenType::Int, String::from("1")),
    ], token_types("@ & é 1"));
}

#[test]
pub fn test_strings_and_compound_operators() {
    assert_eq!(vec![
        (TokenType::String, String::from("hello world")),
        (TokenType::LessEqual, String::from("<=")),
        (TokenType::GreaterEqual, String::from(">=")),
        (TokenType::And, String::from("&&")),
        (TokenType::Or, String::from("||")),
        (TokenType::SquareBracketLeft, String::from("[")),
        (TokenType::SquareBracketRight, String::from("]")),
    ], token_types("\"hello world\" <= >= && || [ ]"));

    assert_eq!(vec![(TokenType::Illegal, String::from("\"open"))], token_types("\"open"));
}

#[test]
pub fn test_eof_forever() {
    let mut lexer = Lexer::new("  1 ");

    assert_eq!(TokenType::Int, lexer.next_token().token_type());
    assert_eq!(TokenType::Eof, lexer.next_token().token_type());
    assert_eq!(TokenType::Eof, lexer.next_token().token_type());
    assert_eq!(TokenType::Eof, lexer.next_token().token_type());
}

#[test]
pub fn test_positions() {
    let mut lexer = Lexer::new("enchanted\n  x");

    assert_eq!(TokenPos::new(1, 1), *lexer.next_token().start());
    assert_eq!(TokenPos::new(2, 3), *lexer.next_token().start());
}

#[test]
pub fn test_positions_count_characters() {
    let mut lexer = Lexer::new("\"héllo\" x\n\u{e9} y");

    assert_eq!(TokenPos::new(1, 1), *lexer.next_token().start());
    assert_eq!(TokenPos::new(1, 9), *lexer.next_token().start());

    let illegal = lexer.next_token();
    assert_eq!(TokenType::Illegal, illegal.token_type());
    assert_eq!(TokenPos::new(2, 1), *illegal.start());
    assert_eq!(TokenPos::new(2, 3), *lexer.next_token().start());
}
