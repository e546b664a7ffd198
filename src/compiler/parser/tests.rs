use super::*;

fn parse(source: &str) -> Program {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse();

    assert!(!parser.had_error(), "unexpected parse errors: {:?}",
        parser.errors().iter().map(|error| error.to_string()).collect::<Vec<String>>());
    program
}

fn parse_errors(source: &str) -> Vec<ParseError> {
    let mut parser = Parser::new(Lexer::new(source));
    parser.parse();
    parser.errors().to_vec()
}

fn single_expression(source: &str) -> Expression {
    let program = parse(source);
    assert_eq!(1, program.statements.len());

    match program.statements.into_iter().next() {
        Some(Statement::Expression { expression, .. }) => expression,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

mod statements {
    use super::*;

    #[test]
    pub fn test_let_statements() {
        let program = parse("
        enchanted x = 5;
        enchanted y = 10.12;
        enchanted kekw = 123456;
        ");

        assert_eq!(3, program.statements.len());

        for (statement, expected) in program.statements.iter().zip(["x", "y", "kekw"]) {
            match statement {
                Statement::Let { token, name, .. } => {
                    assert_eq!("enchanted", token.literal());
                    assert_eq!(expected, name.name);
                    assert_eq!(expected, name.token.literal());
                },
                other => panic!("expected let statement, got {:?}", other),
            }
        }
    }

    #[test]
    pub fn test_return_statements() {
        let program = parse("hi 5; hi 10; hi 993322;");
        assert_eq!(3, program.statements.len());

        for statement in &program.statements {
            assert!(matches!(statement, Statement::Return { .. }));
            assert_eq!("hi", statement.token().literal());
        }
    }

    #[test]
    pub fn test_optional_semicolon() {
        let program = parse("enchanted a = 1 enchanted b = 2 a + b");

        assert_eq!(3, program.statements.len());
        assert_eq!("enchanted a = 1;enchanted b = 2;(a + b)", program.to_string());
    }
}

mod expressions {
    use super::*;

    #[test]
    pub fn test_identifier() {
        assert!(matches!(single_expression("omggg"), Expression::Variable(Identifier { ref name, .. }) if name == "omggg"));
    }

    #[test]
    pub fn test_literals() {
        assert!(matches!(single_expression("5;"), Expression::IntegerLiteral { value: 5, .. }));
        assert!(matches!(single_expression("SparksFly"), Expression::Boolean { value: true, .. }));
        assert!(matches!(single_expression("BadBlood"), Expression::Boolean { value: false, .. }));

        match single_expression("5.5484;") {
            Expression::FloatLiteral { token, value } => {
                assert!((value - 5.5484).abs() < 1e-9);
                assert_eq!("5.5484", token.literal());
            },
            other => panic!("expected float literal, got {:?}", other),
        }

        match single_expression("\"hello\"") {
            Expression::StringLiteral { value, .. } => assert_eq!("hello", value),
            other => panic!("expected string literal, got {:?}", other),
        }
    }

    #[test]
    pub fn test_prefix_expressions() {
        for (source, expected_operator, expected_value) in [("!5;", PrefixOperator::Not, 5), ("-15;", PrefixOperator::Negate, 15)] {
            match single_expression(source) {
                Expression::Prefix { operator, right, .. } => {
                    assert_eq!(expected_operator, operator);
                    assert!(matches!(*right, Expression::IntegerLiteral { value, .. } if value == expected_value));
                },
                other => panic!("expected prefix expression, got {:?}", other),
            }
        }
    }

    #[test]
    pub fn test_infix_operators() {
        let cases = [
            ("5 + 5;", InfixOperator::Add), ("5 - 5;", InfixOperator::Subtract),
            ("5 * 5;", InfixOperator::Multiply), ("5 / 5;", InfixOperator::Divide),
            ("5 > 5;", InfixOperator::Greater), ("5 < 5;", InfixOperator::Less),
            ("5 == 5;", InfixOperator::Equal), ("5 != 5;", InfixOperator::NotEqual),
            ("5.1 >= 2.2;", InfixOperator::GreaterEqual), ("5.1 <= 2.2;", InfixOperator::LessEqual),
            ("a && b", InfixOperator::And), ("a || b", InfixOperator::Or),
        ];

        for (source, expected) in cases {
            match single_expression(source) {
                Expression::Infix { operator, .. } => assert_eq!(expected, operator, "{}", source),
                other => panic!("expected infix expression, got {:?}", other),
            }
        }
    }

    #[test]
    pub fn test_operator_precedence() {
        let cases = [
            ("a + b * c", "(a + (b * c))"),
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a * b / c", "((a * b) / c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("3.5 + 4.1; -5.2 * 5", "(3.5 + 4.1)((-5.2) * 5)"),
            ("5.5 > 4.2 == 3.3 < 4.8", "((5.5 > 4.2) == (3.3 < 4.8))"),
            ("5.1 < 4.6 != 3.7 > 4.2", "((5.1 < 4.6) != (3.7 > 4.2))"),
            ("3.8 + 4 * 5 == 3 * 1.0 + 4 * 5", "((3.8 + (4 * 5)) == ((3 * 1.0) + (4 * 5)))"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("a || b && c", "(a || (b && c))"),
            ("a == b && c != d", "((a == b) && (c != d))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            ("add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))", "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))"),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        ];

        for (source, expected) in cases {
            assert_eq!(expected, parse(source).to_string(), "{}", source);
        }
    }

    #[test]
    pub fn test_if_expression() {
        match single_expression("LoverEra (x < y) { x }") {
            Expression::If { condition, consequence, alternative, .. } => {
                assert_eq!("(x < y)", condition.to_string());
                assert_eq!(1, consequence.statements.len());
                assert_eq!("x", consequence.to_string());
                assert!(alternative.is_none());
            },
            other => panic!("expected if expression, got {:?}", other),
        }

        assert_eq!("LoverEra (x < y) { x } RepEra { y }", parse("LoverEra (x < y) { x } RepEra { y }").to_string());
    }

    #[test]
    pub fn test_function_literal() {
        match single_expression("isme(x, y) { x + y; }") {
            Expression::Function(function) => {
                assert_eq!(vec!["x", "y"], function.parameters.iter().map(|parameter| parameter.name.as_str()).collect::<Vec<&str>>());
                assert_eq!("(x + y)", function.body.to_string());
            },
            other => panic!("expected function literal, got {:?}", other),
        }

        for (source, expected) in [("isme() {};", 0), ("isme(x) {};", 1), ("isme(x, y, z) {};", 3)] {
            match single_expression(source) {
                Expression::Function(function) => assert_eq!(expected, function.parameters.len()),
                other => panic!("expected function literal, got {:?}", other),
            }
        }
    }

    #[test]
    pub fn test_call_expression() {
        match single_expression("add(1, 2 * 3, 4 + 5);") {
            Expression::Call { function, arguments, .. } => {
                assert_eq!("add", function.to_string());
                assert_eq!(vec!["1", "(2 * 3)", "(4 + 5)"], arguments.iter().map(|arg| arg.to_string()).collect::<Vec<String>>());
            },
            other => panic!("expected call expression, got {:?}", other),
        }
    }
}

mod errors {
    use super::*;

    #[test]
    pub fn test_missing_tokens() {
        let errors = parse_errors("enchanted = 5;");
        assert_eq!(1, errors.len());
        assert!(matches!(&errors[0], ParseError::UnexpectedToken { found, .. } if found.token_type() == TokenType::Assign));

        let errors = parse_errors("enchanted x 5;");
        assert_eq!(1, errors.len());
        assert!(errors[0].to_string().contains("Expected '='"));
    }

    #[test]
    pub fn test_no_prefix_rule() {
        let errors = parse_errors("* 5;");
        assert_eq!(1, errors.len());
        assert!(matches!(&errors[0], ParseError::NoPrefixRule { found, .. } if found.token_type() == TokenType::Multiply));
    }

    #[test]
    pub fn test_illegal_tokens() {
        let errors = parse_errors("enchanted x = 5.;");
        assert_eq!(1, errors.len());
        assert!(matches!(&errors[0], ParseError::IllegalToken { literal, .. } if literal == "5."));
    }

    #[test]
    pub fn test_recovery_reports_each_statement() {
        let mut parser = Parser::new(Lexer::new("enchanted = 1; enchanted y = 2; hi @; enchanted z = 3;"));
        let program = parser.parse();

        assert_eq!(2, parser.errors().len());
        assert_eq!(TokenPos::new(1, 11), parser.errors()[0].pos());
        assert!(matches!(&parser.errors()[1], ParseError::IllegalToken { literal, .. } if literal == "@"));

        assert!(program.statements.iter().any(|statement| matches!(statement, Statement::Let { name, .. } if name.name == "z")));
    }

    #[test]
    pub fn test_integer_overflow() {
        let errors = parse_errors("99999999999999999999");
        assert!(matches!(&errors[0], ParseError::InvalidInteger { .. }));
    }
}
